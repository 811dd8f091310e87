//! Scoped directory sessions.

use std::ops::{Deref, DerefMut};

use tracing::warn;

use super::{DirectoryError, DirectoryService, Session};

/// A directory session released on every exit path.
///
/// Dropping the guard rolls back whatever the session left uncommitted and
/// closes it, including on early return through `?`. Cleanup failures are
/// logged, not raised. Use [`ScopedSession::release`] to observe them.
///
/// # Example
/// ```
/// use computed_groups_core::directory::{InMemoryDirectoryService, ScopedSession};
///
/// let directories = InMemoryDirectoryService::new()
///     .with_directory("computedGroup", "group", "groupName");
///
/// let count = {
///     let session = ScopedSession::open(&directories, "computedGroup").unwrap();
///     session.get_entries().unwrap().len()
/// }; // rolled back and closed here
/// assert_eq!(count, 0);
/// ```
pub struct ScopedSession {
    inner: Option<Box<dyn Session>>,
}

impl ScopedSession {
    /// Opens a session on `directory`.
    pub fn open<S>(service: &S, directory: &str) -> Result<Self, DirectoryError>
    where
        S: DirectoryService + ?Sized,
    {
        let session = service.open(directory)?;
        Ok(ScopedSession {
            inner: Some(session),
        })
    }

    /// Wraps an already opened session.
    pub fn new(session: Box<dyn Session>) -> Self {
        ScopedSession {
            inner: Some(session),
        }
    }

    /// Rolls back and closes now, reporting the first failure.
    pub fn release(mut self) -> Result<(), DirectoryError> {
        match self.inner.take() {
            Some(mut session) => {
                let rolled_back = session.rollback();
                let closed = session.close();
                rolled_back.and(closed)
            }
            None => Ok(()),
        }
    }
}

impl Deref for ScopedSession {
    type Target = dyn Session;

    fn deref(&self) -> &Self::Target {
        // `inner` is only taken by `release` and `drop`, both consume the guard
        self.inner
            .as_deref()
            .expect("scoped session used after release")
    }
}

impl DerefMut for ScopedSession {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.inner
            .as_deref_mut()
            .expect("scoped session used after release")
    }
}

impl Drop for ScopedSession {
    fn drop(&mut self) {
        if let Some(mut session) = self.inner.take() {
            if let Err(e) = session.rollback() {
                warn!(directory = session.directory(), error = %e, "directory rollback failed");
            }
            if let Err(e) = session.close() {
                warn!(directory = session.directory(), error = %e, "directory close failed");
            }
        }
    }
}
