//! Directory access for users and computed group definitions.
//!
//! The directory is the key/attribute store computed groups are read from.
//! It is an external collaborator: this module only fixes the contract the
//! rest of the crate consumes, plus an in-memory implementation for tests
//! and small embedders.
//!
//! # Example
//! ```
//! use std::collections::BTreeMap;
//! use computed_groups_core::directory::{
//!     DirectoryService, InMemoryDirectoryService, ScopedSession, Value,
//! };
//!
//! let directories = InMemoryDirectoryService::new()
//!     .with_directory("userDirectory", "user", "username");
//!
//! let mut session = ScopedSession::open(&directories, "userDirectory").unwrap();
//! let mut fields = BTreeMap::new();
//! fields.insert("username".to_string(), Value::from("jdoe"));
//! let user = session.create_entry(fields).unwrap();
//! assert_eq!(user.id(), "jdoe");
//! // dropping the guard rolls the entry back and closes the session
//! ```

mod memory;
mod record;
mod scoped;

use std::collections::BTreeMap;

use derive_more::{Display, Error};

pub use memory::InMemoryDirectoryService;
pub use record::{qualify, Record, Value};
pub use scoped::ScopedSession;

/// Errors raised by directory access.
///
/// These are storage failures: callers propagate them rather than treating
/// them as "no match".
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum DirectoryError {
    /// The directory (or an entry in it) does not exist.
    #[display("not found: {_0}")]
    NotFound(#[error(not(source))] String),

    /// An entry with the same identifier already exists.
    #[display("conflict: {_0}")]
    Conflict(#[error(not(source))] String),

    /// The entry is missing its identifier or is otherwise malformed.
    #[display("invalid entry: {_0}")]
    InvalidEntry(#[error(not(source))] String),

    /// The session was already closed.
    #[display("session closed: {_0}")]
    Closed(#[error(not(source))] String),

    /// The backing store failed.
    #[display("storage error: {_0}")]
    Storage(#[error(not(source))] String),
}

/// Entry point of a directory backend.
pub trait DirectoryService: Send + Sync {
    /// Opens a session on the named directory.
    fn open(&self, directory: &str) -> Result<Box<dyn Session>, DirectoryError>;
}

/// A session on one directory.
///
/// Sessions are short-lived: open, do a batch of lookups, roll back, close.
/// See [`ScopedSession`] for a guard that enforces this.
pub trait Session {
    /// Name of the directory this session is bound to.
    fn directory(&self) -> &str;

    /// Schema entries of this directory are qualified with.
    fn schema(&self) -> &str;

    /// Unqualified name of the identifier field.
    fn id_field(&self) -> &str;

    /// Creates an entry from unqualified (or already qualified) fields.
    ///
    /// The identifier is taken from [`Session::id_field`].
    fn create_entry(&mut self, fields: BTreeMap<String, Value>) -> Result<Record, DirectoryError>;

    /// Looks up an entry by identifier.
    fn get_entry(&self, id: &str) -> Result<Option<Record>, DirectoryError>;

    /// Lists every entry, in identifier order.
    fn get_entries(&self) -> Result<Vec<Record>, DirectoryError>;

    /// Replaces an existing entry.
    fn update_entry(&mut self, record: Record) -> Result<(), DirectoryError>;

    /// Deletes an entry by identifier.
    fn delete_entry(&mut self, id: &str) -> Result<(), DirectoryError>;

    /// Makes the pending changes of this session permanent.
    fn commit(&mut self) -> Result<(), DirectoryError>;

    /// Discards the pending changes of this session.
    fn rollback(&mut self) -> Result<(), DirectoryError>;

    /// Releases the session. Further calls fail with `Closed`.
    fn close(&mut self) -> Result<(), DirectoryError>;
}
