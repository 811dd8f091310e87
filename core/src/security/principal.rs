//! User principal resolved by the enclosing platform.

use std::fmt;

use crate::directory::Record;

/// An authenticated user identity backed by a directory profile.
///
/// The profile record is what computed group expressions see as
/// `currentUser`.
///
/// # Example
/// ```
/// use computed_groups_core::directory::Record;
/// use computed_groups_core::security::UserPrincipal;
///
/// let mut profile = Record::new("jdoe");
/// profile.set_property("user", "company", "acme");
///
/// let principal = UserPrincipal::new("jdoe").with_model(profile);
/// assert_eq!(principal.get_name(), "jdoe");
/// assert!(principal.get_model().is_some());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct UserPrincipal {
    name: String,
    model: Option<Record>,
}

impl UserPrincipal {
    /// Creates a principal with no profile record.
    pub fn new(name: impl Into<String>) -> Self {
        UserPrincipal {
            name: name.into(),
            model: None,
        }
    }

    /// Attaches the profile record (builder pattern).
    pub fn with_model(mut self, model: Record) -> Self {
        self.model = Some(model);
        self
    }

    /// Replaces the profile record.
    pub fn set_model(&mut self, model: Record) {
        self.model = Some(model);
    }

    /// Returns the principal name.
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Returns the profile record, if one was attached.
    pub fn get_model(&self) -> Option<&Record> {
        self.model.as_ref()
    }
}

impl fmt::Display for UserPrincipal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserPrincipal {{ name: {} }}", self.name)
    }
}
