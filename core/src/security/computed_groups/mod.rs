//! Computed groups.
//!
//! # Overview
//! A computed group has no stored member list. It is a name plus a boolean
//! expression; a user belongs to the group when the expression evaluates
//! to true with the user's profile bound as `currentUser`:
//!
//! | group    | expression                                  |
//! |----------|---------------------------------------------|
//! | `acme`   | `currentUser.user.company == "acme"`        |
//! | `no-mail`| `empty currentUser.user.email`              |
//!
//! # Failure semantics
//! - Any expression failure means "not a member", including a missing
//!   attribute. Groups with an empty expression have no member.
//! - A directory failure is returned to the caller.
//!
//! # Components
//! - [`helper`] - `is_valid_el` / `is_user_in_group`
//! - [`GroupComputer`] / [`DirectoryGroupComputer`] - membership resolution
//! - [`GroupDefinitions`] - definition management
//! - [`UserGroups`] - actix-web extractor

mod admin;
mod computer;
mod config;
mod error;
mod extractor;
pub mod helper;

pub use admin::GroupDefinitions;
pub use computer::{DirectoryGroupComputer, GroupComputer};
pub use config::ComputedGroupsConfig;
pub use error::ComputedGroupsError;
pub use extractor::UserGroups;
pub use helper::{is_user_in_group, is_valid_el, GroupExpressionHelper};

/// A computed group definition as stored in the group directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDefinition {
    /// Group name, unique among computed groups.
    pub name: String,
    /// Membership expression; `None` when the entry has none.
    pub expression: Option<String>,
}

impl GroupDefinition {
    /// Creates a definition.
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        GroupDefinition {
            name: name.into(),
            expression: Some(expression.into()),
        }
    }
}
