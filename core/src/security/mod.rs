//! Computed group resolution for authenticated principals.
//!
//! # Modules
//! - `expression` - Expression language group rules are written in
//! - `computed_groups` - Group computation, validation and management
//! - `principal` - User principal model

pub mod computed_groups;
pub mod expression;
mod principal;

pub use computed_groups::{
    ComputedGroupsConfig, ComputedGroupsError, DirectoryGroupComputer, GroupComputer,
    GroupDefinitions, UserGroups,
};
pub use principal::UserPrincipal;
