//! # Computed Groups
//!
//! Group memberships computed from user profile attributes.
//!
//! Groups are defined by boolean expressions over the user record, such as
//! `currentUser.user.company == "acme"`, stored in a directory, and
//! evaluated every time the groups of a user are requested.
//!
//! - [`directory`] - directory sessions, records and an in-memory backend
//! - [`security`] - expression language, group computers and the actix-web
//!   extractor

pub mod directory;
pub mod security;
