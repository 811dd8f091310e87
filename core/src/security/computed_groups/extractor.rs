//! Extractor for the computed groups of the current principal.

use std::collections::BTreeSet;
use std::future::{ready, Ready};
use std::ops::Deref;

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpMessage, HttpRequest};

use super::computer::GroupComputer;
use super::error::ComputedGroupsError;
use crate::security::UserPrincipal;

/// Computed groups of the principal attached to the request.
///
/// The enclosing application authenticates the request and stores a
/// [`UserPrincipal`] in the request extensions, and registers the group
/// computer as `web::Data<dyn GroupComputer>`.
///
/// # Usage
/// ```ignore
/// use computed_groups_core::security::computed_groups::UserGroups;
///
/// async fn handler(groups: UserGroups) -> impl Responder {
///     if groups.contains("acme") { "welcome" } else { "hello" }
/// }
/// ```
///
/// # Errors
/// - `401 Unauthorized` if no principal is attached.
/// - `500 Internal Server Error` if no computer is registered or the
///   directory fails.
#[derive(Debug, Clone)]
pub struct UserGroups(BTreeSet<String>);

impl UserGroups {
    /// Returns true if the principal belongs to `group`.
    pub fn contains(&self, group: &str) -> bool {
        self.0.contains(group)
    }

    /// Returns the inner set.
    pub fn into_inner(self) -> BTreeSet<String> {
        self.0
    }
}

impl Deref for UserGroups {
    type Target = BTreeSet<String>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for UserGroups {
    type Error = ComputedGroupsError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req))
    }
}

fn resolve(req: &HttpRequest) -> Result<UserGroups, ComputedGroupsError> {
    let principal = req
        .extensions()
        .get::<UserPrincipal>()
        .cloned()
        .ok_or(ComputedGroupsError::Unauthenticated)?;

    let computer = req
        .app_data::<web::Data<dyn GroupComputer>>()
        .ok_or(ComputedGroupsError::NotConfigured)?;

    computer.get_groups_for_user(&principal).map(UserGroups)
}
