//! Route handlers reading the computed groups of the caller.

use actix_web::{get, HttpResponse, Responder};
use serde::Serialize;

use computed_groups_core::security::computed_groups::UserGroups;

#[derive(Serialize)]
struct GroupsResponse {
    groups: Vec<String>,
}

/// Lists the computed groups of the caller.
#[get("/me/groups")]
pub async fn my_groups(groups: UserGroups) -> impl Responder {
    HttpResponse::Ok().json(GroupsResponse {
        groups: groups.into_inner().into_iter().collect(),
    })
}

/// Reserved to members of the `acme` computed group.
#[get("/acme")]
pub async fn acme(groups: UserGroups) -> impl Responder {
    if groups.contains("acme") {
        HttpResponse::Ok().body("Welcome to ACME")
    } else {
        HttpResponse::Forbidden().body("ACME members only")
    }
}
