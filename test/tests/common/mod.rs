//! Common test utilities and configuration.
//!
//! This module provides shared test infrastructure including:
//! - Directory fixture with user and group sessions
//! - Test app builder
//! - Helper functions

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use actix_web::dev::{Service, ServiceResponse};
use actix_web::{get, test, web, App, HttpMessage, HttpResponse, Responder};

use computed_groups_core::directory::{InMemoryDirectoryService, Record, ScopedSession, Value};
use computed_groups_core::security::computed_groups::{
    ComputedGroupsConfig, DirectoryGroupComputer, GroupComputer, UserGroups,
};
use computed_groups_core::security::UserPrincipal;

// =============================================================================
// Test Configuration
// =============================================================================

pub const USER_DIRECTORY: &str = "userDirectory";
pub const GROUP_DIRECTORY: &str = "shibbGroup";

/// Header carrying the caller name in test requests.
pub const USER_HEADER: &str = "X-User";

/// Configuration pointing at the test directories.
pub fn test_config() -> ComputedGroupsConfig {
    ComputedGroupsConfig::new()
        .user_directory(USER_DIRECTORY)
        .group_directory(GROUP_DIRECTORY)
}

/// Directory service with an empty user and group directory.
pub fn test_directories() -> Arc<InMemoryDirectoryService> {
    Arc::new(
        InMemoryDirectoryService::new()
            .with_directory(USER_DIRECTORY, "user", "username")
            .with_directory(GROUP_DIRECTORY, "group", "groupName"),
    )
}

// =============================================================================
// Directory Fixture
// =============================================================================

/// Open sessions on the user and group directories.
///
/// Entries created through the fixture are never committed: dropping the
/// fixture rolls both sessions back.
pub struct Fixture {
    pub directories: Arc<InMemoryDirectoryService>,
    pub config: ComputedGroupsConfig,
    users: ScopedSession,
    groups: ScopedSession,
}

impl Fixture {
    pub fn new() -> Self {
        let directories = test_directories();
        let users = ScopedSession::open(directories.as_ref(), USER_DIRECTORY).unwrap();
        let groups = ScopedSession::open(directories.as_ref(), GROUP_DIRECTORY).unwrap();
        Fixture {
            directories,
            config: test_config(),
            users,
            groups,
        }
    }

    /// Creates a user entry and returns it.
    pub fn create_user(&mut self, username: &str) -> Record {
        let mut fields = BTreeMap::new();
        fields.insert("username".to_string(), Value::from(username));
        self.users.create_entry(fields).unwrap()
    }

    /// Creates a user entry with a first name and an email.
    pub fn create_profile(&mut self, username: &str, first_name: &str, email: &str) -> Record {
        let mut fields = BTreeMap::new();
        fields.insert("username".to_string(), Value::from(username));
        fields.insert("firstName".to_string(), Value::from(first_name));
        fields.insert("email".to_string(), Value::from(email));
        self.users.create_entry(fields).unwrap()
    }

    /// Creates a computed group entry and returns it.
    pub fn create_group(&mut self, name: &str, expression: &str) -> Record {
        let mut fields = BTreeMap::new();
        fields.insert("groupName".to_string(), Value::from(name));
        fields.insert("expressionLanguage".to_string(), Value::from(expression));
        self.groups.create_entry(fields).unwrap()
    }

    /// Group computer over the fixture directories.
    pub fn computer(&self) -> DirectoryGroupComputer {
        DirectoryGroupComputer::new(self.directories.clone(), self.config.clone())
    }

    pub fn user_count(&self) -> usize {
        self.directories.entry_count(USER_DIRECTORY).unwrap()
    }

    pub fn group_count(&self) -> usize {
        self.directories.entry_count(GROUP_DIRECTORY).unwrap()
    }
}

// =============================================================================
// Test Handlers
// =============================================================================

#[get("/groups")]
async fn groups_handler(groups: UserGroups) -> impl Responder {
    let names: Vec<String> = groups.into_inner().into_iter().collect();
    HttpResponse::Ok().body(names.join(","))
}

#[get("/acme")]
async fn acme_handler(groups: UserGroups) -> impl Responder {
    if groups.contains("acme") {
        HttpResponse::Ok().body("acme member")
    } else {
        HttpResponse::Forbidden().finish()
    }
}

// =============================================================================
// Test App Builder
// =============================================================================

/// Directory service with committed profiles and group definitions.
///
/// Users:
/// - alice: company acme, email set
/// - bob: company initech, email set
/// - carol: company acme, no email
pub fn seeded_directories() -> Arc<InMemoryDirectoryService> {
    let directories = test_directories();

    let mut users = ScopedSession::open(directories.as_ref(), USER_DIRECTORY).unwrap();
    for (username, company, email) in [
        ("alice", "acme", "alice@acme.com"),
        ("bob", "initech", "bob@initech.com"),
        ("carol", "acme", ""),
    ] {
        let mut fields = BTreeMap::new();
        fields.insert("username".to_string(), Value::from(username));
        fields.insert("company".to_string(), Value::from(company));
        fields.insert("email".to_string(), Value::from(email));
        users.create_entry(fields).unwrap();
    }
    users.commit().unwrap();
    users.release().unwrap();

    let mut groups = ScopedSession::open(directories.as_ref(), GROUP_DIRECTORY).unwrap();
    for (name, expression) in [
        ("acme", "currentUser.user.company == 'acme'"),
        ("no-mail", "empty currentUser.user.email"),
        ("broken", "currentUser.user.company =="),
    ] {
        let mut fields = BTreeMap::new();
        fields.insert("groupName".to_string(), Value::from(name));
        fields.insert("expressionLanguage".to_string(), Value::from(expression));
        groups.create_entry(fields).unwrap();
    }
    groups.commit().unwrap();
    groups.release().unwrap();

    directories
}

/// Creates the test app.
///
/// The caller named in the `X-User` header is attached as principal, with
/// its profile when the user directory knows it. When `with_computer` is
/// false no group computer is registered.
pub async fn create_test_app(
    with_computer: bool,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    let computer = DirectoryGroupComputer::new(seeded_directories(), test_config());

    let mut app = App::new();
    if with_computer {
        let groups: Arc<dyn GroupComputer> = Arc::new(computer.clone());
        app = app.app_data(web::Data::from(groups));
    }

    test::init_service(
        app.wrap_fn(move |req, srv| {
            let name = req
                .headers()
                .get(USER_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            if let Some(name) = name {
                let mut principal = UserPrincipal::new(name.as_str());
                if let Ok(Some(model)) = computer.get_user_model(&name) {
                    principal.set_model(model);
                }
                req.extensions_mut().insert(principal);
            }
            srv.call(req)
        })
        .service(groups_handler)
        .service(acme_handler),
    )
    .await
}

/// Reads a response body as a string.
pub async fn body_string(resp: ServiceResponse) -> String {
    let body = test::read_body(resp).await;
    String::from_utf8_lossy(&body).to_string()
}
