//! Computed Groups Demo Application
//!
//! Serves the computed groups of the caller. The caller is identified by the
//! `X-User` header; a real deployment authenticates upstream.

mod handlers;

use std::collections::BTreeMap;
use std::sync::Arc;

use actix_web::dev::Service as _;
use actix_web::{web, App, HttpMessage, HttpServer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use computed_groups_core::directory::{InMemoryDirectoryService, ScopedSession, Value};
use computed_groups_core::security::computed_groups::{
    ComputedGroupsConfig, DirectoryGroupComputer, GroupComputer, GroupDefinitions,
};
use computed_groups_core::security::UserPrincipal;

const USER_HEADER: &str = "X-User";

/// Creates the directories with demo profiles and group definitions.
fn directories(config: &ComputedGroupsConfig) -> std::io::Result<Arc<InMemoryDirectoryService>> {
    let directories = Arc::new(
        InMemoryDirectoryService::new()
            .with_directory(config.get_user_directory(), "user", "username")
            .with_directory(config.get_group_directory(), "group", "groupName"),
    );

    let mut users =
        ScopedSession::open(directories.as_ref(), config.get_user_directory()).map_err(to_io)?;
    for (username, company, email) in [
        ("alice", "acme", "alice@acme.com"),
        ("bob", "initech", "bob@initech.com"),
        ("carol", "acme", ""),
    ] {
        let mut fields = BTreeMap::new();
        fields.insert("username".to_string(), Value::from(username));
        fields.insert("company".to_string(), Value::from(company));
        fields.insert("email".to_string(), Value::from(email));
        users.create_entry(fields).map_err(to_io)?;
    }
    users.commit().map_err(to_io)?;
    users.release().map_err(to_io)?;

    let groups = GroupDefinitions::new(directories.clone(), config.clone());
    for (name, expression) in [
        ("acme", "currentUser.user.company == 'acme'"),
        ("no-mail", "empty currentUser.user.email"),
        ("everyone", "not empty currentUser.user.username"),
    ] {
        groups.create_group(name, expression).map_err(to_io)?;
    }

    Ok(directories)
}

fn to_io(e: impl std::error::Error + Send + Sync + 'static) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e)
}

fn print_startup_info() {
    println!("=== Computed Groups Demo ===");
    println!();
    println!("Server: http://127.0.0.1:8080");
    println!();
    println!("Users (pass the name in the {} header):", USER_HEADER);
    println!("  - alice  (acme, has email)");
    println!("  - bob    (initech, has email)");
    println!("  - carol  (acme, no email)");
    println!();
    println!("Endpoints:");
    println!("  GET /me/groups  - computed groups of the caller");
    println!("  GET /acme       - members of 'acme' only");
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ComputedGroupsConfig::default();
    let computer = DirectoryGroupComputer::new(directories(&config)?, config);
    let groups: Arc<dyn GroupComputer> = Arc::new(computer.clone());

    print_startup_info();
    info!("listening on 127.0.0.1:8080");

    HttpServer::new(move || {
        let computer = computer.clone();
        App::new()
            .app_data(web::Data::from(groups.clone()))
            .wrap_fn(move |req, srv| {
                let name = req
                    .headers()
                    .get(USER_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_string);
                if let Some(name) = name {
                    let mut principal = UserPrincipal::new(name.as_str());
                    match computer.get_user_model(&name) {
                        Ok(Some(model)) => principal.set_model(model),
                        Ok(None) => {}
                        Err(e) => warn!(user = %name, error = %e, "profile lookup failed"),
                    }
                    req.extensions_mut().insert(principal);
                }
                srv.call(req)
            })
            .service(handlers::my_groups)
            .service(handlers::acme)
    })
    .bind("127.0.0.1:8080")?
    .run()
    .await
}
