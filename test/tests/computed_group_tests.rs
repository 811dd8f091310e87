//! Computed group tests.
//!
//! Groups and users are created through uncommitted directory sessions,
//! which the fixture rolls back when it goes out of scope.

mod common;

use computed_groups_core::directory::Value;
use computed_groups_core::security::computed_groups::{
    is_user_in_group, is_valid_el, GroupComputer,
};
use computed_groups_core::security::expression::{ExpressionContext, ExpressionEvaluator};
use computed_groups_core::security::UserPrincipal;

use common::Fixture;

// =============================================================================
// Expression Tests
// =============================================================================

#[test]
fn test_only_el() {
    let evaluator = ExpressionEvaluator::new();
    let context = ExpressionContext::new().with_binding("hello", vec!["hello", "world"]);

    let second = evaluator.evaluate_str("${hello[1]}", &context).unwrap();
    assert_eq!(second.as_str(), Some("world"));

    let first = evaluator.evaluate_str("${hello[0]}", &context).unwrap();
    assert_ne!(first.as_str(), Some("world"));
}

#[test]
fn test_el_on_user_record() {
    let mut fixture = Fixture::new();
    let mut user = fixture.create_user("user1");
    user.set_property("user", "company", "test");
    user.set_property("user", "email", "mail");

    assert!(is_user_in_group(&user, "currentUser.user.company == \"test\""));
    assert!(!is_user_in_group(&user, "currentUser.user.email == \"mail2\""));
}

#[test]
fn test_el_on_created_fields() {
    let mut fixture = Fixture::new();
    let user = fixture.create_user("user1");

    assert_eq!(user.id(), "user1");
    assert!(is_user_in_group(&user, "currentUser.user.username == 'user1'"));
}

#[test]
fn test_valid_el_method() {
    assert!(!is_valid_el(Some("")));
    assert!(!is_valid_el(None));

    assert!(is_valid_el(Some("currentUser.user.email != \"test\"")));
    assert!(!is_valid_el(Some("fdsfds ! fdsf^6")));
    assert!(!is_valid_el(Some("testMethodCall == hello")));
    assert!(is_valid_el(Some("empty currentUser")));
}

// =============================================================================
// Group Computer Tests
// =============================================================================

#[test]
fn test_computed_group_get_all() {
    let mut fixture = Fixture::new();
    let computer = fixture.computer();

    assert_eq!(computer.get_all_group_ids().unwrap().len(), 0);
    fixture.create_group("group1", "");
    fixture.create_group("group2", "");
    fixture.create_group("group3", "");
    fixture.create_group("group4", "");

    let ids = computer.get_all_group_ids().unwrap();
    assert_eq!(ids.len(), 4);
    assert!(ids.contains("group1"));
    assert!(ids.contains("group4"));
}

#[test]
fn test_computed_group_get_groups_for_user() {
    let mut fixture = Fixture::new();
    let mut user = fixture.create_user("John");
    user.set_property("user", "firstName", "test");
    user.set_property("user", "email", "test");

    let principal = UserPrincipal::new("JDoh").with_model(user);

    let computer = fixture.computer();
    assert_eq!(computer.get_groups_for_user(&principal).unwrap().len(), 0);

    fixture.create_group("group1", "currentUser.user.firstName == \"test\"");
    fixture.create_group("group2", "currentUser.user.firstName != \"test\"");
    fixture.create_group("group3", "currentUser.user.email == \"test\"");
    fixture.create_group("group4", "currentUser.user.email != \"test\"");

    let groups = computer.get_groups_for_user(&principal).unwrap();
    assert_eq!(groups.len(), 2);
    assert!(groups.contains("group1"));
    assert!(groups.contains("group3"));
}

#[test]
fn test_groups_for_user_with_stored_profile() {
    let mut fixture = Fixture::new();
    fixture.create_profile("jdoe", "John", "jdoe@example.com");
    fixture.create_group("johns", "currentUser.user.firstName == 'John'");
    fixture.create_group("no-mail", "empty currentUser.user.email");

    let computer = fixture.computer();
    let model = computer.get_user_model("jdoe").unwrap().unwrap();
    let principal = UserPrincipal::new("jdoe").with_model(model);

    let groups = computer.get_groups_for_user(&principal).unwrap();
    assert_eq!(groups.into_iter().collect::<Vec<_>>(), vec!["johns"]);
}

#[test]
fn test_groups_for_principal_without_profile() {
    let mut fixture = Fixture::new();
    fixture.create_group("everyone", "empty currentUser.user.email");

    let computer = fixture.computer();
    let groups = computer
        .get_groups_for_user(&UserPrincipal::new("anonymous"))
        .unwrap();
    assert!(groups.is_empty());
}

#[test]
fn test_malformed_group_never_matches() {
    let mut fixture = Fixture::new();
    let mut user = fixture.create_user("user1");
    user.set_property("user", "company", "acme");
    fixture.create_group("broken", "currentUser.user.company ==");
    fixture.create_group("mismatch", "currentUser.user.company > 3");
    fixture.create_group("acme", "currentUser.user.company == 'acme'");

    let computer = fixture.computer();
    let principal = UserPrincipal::new("user1").with_model(user);

    let groups = computer.get_groups_for_user(&principal).unwrap();
    assert_eq!(groups.into_iter().collect::<Vec<_>>(), vec!["acme"]);
    assert_eq!(computer.get_all_group_ids().unwrap().len(), 3);
}

#[test]
fn test_membership_follows_profile_changes() {
    let mut fixture = Fixture::new();
    let mut user = fixture.create_user("user1");
    user.set_property("user", "company", "acme");
    fixture.create_group("acme", "currentUser.user.company == 'acme'");

    let computer = fixture.computer();
    let principal = UserPrincipal::new("user1").with_model(user.clone());
    assert!(computer.get_groups_for_user(&principal).unwrap().contains("acme"));

    user.set_property("user", "company", Value::Null);
    let principal = UserPrincipal::new("user1").with_model(user);
    assert!(computer.get_groups_for_user(&principal).unwrap().is_empty());
}

#[test]
fn test_has_group_and_search() {
    let mut fixture = Fixture::new();
    fixture.create_group("staff-paris", "");
    fixture.create_group("staff-lyon", "");
    fixture.create_group("admins", "");

    let computer = fixture.computer();
    assert!(computer.has_group("admins").unwrap());
    assert!(!computer.has_group("Admins").unwrap());

    assert_eq!(
        computer.search_groups("STAFF-*").unwrap(),
        vec!["staff-lyon", "staff-paris"]
    );
    assert_eq!(computer.search_groups("min").unwrap(), vec!["admins"]);
    assert_eq!(computer.search_groups("staff-????").unwrap(), vec!["staff-lyon"]);
}

// =============================================================================
// Fixture Tests
// =============================================================================

#[test]
fn test_fixture_rolls_back_on_drop() {
    let directories = {
        let mut fixture = Fixture::new();
        fixture.create_user("user1");
        fixture.create_group("group1", "");
        assert_eq!(fixture.user_count(), 1);
        assert_eq!(fixture.group_count(), 1);
        fixture.directories.clone()
    };

    assert_eq!(directories.entry_count(common::USER_DIRECTORY), Some(0));
    assert_eq!(directories.entry_count(common::GROUP_DIRECTORY), Some(0));
}
