//! UserGroups extractor tests.
//!
//! The test app attaches the caller named in the `X-User` header as
//! principal and resolves its computed groups through the extractor.

mod common;

use actix_web::http::StatusCode;
use actix_web::test;

use common::{body_string, create_test_app, USER_HEADER};

// =============================================================================
// Group Resolution Tests
// =============================================================================

#[actix_web::test]
async fn test_groups_for_acme_user() {
    let app = create_test_app(true).await;

    let req = test::TestRequest::get()
        .uri("/groups")
        .insert_header((USER_HEADER, "alice"))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "acme");
}

#[actix_web::test]
async fn test_groups_for_user_in_several_groups() {
    let app = create_test_app(true).await;

    let req = test::TestRequest::get()
        .uri("/groups")
        .insert_header((USER_HEADER, "carol"))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "acme,no-mail");
}

#[actix_web::test]
async fn test_groups_for_user_in_no_group() {
    let app = create_test_app(true).await;

    let req = test::TestRequest::get()
        .uri("/groups")
        .insert_header((USER_HEADER, "bob"))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "");
}

#[actix_web::test]
async fn test_groups_for_principal_without_profile() {
    let app = create_test_app(true).await;

    let req = test::TestRequest::get()
        .uri("/groups")
        .insert_header((USER_HEADER, "dave"))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "");
}

// =============================================================================
// Access Tests
// =============================================================================

#[actix_web::test]
async fn test_acme_route_with_member() {
    let app = create_test_app(true).await;

    let req = test::TestRequest::get()
        .uri("/acme")
        .insert_header((USER_HEADER, "carol"))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("acme member"));
}

#[actix_web::test]
async fn test_acme_route_with_non_member_forbidden() {
    let app = create_test_app(true).await;

    let req = test::TestRequest::get()
        .uri("/acme")
        .insert_header((USER_HEADER, "bob"))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

// =============================================================================
// Error Tests
// =============================================================================

#[actix_web::test]
async fn test_groups_without_principal_unauthorized() {
    let app = create_test_app(true).await;

    let req = test::TestRequest::get().uri("/groups").to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_groups_without_computer_internal_error() {
    let app = create_test_app(false).await;

    let req = test::TestRequest::get()
        .uri("/groups")
        .insert_header((USER_HEADER, "alice"))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_string(resp).await;
    assert!(body.contains("error"));
}
