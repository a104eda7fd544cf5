mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use shelfcheck_api::types::Role;

#[tokio::test]
async fn root_describes_the_api() -> Result<()> {
    let state = common::offline_state();
    let (status, body) = common::send(common::router(&state), common::json_request(Method::GET, "/", None, None)).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["name"], json!("Shelfcheck API"));
    Ok(())
}

#[tokio::test]
async fn health_reports_unreachable_database() -> Result<()> {
    let state = common::offline_state();
    let (status, body) =
        common::send(common::router(&state), common::json_request(Method::GET, "/health", None, None)).await?;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], json!(false));
    Ok(())
}

#[tokio::test]
async fn missing_token_is_401() -> Result<()> {
    let state = common::offline_state();
    let (status, body) =
        common::send(common::router(&state), common::json_request(Method::GET, "/api/stores", None, None)).await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], json!("UNAUTHORIZED"));
    Ok(())
}

#[tokio::test]
async fn malformed_header_is_401() -> Result<()> {
    let state = common::offline_state();
    let request = axum::http::Request::builder()
        .uri("/api/stores")
        .header("Authorization", "Token abc")
        .body(axum::body::Body::empty())?;
    let (status, _) = common::send(common::router(&state), request).await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn invalid_token_is_403() -> Result<()> {
    let state = common::offline_state();
    let request = common::json_request(Method::GET, "/api/stores", Some("not.a.jwt"), None);
    let (status, body) = common::send(common::router(&state), request).await?;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], json!("Invalid or expired token"));
    Ok(())
}

#[tokio::test]
async fn token_signed_with_other_secret_is_403() -> Result<()> {
    let state = common::offline_state();
    let mut other = common::offline_state();
    let mut config = (*other.config).clone();
    config.security.jwt_secret = "some-other-secret".to_string();
    other.config = std::sync::Arc::new(config);

    let forged = common::token(&other, 1, Role::Admin);
    let request = common::json_request(Method::GET, "/api/users", Some(&forged), None);
    let (status, _) = common::send(common::router(&state), request).await?;

    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn employees_cannot_reach_admin_routes() -> Result<()> {
    let state = common::offline_state();
    let token = common::token(&state, 5, Role::Employee);

    let checks = [
        (Method::POST, "/api/users", Some(json!({"username": "x", "password": "longenough"}))),
        (Method::DELETE, "/api/users/9", None),
        (Method::POST, "/api/stores", Some(json!({}))),
        (Method::DELETE, "/api/competitors/3", None),
        (Method::GET, "/api/photos", None),
        (Method::POST, "/api/photos/bulk-delete", Some(json!({"photoUrls": []}))),
    ];

    for (method, uri, body) in checks {
        let request = common::json_request(method.clone(), uri, Some(&token), body);
        let (status, body) = common::send(common::router(&state), request).await?;
        assert_eq!(status, StatusCode::FORBIDDEN, "{} {}", method, uri);
        assert_eq!(body["error"], json!("Admin privileges required"));
    }
    Ok(())
}

#[tokio::test]
async fn login_requires_credentials() -> Result<()> {
    let state = common::offline_state();
    let request = common::json_request(
        Method::POST,
        "/api/users/login",
        None,
        Some(json!({"username": "  ", "password": ""})),
    );
    let (status, body) = common::send(common::router(&state), request).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    Ok(())
}

#[tokio::test]
async fn short_password_change_is_rejected_before_lookup() -> Result<()> {
    let state = common::offline_state();
    let token = common::token(&state, 5, Role::Employee);
    let request = common::json_request(
        Method::PUT,
        "/api/users/me/password",
        Some(&token),
        Some(json!({"current_password": "whatever1", "new_password": "short"})),
    );
    let (status, body) = common::send(common::router(&state), request).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["new_password"].is_string());
    Ok(())
}
