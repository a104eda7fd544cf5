// Requests rejected before any database work; these run without Postgres.
mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;

use shelfcheck_api::types::Role;

#[tokio::test]
async fn empty_batches_are_rejected() -> Result<()> {
    let state = common::offline_state();
    let token = common::token(&state, 5, Role::Employee);

    for uri in ["/api/facings/podravka/batch", "/api/facings/competitor/batch", "/api/price-checks/batch"] {
        let request = common::json_request(Method::POST, uri, Some(&token), Some(json!([])));
        let (status, body) = common::send(common::router(&state), request).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["code"], json!("VALIDATION_ERROR"));
    }
    Ok(())
}

#[tokio::test]
async fn missing_field_names_the_row() -> Result<()> {
    let state = common::offline_state();
    let token = common::token(&state, 5, Role::Employee);
    let rows = json!([
        { "store_id": 3, "product_id": 12, "category": "soup", "facings_count": 4 },
        { "store_id": 3, "product_id": 15, "facings_count": 2 }
    ]);

    let request = common::json_request(Method::POST, "/api/facings/podravka/batch", Some(&token), Some(rows));
    let (status, body) = common::send(common::router(&state), request).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["rows[1].category"].is_string());
    Ok(())
}

#[tokio::test]
async fn rows_for_another_user_are_forbidden() -> Result<()> {
    let state = common::offline_state();

    // Admins included: rows are only ever recorded for the caller
    for role in [Role::Employee, Role::Admin] {
        let token = common::token(&state, 5, role);
        let rows = json!([
            { "user_id": 5, "store_id": 3, "brand_name": "Knorr", "category": "soup", "facings_count": 3 },
            { "user_id": 6, "store_id": 3, "brand_name": "Knorr", "category": "soup", "facings_count": 1 }
        ]);
        let request = common::json_request(Method::POST, "/api/facings/competitor/batch", Some(&token), Some(rows));
        let (status, body) = common::send(common::router(&state), request).await?;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], json!("FORBIDDEN"));
    }
    Ok(())
}

#[tokio::test]
async fn price_check_with_two_references_is_rejected() -> Result<()> {
    let state = common::offline_state();
    let token = common::token(&state, 5, Role::Employee);
    let rows = json!([{
        "store_id": 3,
        "category": "soup",
        "product_type": "podravka",
        "podravka_product_id": 12,
        "competitor_id": 4,
        "regular_price": "2.49"
    }]);

    let request = common::json_request(Method::POST, "/api/price-checks/batch", Some(&token), Some(rows));
    let (status, body) = common::send(common::router(&state), request).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["rows[0].product_type"].is_string());
    Ok(())
}

#[tokio::test]
async fn update_requires_batch_id() -> Result<()> {
    let state = common::offline_state();
    let token = common::token(&state, 5, Role::Employee);
    let update = json!({ "facings": [{ "product_id": 12, "facings_count": 1 }] });

    let request = common::json_request(Method::PUT, "/api/facings/podravka/batch", Some(&token), Some(update));
    let (status, body) = common::send(common::router(&state), request).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["batch_id"].is_string());
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_400() -> Result<()> {
    let state = common::offline_state();
    let token = common::token(&state, 5, Role::Employee);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/facings/podravka/batch")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("[{\"store_id\": 3,"))?;
    let (status, body) = common::send(common::router(&state), request).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("INVALID_JSON"));
    Ok(())
}

#[tokio::test]
async fn non_uuid_batch_id_is_400() -> Result<()> {
    let state = common::offline_state();
    let token = common::token(&state, 5, Role::Employee);
    let request = common::json_request(Method::GET, "/api/facings/podravka/batch/not-a-uuid", Some(&token), None);
    let (status, _) = common::send(common::router(&state), request).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn reports_for_other_users_are_forbidden() -> Result<()> {
    let state = common::offline_state();
    let token = common::token(&state, 5, Role::Employee);

    for uri in ["/api/facings/with-competitors?user_id=6", "/api/facings/podravka/batches?user_id=6"] {
        let request = common::json_request(Method::GET, uri, Some(&token), None);
        let (status, _) = common::send(common::router(&state), request).await?;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);
    }
    Ok(())
}

#[tokio::test]
async fn repeated_report_filters_are_read_and_scoped() -> Result<()> {
    let state = common::offline_state();
    let token = common::token(&state, 5, Role::Employee);

    let request = common::json_request(
        Method::GET,
        "/api/facings/with-competitors?user_id=5&user_id=6",
        Some(&token),
        None,
    );
    let (status, body) = common::send(common::router(&state), request).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], json!("FORBIDDEN"));

    let request = common::json_request(
        Method::GET,
        "/api/facings/podravka/report?store_id=1&store_id=seven",
        Some(&token),
        None,
    );
    let (status, body) = common::send(common::router(&state), request).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["store_id"].is_string());
    Ok(())
}

#[tokio::test]
async fn photo_upload_without_storage_is_503() -> Result<()> {
    let state = common::offline_state();
    let token = common::token(&state, 5, Role::Employee);

    let boundary = "X-SHELFCHECK-BOUNDARY";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"photo_type\"\r\n\r\nshelf\r\n--{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/photos")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary))
        .body(Body::from(body))?;
    let (status, body) = common::send(common::router(&state), request).await?;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], json!("SERVICE_UNAVAILABLE"));
    Ok(())
}

#[tokio::test]
async fn photo_upload_without_multipart_body_is_400() -> Result<()> {
    let state = common::offline_state();
    let token = common::token(&state, 5, Role::Employee);

    let request = common::json_request(Method::POST, "/api/photos", Some(&token), Some(json!({ "photo_type": "shelf" })));
    let (status, body) = common::send(common::router(&state), request).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["code"], json!("BAD_REQUEST"));
    Ok(())
}
