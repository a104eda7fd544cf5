// handlers/public/health.rs - GET / and GET /health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Shelfcheck API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Field merchandising backend: shelf facings, price checks and store photos",
            "endpoints": {
                "login": "/api/users/login (public)",
                "users": "/api/users (protected)",
                "stores": "/api/stores (protected)",
                "products": "/api/products (protected)",
                "competitors": "/api/competitors (protected)",
                "facings": "/api/facings/* (protected)",
                "price_checks": "/api/price-checks (protected)",
                "photos": "/api/photos (protected)",
            }
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.db.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
