// Router assembly: route tiers, per-class rate limits and global layers.

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{elevated, protected, public};
use crate::middleware::rate_limit::{
    auth_rate_limiter, general_rate_limiter, upload_rate_limiter, user_creation_rate_limiter, RateLimiterLayer,
};
use crate::middleware::{jwt_auth_middleware, require_admin};
use crate::state::AppState;

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let limits = state.config.api.enable_rate_limiting;
    let limiter = |build: fn() -> Option<RateLimiterLayer>| if limits { build() } else { None };

    let api = Router::new()
        .merge(protected_routes(limiter(upload_rate_limiter)))
        .merge(elevated_routes(limiter(user_creation_rate_limiter)))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));
    let api = with_limiter(api, limiter(general_rate_limiter));

    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(public_routes(limiter(auth_rate_limiter)))
        .merge(api)
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes))
        .layer(cors_layer(&state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn with_limiter(router: Router<AppState>, layer: Option<RateLimiterLayer>) -> Router<AppState> {
    match layer {
        Some(layer) => router.route_layer(layer),
        None => router,
    }
}

fn public_routes(auth_limit: Option<RateLimiterLayer>) -> Router<AppState> {
    let login = Router::new().route("/api/users/login", post(public::login_post));
    with_limiter(login, auth_limit)
}

fn protected_routes(upload_limit: Option<RateLimiterLayer>) -> Router<AppState> {
    use protected::{competitor_facings, competitors, facings, photos, price_checks, products, reports, stores, users};

    let uploads = with_limiter(Router::new().route("/api/photos", post(photos::photo_post)), upload_limit);

    Router::new()
        // Users
        .route("/api/users", get(users::users_list))
        .route("/api/users/me/password", put(users::password_put))
        // Stores
        .route("/api/stores", get(stores::stores_list))
        .route("/api/stores/assigned", get(stores::stores_assigned))
        .route("/api/stores/user/:user_id", get(stores::stores_by_user))
        .route("/api/stores/:store_id", get(stores::store_get))
        .route("/api/stores/:store_id/products", get(stores::store_products))
        // Catalog
        .route("/api/products", get(products::products_list))
        .route("/api/products/competitor", get(products::competitor_products_list))
        .route("/api/competitors", get(competitors::competitors_list))
        .route("/api/competitors/id/:competitor_id", get(competitors::competitor_get))
        .route("/api/competitors/name/:brand_name", get(competitors::competitor_by_name))
        .route("/api/competitors/category/:category", get(competitors::competitors_by_category))
        // Own-brand facings
        .route(
            "/api/facings/podravka/batch",
            post(facings::batch_post).put(facings::batch_put),
        )
        .route(
            "/api/facings/podravka/batch/:batch_id",
            get(facings::batch_get).delete(facings::batch_delete),
        )
        .route("/api/facings/podravka/batches", get(facings::batches_list))
        .route("/api/facings/podravka/report", get(facings::report_get))
        // Competitor facings
        .route(
            "/api/facings/competitor/batch",
            post(competitor_facings::batch_post).put(competitor_facings::batch_put),
        )
        .route(
            "/api/facings/competitor/batch/:batch_id",
            get(competitor_facings::batch_get).delete(competitor_facings::batch_delete),
        )
        .route("/api/facings/competitor/batches", get(competitor_facings::batches_list))
        .route("/api/facings/with-competitors", get(reports::with_competitors_get))
        // Price checks
        .route("/api/price-checks", get(price_checks::price_checks_list))
        .route("/api/price-checks/batch", post(price_checks::batch_post))
        .route(
            "/api/price-checks/batch/:batch_id",
            get(price_checks::batch_get).delete(price_checks::batch_delete),
        )
        // Photos
        .merge(uploads)
        .route("/api/photos/mine", get(photos::photos_mine))
        .route(
            "/api/photos/:photo_id",
            get(photos::photo_get).delete(photos::photo_delete),
        )
}

fn elevated_routes(user_creation_limit: Option<RateLimiterLayer>) -> Router<AppState> {
    use elevated::{competitors, photos, products, stores, users};

    let user_creation = with_limiter(Router::new().route("/api/users", post(users::user_post)), user_creation_limit);

    Router::new()
        .merge(user_creation)
        .route(
            "/api/users/:user_id",
            get(users::user_get).put(users::user_put).delete(users::user_delete),
        )
        .route("/api/stores", post(stores::store_post))
        .route("/api/stores/:store_id", put(stores::store_put).delete(stores::store_delete))
        .route("/api/products", post(products::product_post))
        .route("/api/products/:product_id/rankings/:year", put(products::ranking_put))
        .route("/api/products/competitor", post(products::competitor_product_post))
        .route(
            "/api/products/competitor/:product_id",
            put(products::competitor_product_put).delete(products::competitor_product_delete),
        )
        .route("/api/competitors", post(competitors::competitor_post))
        .route(
            "/api/competitors/:competitor_id",
            put(competitors::competitor_put).delete(competitors::competitor_delete),
        )
        .route("/api/photos", get(photos::photos_list))
        .route("/api/photos/bulk-delete", post(photos::photos_bulk_delete))
        .route_layer(from_fn(require_admin))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let security = &state.config.security;
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let methods = [Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS];
    let headers = [
        HeaderName::from_static("authorization"),
        HeaderName::from_static("content-type"),
    ];

    if security.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::new().allow_origin(Any).allow_methods(methods).allow_headers(headers);
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
}
