//! # Kasir API
//!
//! HTTP/JSON adapter over `kasir-service`.
//!
//! ## Routes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET    /health                         no auth                         │
//! │  POST   /api/login                      no auth (checks credentials)    │
//! │                                                                         │
//! │  GET    /api/products                   any   ?page&limit&search&       │
//! │                                               warehouse_id              │
//! │  GET    /api/products/{id}              any                             │
//! │  POST   /api/products                   admin                           │
//! │  PUT    /api/products                   admin  {id, ...fields}          │
//! │  DELETE /api/products                   admin  {id}                     │
//! │  GET    /api/products/stock-summary     admin                           │
//! │  GET    /api/products/export            admin                           │
//! │  POST   /api/products/import            admin                           │
//! │                                                                         │
//! │  GET    /api/warehouses                 any                             │
//! │  POST/PUT/DELETE /api/warehouses        admin                           │
//! │                                                                         │
//! │  GET/POST/DELETE /api/users             admin                           │
//! │  POST   /api/users/password             any    own password             │
//! │                                                                         │
//! │  GET    /api/reports?date=DD-MM-YYYY    any                             │
//! │  GET    /api/transactions               any    today, caller's scope    │
//! │  POST   /api/transactions               any                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod error;
pub mod routes;

use axum::body::Body;
use axum::http::Request;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use kasir_service::Kasir;

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub kasir: Kasir,
}

impl AppState {
    pub fn new(kasir: Kasir) -> Self {
        AppState { kasir }
    }
}

/// Builds the full router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/login", post(routes::login::login))
        .route(
            "/products",
            get(routes::products::list)
                .post(routes::products::create)
                .put(routes::products::update)
                .delete(routes::products::delete),
        )
        .route("/products/stock-summary", get(routes::products::stock_summary))
        .route("/products/export", get(routes::products::export))
        .route("/products/import", post(routes::products::import))
        .route("/products/{id}", get(routes::products::get))
        .route(
            "/warehouses",
            get(routes::warehouses::list)
                .post(routes::warehouses::create)
                .put(routes::warehouses::update)
                .delete(routes::warehouses::delete),
        )
        .route(
            "/users",
            get(routes::users::list)
                .post(routes::users::register)
                .delete(routes::users::delete),
        )
        .route("/users/password", post(routes::users::change_password))
        .route("/reports", get(routes::reports::daily))
        .route(
            "/transactions",
            get(routes::transactions::list_today).post(routes::transactions::post),
        );

    Router::new()
        .route("/health", get(routes::health))
        .nest("/api", api)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    id = %Uuid::new_v4(),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .with_state(state)
}
