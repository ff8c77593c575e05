//! Ice Cream Directory - Backend
//!
//! Public directory of ice cream shops with events, coupons and reviews,
//! plus the admin, moderator and shop-owner back office.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;

use external::MailSender;
use services::NotificationService;
use store::{Gateway, RecordStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub gateway: Gateway,
    pub notifications: NotificationService,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, mailer: Arc<dyn MailSender>, config: Config) -> Self {
        Self {
            gateway: Gateway::new(store),
            notifications: NotificationService::new(mailer),
            config: Arc::new(config),
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Ice Cream Directory API v1.0"
}
