//! # Handyhub - Service Marketplace Backend
//!
//! ## Modules
//!
//! - [`config`] - Environment configuration resolved once at startup
//! - [`extract`] - JSON body extractor answering rejections with the envelope
//! - [`handlers`] - HTTP request handlers for various endpoints
//! - [`models`] - Records, request payloads and the response envelope
//! - [`services`] - Hashing, email delivery and the verification workflow
//! - [`store`] - PostgreSQL and in-memory persistence
//! - [`utils`] - Utility functions and constants

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod services;
pub mod store;
pub mod telemetry;
pub mod utils;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{AppConfig, Environment};
use crate::error::StartupError;
use crate::handlers::*;
use crate::models::AppState;
use crate::services::notification::{HttpMailSender, LogSender, NotificationSender};
use crate::store::{MemoryStore, PgStore};

/// Builds the shared state from the resolved configuration.
///
/// - Production mails through [`HttpMailSender`], anything else logs through [`LogSender`]
/// - `DATABASE_URL` selects [`PgStore`], otherwise an empty [`MemoryStore`] is used
///
/// # Errors
///
/// Returns [`StartupError`] when the database cannot be reached or migrated.
pub async fn build_state(config: AppConfig) -> Result<Arc<AppState>, StartupError> {
    let notifier: Arc<dyn NotificationSender> = match (&config.environment, &config.mail) {
        (Environment::Production, Some(mail)) => {
            info!("Running in production mode with [HttpMailSender]");
            Arc::new(HttpMailSender::new(mail))
        }
        _ => {
            info!("Running in development mode with [LogSender (Mock)]");
            Arc::new(LogSender)
        }
    };

    let state = match config.database_url.clone() {
        Some(url) => {
            let store = Arc::new(PgStore::connect(&url).await?);
            AppState::new(store, notifier, config)
        }
        None => {
            info!("DATABASE_URL not set, using in-memory store");
            AppState::new(Arc::new(MemoryStore::new()), notifier, config)
        }
    };

    Ok(Arc::new(state))
}

/// Creates the Axum router with every application route.
pub fn app(state: Arc<AppState>) -> Router {
    let user_routes = Router::new()
        .route("/signup", post(signup))
        .route("/resendVerificationLink", post(resend_verification_link))
        .route("/verify/{user_id}/{unique_string}", get(verify_email))
        .route("/verified", get(verified_page))
        .route("/signin", post(signin))
        .route("/getUsers", get(list_users))
        .route("/getProfile/{id}", get(get_profile))
        .route("/update/{id}", put(update_user))
        .route("/delete/{id}", delete(delete_user));

    let category_routes = Router::new()
        .route("/create", post(create_category))
        .route("/update/{id}", put(update_category))
        .route("/delete/{id}", delete(delete_category));

    let service_routes = Router::new()
        .route("/create", post(create_service))
        .route("/update/{id}", put(update_service))
        .route("/delete/{id}", delete(delete_service));

    let favourite_routes = Router::new()
        .route("/create", post(create_favourite))
        .route("/{user_id}", get(list_favourites))
        .route("/delete/{id}", delete(delete_favourite));

    let order_routes = Router::new()
        .route("/create", post(create_order))
        .route("/user/{user_id}", get(list_user_orders))
        .route("/order/{id}", get(get_order))
        .route("/user/{user_id}/order/{order_id}", get(get_user_order))
        .route("/update/{id}", put(update_order))
        .route("/delete/{id}", delete(delete_order));

    Router::new()
        .route("/health-check", get(health_check))
        .route("/category", get(list_categories))
        .route("/service", get(list_services))
        .nest("/user", user_routes)
        .nest("/category", category_routes)
        .nest("/service", service_routes)
        .nest("/favourite", favourite_routes)
        .nest("/order", order_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
