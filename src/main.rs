//! Curriculum Rotor Backend
//!
//! REST backend that rotates training topics per class type, with SQLite persistence.

mod api;
mod config;
mod db;
mod engine;
mod errors;
mod models;

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;
use engine::Engine;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Engine,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Curriculum Rotor Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Initialize database
    let pool = db::init_database(&config.db_path, config.db_max_connections).await?;
    let repo = Arc::new(Repository::new(pool));

    let state = AppState {
        engine: Engine::new(repo),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Rotors
        .route(
            "/class-types/{class_type_id}/rotors",
            get(api::list_rotors).post(api::create_rotor),
        )
        .route(
            "/class-types/{class_type_id}/active-rotor",
            get(api::get_active_rotor),
        )
        .route(
            "/rotors/{id}",
            get(api::get_rotor)
                .put(api::rename_rotor)
                .delete(api::delete_rotor),
        )
        .route("/rotors/{id}/activate", post(api::activate_rotor))
        .route("/rotors/{id}/archive", post(api::archive_rotor))
        .route("/rotors/{id}/preview", post(api::toggle_preview))
        // Themes
        .route(
            "/rotors/{id}/themes",
            get(api::list_themes).post(api::create_theme),
        )
        .route(
            "/themes/{id}",
            get(api::get_theme)
                .put(api::update_theme)
                .delete(api::delete_theme),
        )
        // Topics
        .route(
            "/themes/{id}/topics",
            get(api::list_topics).post(api::create_topic),
        )
        .route("/themes/{id}/topics/order", put(api::reorder_topics))
        .route(
            "/topics/{id}",
            get(api::get_topic)
                .put(api::update_topic)
                .delete(api::delete_topic),
        )
        // Scheduling
        .route(
            "/themes/{id}/schedule",
            get(api::get_active_schedule).post(api::schedule_action),
        )
        .route("/themes/{id}/schedules", get(api::list_schedules))
        .route("/themes/{id}/bump", post(api::bump_topic))
        // Votes
        .route(
            "/topics/{id}/votes",
            get(api::count_votes)
                .post(api::cast_vote)
                .delete(api::clear_votes),
        )
        // Curriculum views
        .route("/curriculum", get(api::get_overview))
        .route("/curriculum/{class_type_id}", get(api::get_view));

    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint. Fails when the database is unreachable.
async fn health_check(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match state.engine.repo().ping().await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE")
        }
    }
}

#[cfg(test)]
mod tests;
