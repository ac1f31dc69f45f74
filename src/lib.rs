//! EventHub - event planning with RSVPs
//!
//! The crate holds the HTTP backend (`core`, `repositories`, `services`), the
//! wire types shared with clients (`dtos`, `entities`), the field validation
//! rules used on both sides (`validation`) and a typed API client (`client`).

pub mod client;
pub mod core;
pub mod dtos;
pub mod entities;
pub mod repositories;
pub mod services;
pub mod validation;

pub use crate::core::{AppError, AppState, auth, config};
pub use services::root;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use repositories::PoolType;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;

/// Opens the SQLite pool, creating the database file if needed, with foreign
/// keys enforced so deletes cascade.
pub async fn connect_database(url: &str, max_connections: u32) -> Result<PoolType, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

/// Builds the application router, everything under `/api` except the health check
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .nest("/api", configure_api_routes(state.clone()))
        .with_state(state)
}

/// Public reads and authenticated writes share paths; the authentication
/// middleware is attached with `route_layer` so it only wraps matched routes.
fn configure_api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use crate::services::*;

    let public_routes = Router::new()
        .route("/events", get(list_events))
        .route("/events/public", get(list_public_events))
        .route("/events/upcoming", get(list_upcoming_events))
        .route("/events/search", get(search_events))
        .route("/events/date-range", get(list_events_by_date_range))
        .route("/events/{id}", get(get_event))
        .route("/users/{id}/events", get(list_user_events));

    let authenticated_routes = Router::new()
        .route("/events", post(create_event))
        .route("/events/{id}", put(update_event).delete(delete_event))
        .route("/events/{id}/rsvp", get(get_my_rsvp).post(submit_rsvp))
        .route("/events/{id}/rsvps", get(get_event_rsvps))
        .route("/users", get(list_users).post(create_user))
        .route("/users/email/{email}", get(get_user_by_email))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/user/me", get(get_me))
        .route("/user/events", get(list_my_events))
        .route("/user/rsvps", get(list_my_rsvps))
        .route_layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ));

    public_routes.merge(authenticated_routes)
}
