//! Services module - HTTP handlers, one sub-module per resource

pub mod event;
pub mod rsvp;
pub mod user;

pub use event::{
    create_event, delete_event, get_event, list_events, list_events_by_date_range, list_my_events,
    list_public_events, list_upcoming_events, list_user_events, search_events, update_event,
};
pub use rsvp::{get_event_rsvps, get_my_rsvp, list_my_rsvps, submit_rsvp};
pub use user::{
    create_user, delete_user, get_me, get_user, get_user_by_email, list_users, update_user,
};

use crate::dtos::HealthResponse;
use axum::Json;

/// Root endpoint - health check
pub async fn root() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
    })
}
