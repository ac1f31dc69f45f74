//! RSVP services - attendee answers and the organizer's aggregate view

use super::event::{load_event, with_owners};
use crate::core::{AppError, AppJson, AppState, non_empty, parse_id, require_owner};
use crate::dtos::{
    EventRsvpsResponse, RsvpDTO, RsvpFilterQuery, RsvpListResponse, RsvpLookupResponse,
    RsvpRequestDTO, RsvpSubmitResponse, UserDTO,
};
use crate::entities::{RsvpResponse, User};
use crate::repositories::ReadMany;
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use axum_macros::debug_handler;
use futures_util::future::try_join;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const INVALID_RESPONSE: &str = "Invalid response. Must be 'yes', 'no', or 'maybe'";

/// `POST /api/events/{id}/rsvp` - creates or overwrites the caller's answer.
///
/// Capacity is informational only and never blocks a submission.
#[debug_handler]
#[instrument(skip(state, current_user, body), fields(user_id = %current_user.id))]
pub async fn submit_rsvp(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(event_id): Path<String>,
    AppJson(body): AppJson<RsvpRequestDTO>,
) -> Result<Json<RsvpSubmitResponse>, AppError> {
    let event_id = parse_id(&event_id, "Invalid event ID")?;
    let response = body.parse().ok_or_else(|| {
        warn!(response = %body.response, "Rejected RSVP value");
        AppError::bad_request(INVALID_RESPONSE)
    })?;

    let event = load_event(&state, &event_id).await?;
    if event.is_owned_by(&current_user.id) {
        warn!(event_id = %event_id, "Organizer tried to RSVP");
        return Err(AppError::bad_request(
            "Event organizers cannot RSVP to their own events",
        ));
    }

    let rsvp = state.rsvp.upsert(&current_user.id, &event_id, response).await?;
    info!(event_id = %event_id, response = %response, "RSVP submitted");

    let event = with_owners(&state, vec![event]).await?.pop();
    let mut dto = RsvpDTO::from(rsvp);
    dto.user = Some(UserDTO::from(current_user));
    dto.event = event;

    Ok(Json(RsvpSubmitResponse {
        message: "RSVP submitted successfully".to_string(),
        rsvp: dto,
    }))
}

/// `GET /api/events/{id}/rsvp` - `{rsvp: null}` when the caller has not answered
#[instrument(skip(state, current_user), fields(user_id = %current_user.id))]
pub async fn get_my_rsvp(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(event_id): Path<String>,
) -> Result<Json<RsvpLookupResponse>, AppError> {
    let event_id = parse_id(&event_id, "Invalid event ID")?;
    let rsvp = state.rsvp.find(&current_user.id, &event_id).await?;
    debug!(found = rsvp.is_some(), "Looked up own RSVP");

    Ok(Json(RsvpLookupResponse {
        rsvp: rsvp.map(|r| {
            let mut dto = RsvpDTO::from(r);
            dto.user = Some(UserDTO::from(current_user));
            dto
        }),
    }))
}

/// `GET /api/events/{id}/rsvps` - attendee list and yes/no/maybe totals, organizer only
#[instrument(skip(state, current_user), fields(user_id = %current_user.id))]
pub async fn get_event_rsvps(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(event_id): Path<String>,
) -> Result<Json<EventRsvpsResponse>, AppError> {
    let event_id = parse_id(&event_id, "Invalid event ID")?;
    let event = load_event(&state, &event_id).await?;
    require_owner(&event, &current_user, "Only event organizers can view RSVPs")?;

    let (rsvps, counts) = try_join(
        state.rsvp.list_by_event(&event_id),
        state.rsvp.counts(&event_id),
    )
    .await?;

    let user_ids: Vec<_> = rsvps.iter().map(|r| r.user_id).collect();
    let attendees: HashMap<_, _> = state
        .user
        .read_many(&user_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, UserDTO::from(u)))
        .collect();

    let rsvps = rsvps
        .into_iter()
        .map(|r| {
            let user = attendees.get(&r.user_id).cloned();
            let mut dto = RsvpDTO::from(r);
            dto.user = user;
            dto
        })
        .collect();

    info!(event_id = %event_id, total = counts.total(), "Served RSVPs to organizer");
    Ok(Json(EventRsvpsResponse { rsvps, counts }))
}

/// `GET /api/user/rsvps?response=` - the caller's answers with their events
#[instrument(skip(state, current_user, filter), fields(user_id = %current_user.id))]
pub async fn list_my_rsvps(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Query(filter): Query<RsvpFilterQuery>,
) -> Result<Json<RsvpListResponse>, AppError> {
    let response = non_empty(&filter.response)
        .map(|r| {
            r.parse::<RsvpResponse>()
                .map_err(|_| AppError::bad_request("Invalid response filter"))
        })
        .transpose()?;

    let rsvps = state.rsvp.list_by_user(&current_user.id, response).await?;

    let event_ids: Vec<_> = rsvps.iter().map(|r| r.event_id).collect();
    let events = state.event.read_many(&event_ids).await?;
    let events: HashMap<_, _> = with_owners(&state, events)
        .await?
        .into_iter()
        .map(|e| (e.id, e))
        .collect();

    let me = UserDTO::from(current_user);
    let rsvps = rsvps
        .into_iter()
        .map(|r| {
            let event = events.get(&r.event_id).cloned();
            let mut dto = RsvpDTO::from(r);
            dto.user = Some(me.clone());
            dto.event = event;
            dto
        })
        .collect();

    Ok(Json(RsvpListResponse { rsvps }))
}
