//! Event services - listing, lookup and organizer-only mutation of events

use crate::core::{AppError, AppJson, AppState, non_empty, parse_id, require_owner};
use crate::dtos::{
    CreateEventDTO, DEFAULT_PAGE_SIZE, DataResponse, DateRangeQuery, EventDTO, EventFilterQuery,
    MessageResponse, PageQuery, PaginatedResponse, Pagination, SearchQuery, UpdateEventDTO,
    USER_EVENTS_PAGE_SIZE, UserEventsResponse,
};
use crate::entities::{Event, EventStatus, User};
use crate::repositories::{Create, Delete, EventFilter, Read, ReadMany, Update};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_macros::debug_handler;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Loads an event or answers 404 `Event not found`
pub(crate) async fn load_event(state: &AppState, event_id: &Uuid) -> Result<Event, AppError> {
    state.event.read(event_id).await?.ok_or_else(|| {
        warn!(event_id = %event_id, "Event not found");
        AppError::not_found("Event not found")
    })
}

/// Converts events to DTOs with their organizers embedded, one query for all owners
pub(crate) async fn with_owners(
    state: &AppState,
    events: Vec<Event>,
) -> Result<Vec<EventDTO>, AppError> {
    let mut owner_ids: Vec<Uuid> = events.iter().map(|e| e.user_id).collect();
    owner_ids.sort();
    owner_ids.dedup();

    let owners: HashMap<Uuid, User> = state
        .user
        .read_many(&owner_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    Ok(events
        .into_iter()
        .map(|event| {
            let owner = owners.get(&event.user_id).cloned();
            EventDTO::from(event).with_owner(owner)
        })
        .collect())
}

async fn with_owner(state: &AppState, event: Event) -> Result<EventDTO, AppError> {
    let owner = state.user.read(&event.user_id).await?;
    Ok(EventDTO::from(event).with_owner(owner))
}

fn filter_from_query(query: &EventFilterQuery) -> Result<EventFilter, AppError> {
    let event_type = non_empty(&query.event_type)
        .map(|t| t.parse().map_err(|_| AppError::bad_request("Invalid event type")))
        .transpose()?;
    let status = non_empty(&query.status)
        .map(|s| s.parse().map_err(|_| AppError::bad_request("Invalid status")))
        .transpose()?;
    let user_id = non_empty(&query.user_id)
        .map(|id| parse_id(id, "Invalid user ID"))
        .transpose()?;

    Ok(EventFilter {
        event_type,
        status,
        user_id,
        ..Default::default()
    })
}

async fn paginated(
    state: &AppState,
    filter: EventFilter,
    page: Pagination,
) -> Result<PaginatedResponse<EventDTO>, AppError> {
    let (events, total) = state.event.list(&filter, &page).await?;
    Ok(PaginatedResponse {
        data: with_owners(state, events).await?,
        pagination: page.meta(total),
    })
}

/// `GET /api/events` with optional `event_type`, `status` and `user_id` filters
#[instrument(skip(state, page, filter))]
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
    Query(filter): Query<EventFilterQuery>,
) -> Result<Json<PaginatedResponse<EventDTO>>, AppError> {
    let filter = filter_from_query(&filter)?;
    let page = page.resolve(DEFAULT_PAGE_SIZE);
    debug!(?filter, "Listing events");
    Ok(Json(paginated(&state, filter, page).await?))
}

/// `GET /api/events/public` - public and published only
#[instrument(skip(state, page, filter))]
pub async fn list_public_events(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
    Query(filter): Query<EventFilterQuery>,
) -> Result<Json<PaginatedResponse<EventDTO>>, AppError> {
    let filter = EventFilter {
        event_type: filter_from_query(&filter)?.event_type,
        is_public: Some(true),
        status: Some(EventStatus::Published),
        ..Default::default()
    };
    Ok(Json(paginated(&state, filter, page.resolve(DEFAULT_PAGE_SIZE)).await?))
}

/// `GET /api/events/upcoming` - published events starting after now
#[instrument(skip(state, page, filter))]
pub async fn list_upcoming_events(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
    Query(filter): Query<EventFilterQuery>,
) -> Result<Json<PaginatedResponse<EventDTO>>, AppError> {
    let requested = filter_from_query(&filter)?;
    let filter = EventFilter {
        event_type: requested.event_type,
        user_id: requested.user_id,
        status: Some(EventStatus::Published),
        starts_after: Some(Utc::now()),
        ..Default::default()
    };
    Ok(Json(paginated(&state, filter, page.resolve(DEFAULT_PAGE_SIZE)).await?))
}

#[instrument(skip(state, page, search))]
pub async fn search_events(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
    Query(search): Query<SearchQuery>,
) -> Result<Json<PaginatedResponse<EventDTO>>, AppError> {
    let term = non_empty(&search.q).ok_or_else(|| {
        warn!("Search without a term");
        AppError::bad_request("Search term is required")
    })?;
    debug!(term, "Searching events");

    let filter = EventFilter {
        search: Some(term.to_string()),
        status: Some(EventStatus::Published),
        ..Default::default()
    };
    Ok(Json(paginated(&state, filter, page.resolve(DEFAULT_PAGE_SIZE)).await?))
}

fn day_bounds(start: NaiveDate, end: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let from = start.and_hms_opt(0, 0, 0)?.and_utc();
    let to = end.and_hms_nano_opt(23, 59, 59, 999_999_999)?.and_utc();
    Some((from, to))
}

/// `GET /api/events/date-range?start_date=YYYY-MM-DD&end_date=YYYY-MM-DD`, both days included
#[instrument(skip(state, page, range, filter))]
pub async fn list_events_by_date_range(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
    Query(range): Query<DateRangeQuery>,
    Query(filter): Query<EventFilterQuery>,
) -> Result<Json<PaginatedResponse<EventDTO>>, AppError> {
    let (Some(start), Some(end)) = (non_empty(&range.start_date), non_empty(&range.end_date))
    else {
        return Err(AppError::bad_request("start_date and end_date are required"));
    };
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d")
        .map_err(|_| AppError::bad_request("Invalid start_date format. Use YYYY-MM-DD"))?;
    let end = NaiveDate::parse_from_str(end, "%Y-%m-%d")
        .map_err(|_| AppError::bad_request("Invalid end_date format. Use YYYY-MM-DD"))?;
    let between = day_bounds(start, end)
        .ok_or_else(|| AppError::bad_request("Invalid date range"))?;

    let filter = EventFilter {
        user_id: filter_from_query(&filter)?.user_id,
        status: Some(EventStatus::Published),
        between: Some(between),
        ..Default::default()
    };
    Ok(Json(paginated(&state, filter, page.resolve(DEFAULT_PAGE_SIZE)).await?))
}

#[instrument(skip(state))]
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> Result<Json<DataResponse<EventDTO>>, AppError> {
    let event_id = parse_id(&event_id, "Invalid event ID")?;
    let event = load_event(&state, &event_id).await?;
    Ok(Json(DataResponse::new(with_owner(&state, event).await?)))
}

/// `POST /api/events` - the caller becomes the organizer
#[debug_handler]
#[instrument(skip(state, current_user, body), fields(user_id = %current_user.id))]
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    AppJson(body): AppJson<CreateEventDTO>,
) -> Result<(StatusCode, Json<DataResponse<EventDTO>>), AppError> {
    // the date-in-future rule is evaluated against this instant only
    let new_event = body.prepare(current_user.id, Utc::now())?;
    let event = state.event.create(&new_event).await?;
    info!(event_id = %event.id, "Event created");

    let dto = EventDTO::from(event).with_owner(Some(current_user));
    Ok((StatusCode::CREATED, Json(DataResponse::new(dto))))
}

#[debug_handler]
#[instrument(skip(state, current_user, body), fields(user_id = %current_user.id))]
pub async fn update_event(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(event_id): Path<String>,
    AppJson(body): AppJson<UpdateEventDTO>,
) -> Result<Json<DataResponse<EventDTO>>, AppError> {
    let event_id = parse_id(&event_id, "Invalid event ID")?;
    let event = load_event(&state, &event_id).await?;
    require_owner(&event, &current_user, "You can only update your own events")?;

    let changes = body.prepare(&event, Utc::now())?;
    let updated = state.event.update(&event_id, &changes).await?;
    info!(event_id = %event_id, "Event updated");

    let dto = EventDTO::from(updated).with_owner(Some(current_user));
    Ok(Json(DataResponse::new(dto)))
}

/// Hard delete; the event's RSVPs go with it
#[instrument(skip(state, current_user), fields(user_id = %current_user.id))]
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(event_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let event_id = parse_id(&event_id, "Invalid event ID")?;
    let event = load_event(&state, &event_id).await?;
    require_owner(&event, &current_user, "You can only delete your own events")?;

    state.event.delete(&event_id).await?;
    info!(event_id = %event_id, "Event deleted");
    Ok(Json(MessageResponse::new("Event deleted successfully")))
}

/// `GET /api/users/{id}/events`
#[instrument(skip(state, page))]
pub async fn list_user_events(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<EventDTO>>, AppError> {
    let user_id = parse_id(&user_id, "Invalid user ID")?;
    let filter = EventFilter {
        user_id: Some(user_id),
        ..Default::default()
    };
    Ok(Json(paginated(&state, filter, page.resolve(DEFAULT_PAGE_SIZE)).await?))
}

/// `GET /api/user/events` - the caller's own events, dashboard sized pages
#[instrument(skip(state, current_user, page), fields(user_id = %current_user.id))]
pub async fn list_my_events(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Query(page): Query<PageQuery>,
) -> Result<Json<UserEventsResponse>, AppError> {
    let page = page.resolve(USER_EVENTS_PAGE_SIZE);
    let filter = EventFilter {
        user_id: Some(current_user.id),
        ..Default::default()
    };
    let (events, total) = state.event.list(&filter, &page).await?;
    debug!(total, "Listed own events");

    let events = events
        .into_iter()
        .map(|e| EventDTO::from(e).with_owner(Some(current_user.clone())))
        .collect();
    Ok(Json(UserEventsResponse {
        events,
        pagination: page.meta(total),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_bounds_cover_whole_days() {
        let start = NaiveDate::from_ymd_opt(2099, 6, 1).unwrap();
        let (from, to) = day_bounds(start, start).unwrap();
        assert_eq!(from.to_rfc3339(), "2099-06-01T00:00:00+00:00");
        assert!(to > from + chrono::Duration::hours(23));
        assert!(to < from + chrono::Duration::days(1));
    }

    #[test]
    fn filter_query_rejects_unknown_values() {
        let bad_type = EventFilterQuery {
            event_type: Some("rave".into()),
            ..Default::default()
        };
        assert_eq!(
            filter_from_query(&bad_type).unwrap_err().message(),
            "Invalid event type"
        );

        let blank = EventFilterQuery {
            event_type: Some(String::new()),
            status: Some("published".into()),
            user_id: None,
        };
        let filter = filter_from_query(&blank).unwrap();
        assert!(filter.event_type.is_none());
        assert_eq!(filter.status, Some(EventStatus::Published));
    }
}
