//! Response envelopes shared by the server handlers and the API client

use crate::dtos::{EventDTO, PaginationMeta, RsvpDTO};
use crate::entities::RsvpCounts;
use serde::{Deserialize, Serialize};

/// `{data: ...}`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// `{data: [...], pagination: {...}}`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// `GET /api/user/events` names the list `events` rather than `data`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserEventsResponse {
    pub events: Vec<EventDTO>,
    pub pagination: PaginationMeta,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RsvpSubmitResponse {
    pub message: String,
    pub rsvp: RsvpDTO,
}

/// The caller's RSVP to one event, `null` when they have not answered
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RsvpLookupResponse {
    pub rsvp: Option<RsvpDTO>,
}

/// Organizer view of an event's attendees
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EventRsvpsResponse {
    pub rsvps: Vec<RsvpDTO>,
    pub counts: RsvpCounts,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RsvpListResponse {
    pub rsvps: Vec<RsvpDTO>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}
