//! RSVP DTOs - Data Transfer Objects for RSVPs

use crate::dtos::{EventDTO, UserDTO};
use crate::entities::{Rsvp, RsvpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RsvpDTO {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub response: RsvpResponse,
    /// Present on the organizer's attendee list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserDTO>,
    /// Present on the caller's own RSVP list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<EventDTO>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Rsvp> for RsvpDTO {
    fn from(value: Rsvp) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id,
            event_id: value.event_id,
            response: value.response,
            user: None,
            event: None,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Body of `POST /api/events/{id}/rsvp`.
///
/// `response` stays a string so that an unknown value produces the API's own
/// 400 message instead of a JSON rejection.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RsvpRequestDTO {
    pub response: String,
}

impl RsvpRequestDTO {
    pub fn new(response: RsvpResponse) -> Self {
        Self {
            response: response.as_str().to_string(),
        }
    }

    pub fn parse(&self) -> Option<RsvpResponse> {
        self.response.parse().ok()
    }
}
