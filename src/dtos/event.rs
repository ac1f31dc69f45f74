//! Event DTOs - Data Transfer Objects for events

use crate::dtos::UserDTO;
use crate::entities::{Event, EventStatus, EventType, User};
use crate::validation::{
    MAX_ATTENDEES_LIMIT, check_event_date, check_event_status, check_event_type, check_future,
    check_not_blank, collect, parse_event_date,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

/// Event as returned to the client, with the owner embedded when known
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EventDTO {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub venue: String,
    pub event_date: DateTime<Utc>,
    pub image: String,
    pub event_type: EventType,
    pub is_public: bool,
    pub max_attendees: i32,
    pub status: EventStatus,
    pub user_id: Uuid,
    pub user: Option<UserDTO>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Event> for EventDTO {
    fn from(value: Event) -> Self {
        Self {
            id: value.id,
            title: value.title,
            description: value.description,
            venue: value.venue,
            event_date: value.event_date,
            image: value.image,
            event_type: value.event_type,
            is_public: value.is_public,
            max_attendees: value.max_attendees,
            status: value.status,
            user_id: value.user_id,
            user: None, // filled by with_owner
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl EventDTO {
    pub fn with_owner(mut self, owner: Option<User>) -> Self {
        self.user = owner.map(UserDTO::from);
        self
    }

    pub fn is_owned_by(&self, user_id: &Uuid) -> bool {
        self.user_id == *user_id
    }

    /// Attendee limit, `None` when unlimited (`max_attendees == 0`).
    pub fn capacity(&self) -> Option<u32> {
        u32::try_from(self.max_attendees).ok().filter(|c| *c > 0)
    }
}

/// Body of `POST /api/events`, as typed into the event form
#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct CreateEventDTO {
    #[validate(length(min = 3, max = 100, message = "Title must be between 3 and 100 characters"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 1000, message = "Description must be less than 1000 characters"))]
    pub description: String,

    #[serde(default)]
    pub venue: String,

    #[serde(default)]
    pub event_date: String,

    #[serde(default)]
    pub image: String,

    #[serde(default)]
    pub event_type: String,

    pub is_public: Option<bool>,

    #[validate(range(min = 0, max = 10000, message = "Max attendees must be between 1 and 10,000"))]
    pub max_attendees: Option<i32>,

    pub status: Option<String>,
}

/// Validated, typed insert data for an event
#[derive(Debug, Clone)]
pub struct NewEventDTO {
    pub title: String,
    pub description: String,
    pub venue: String,
    pub event_date: DateTime<Utc>,
    pub image: String,
    pub event_type: EventType,
    pub is_public: bool,
    pub max_attendees: i32,
    pub status: EventStatus,
    pub user_id: Uuid,
}

impl CreateEventDTO {
    /// Runs every field rule against the form as submitted at `now` and
    /// produces insert data owned by `user_id`.
    pub fn prepare(
        mut self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<NewEventDTO, ValidationErrors> {
        self.title = self.title.trim().to_string();
        self.venue = self.venue.trim().to_string();

        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(e) => e,
        };
        if self.title.is_empty() {
            errors.add("title", required("Title is required"));
        }
        collect(&mut errors, "venue", check_not_blank(&self.venue, "Venue is required"));
        let event_date = collect(&mut errors, "event_date", check_event_date(&self.event_date, now));
        let event_type = collect(&mut errors, "event_type", check_event_type(&self.event_type));
        let status = match self.status.as_deref() {
            Some(s) => collect(&mut errors, "status", check_event_status(s)),
            None => Some(EventStatus::default()),
        };

        match (event_date, event_type, status) {
            (Some(event_date), Some(event_type), Some(status)) if errors.is_empty() => {
                Ok(NewEventDTO {
                    title: self.title,
                    description: self.description,
                    venue: self.venue,
                    event_date,
                    image: self.image,
                    event_type,
                    is_public: self.is_public.unwrap_or(true),
                    max_attendees: self.max_attendees.unwrap_or(0),
                    status,
                    user_id,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Body of `PUT /api/events/{id}`; absent fields keep their stored value
#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateEventDTO {
    #[validate(length(min = 3, max = 100, message = "Title must be between 3 and 100 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 1000, message = "Description must be less than 1000 characters"))]
    pub description: Option<String>,

    pub venue: Option<String>,

    pub event_date: Option<String>,

    pub image: Option<String>,

    pub event_type: Option<String>,

    pub is_public: Option<bool>,

    #[validate(range(min = 0, max = 10000, message = "Max attendees must be between 1 and 10,000"))]
    pub max_attendees: Option<i32>,

    pub status: Option<String>,
}

/// Validated, typed partial update of an event
#[derive(Debug, Clone, Default)]
pub struct EventChangesDTO {
    pub title: Option<String>,
    pub description: Option<String>,
    pub venue: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    pub image: Option<String>,
    pub event_type: Option<EventType>,
    pub is_public: Option<bool>,
    pub max_attendees: Option<i32>,
    pub status: Option<EventStatus>,
}

impl UpdateEventDTO {
    /// Validates the provided fields against `current`. A date is only required
    /// to be in the future when it actually moves.
    pub fn prepare(
        mut self,
        current: &Event,
        now: DateTime<Utc>,
    ) -> Result<EventChangesDTO, ValidationErrors> {
        self.title = self.title.map(|t| t.trim().to_string());
        self.venue = self.venue.map(|v| v.trim().to_string());

        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(e) => e,
        };
        if let Some(venue) = self.venue.as_deref() {
            collect(&mut errors, "venue", check_not_blank(venue, "Venue is required"));
        }

        let event_date = match self.event_date.as_deref() {
            None => None,
            Some(raw) => match parse_event_date(raw) {
                None => {
                    errors.add("event_date", invalid_date());
                    None
                }
                Some(date) if date == current.event_date => None,
                Some(date) => collect(&mut errors, "event_date", check_future(date, now).map(|_| date)),
            },
        };
        let event_type = self
            .event_type
            .as_deref()
            .and_then(|t| collect(&mut errors, "event_type", check_event_type(t)));
        let status = self
            .status
            .as_deref()
            .and_then(|s| collect(&mut errors, "status", check_event_status(s)));

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(EventChangesDTO {
            title: self.title,
            description: self.description,
            venue: self.venue,
            event_date,
            image: self.image,
            event_type,
            is_public: self.is_public,
            max_attendees: self.max_attendees,
            status,
        })
    }
}

impl EventChangesDTO {
    pub fn apply(self, event: &mut Event) {
        if let Some(title) = self.title {
            event.title = title;
        }
        if let Some(description) = self.description {
            event.description = description;
        }
        if let Some(venue) = self.venue {
            event.venue = venue;
        }
        if let Some(event_date) = self.event_date {
            event.event_date = event_date;
        }
        if let Some(image) = self.image {
            event.image = image;
        }
        if let Some(event_type) = self.event_type {
            event.event_type = event_type;
        }
        if let Some(is_public) = self.is_public {
            event.is_public = is_public;
        }
        if let Some(max_attendees) = self.max_attendees {
            event.max_attendees = max_attendees.clamp(0, MAX_ATTENDEES_LIMIT);
        }
        if let Some(status) = self.status {
            event.status = status;
        }
    }
}

fn required(message: &'static str) -> ValidationError {
    let mut e = ValidationError::new("required");
    e.message = Some(Cow::Borrowed(message));
    e
}

fn invalid_date() -> ValidationError {
    let mut e = ValidationError::new("date");
    e.message = Some(Cow::Borrowed("Invalid date format"));
    e
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::field_messages;
    use chrono::Duration;

    fn form(now: DateTime<Utc>) -> CreateEventDTO {
        CreateEventDTO {
            title: "  Summer BBQ  ".into(),
            description: "Bring a salad".into(),
            venue: "Riverside park".into(),
            event_date: (now + Duration::days(7)).to_rfc3339(),
            event_type: "social".into(),
            ..Default::default()
        }
    }

    #[test]
    fn valid_form_gets_defaults() {
        let now = Utc::now();
        let owner = Uuid::new_v4();
        let event = form(now).prepare(owner, now).unwrap();
        assert_eq!(event.title, "Summer BBQ");
        assert_eq!(event.status, EventStatus::Draft);
        assert_eq!(event.max_attendees, 0);
        assert!(event.is_public);
        assert_eq!(event.user_id, owner);
    }

    #[test]
    fn every_broken_field_is_reported() {
        let now = Utc::now();
        let dto = CreateEventDTO {
            title: "ab".into(),
            description: "x".repeat(1001),
            venue: "   ".into(),
            event_date: (now - Duration::seconds(1)).to_rfc3339(),
            event_type: "rave".into(),
            max_attendees: Some(10_001),
            ..Default::default()
        };
        let errors = dto.prepare(Uuid::new_v4(), now).unwrap_err();
        let messages = field_messages(&errors);
        for field in ["title", "description", "venue", "event_date", "event_type", "max_attendees"] {
            assert!(messages.contains_key(field), "missing error for {}", field);
        }
        assert_eq!(messages["event_date"], "Event date must be in the future");
    }

    #[test]
    fn update_keeps_past_date_when_unchanged() {
        let now = Utc::now();
        let mut event = Event {
            id: Uuid::new_v4(),
            title: "Old".into(),
            description: String::new(),
            venue: "Hall".into(),
            event_date: now - Duration::days(2),
            image: String::new(),
            event_type: EventType::Other,
            is_public: true,
            max_attendees: 0,
            status: EventStatus::Published,
            user_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        };

        let same_date = UpdateEventDTO {
            title: Some("Renamed".into()),
            event_date: Some(event.event_date.to_rfc3339()),
            ..Default::default()
        };
        let changes = same_date.prepare(&event, now).unwrap();
        assert!(changes.event_date.is_none());
        changes.apply(&mut event);
        assert_eq!(event.title, "Renamed");

        let moved_to_past = UpdateEventDTO {
            event_date: Some((now - Duration::hours(1)).to_rfc3339()),
            ..Default::default()
        };
        assert!(moved_to_past.prepare(&event, now).is_err());
    }
}
