//! Entities module - domain records persisted in the database
//!
//! Each entity maps one table. Wire shapes live in `dtos`.

pub mod enums;
pub mod event;
pub mod rsvp;
pub mod user;

pub use enums::{EventStatus, EventType, RsvpResponse, UnknownVariant, UserRole};
pub use event::Event;
pub use rsvp::{Rsvp, RsvpCounts};
pub use user::User;
