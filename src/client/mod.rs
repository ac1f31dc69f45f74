//! Client side of the API: an HTTP client and the non-visual state of the
//! event page's RSVP section.

pub mod api;
pub mod error;
pub mod rsvp_panel;

pub use api::ApiClient;
pub use error::ClientError;
pub use rsvp_panel::{Notice, RsvpPanel};
