//! DTOs module - Data Transfer Objects
//!
//! Wire shapes of the REST API. The server serializes them and the API client
//! deserializes the same types.

pub mod event;
pub mod query;
pub mod response;
pub mod rsvp;
pub mod user;

pub use event::{CreateEventDTO, EventChangesDTO, EventDTO, NewEventDTO, UpdateEventDTO};
pub use query::{
    DEFAULT_PAGE_SIZE, DateRangeQuery, EventFilterQuery, MAX_PAGE_SIZE, PageQuery, Pagination,
    PaginationMeta, RsvpFilterQuery, SearchQuery, USER_EVENTS_PAGE_SIZE,
};
pub use response::{
    DataResponse, EventRsvpsResponse, HealthResponse, MessageResponse, PaginatedResponse,
    RsvpListResponse, RsvpLookupResponse, RsvpSubmitResponse, UserEventsResponse,
};
pub use rsvp::{RsvpDTO, RsvpRequestDTO};
pub use user::{CreateUserDTO, IdentityDTO, UpdateUserDTO, UserDTO};
