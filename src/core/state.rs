//! Application State - repositories and secrets shared by every handler

use crate::repositories::{EventRepository, PoolType, RsvpRepository, UserRepository};

pub struct AppState {
    pub user: UserRepository,

    pub event: EventRepository,

    pub rsvp: RsvpRepository,

    /// Shared HS256 secret used to verify identity-provider tokens
    pub jwt_secret: String,
}

impl AppState {
    pub fn new(pool: PoolType, jwt_secret: String) -> Self {
        Self {
            user: UserRepository::new(pool.clone()),
            event: EventRepository::new(pool.clone()),
            rsvp: RsvpRepository::new(pool),
            jwt_secret,
        }
    }
}
