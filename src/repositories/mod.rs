//! Repositories module - database access, one repository per table
//!
//! Queries are runtime-checked (`sqlx::query_as::<_, T>`) and map rows through
//! `FromRow` on the entities, so the crate builds without a live database.
//! UUIDs are stored as 16-byte BLOBs and timestamps as RFC 3339 TEXT.

pub mod event;
pub mod rsvp;
pub mod traits;
pub mod user;

pub use traits::{Create, Delete, Read, ReadMany, Update};

pub use event::{EventFilter, EventRepository};
pub use rsvp::RsvpRepository;
pub use user::UserRepository;

/// Connection pool shared by every repository
pub type PoolType = sqlx::SqlitePool;

/// Identifiers of the rows seeded by `fixtures/*.sql`
#[cfg(test)]
pub(crate) mod fixture_ids {
    use uuid::{Uuid, uuid};

    pub const ALICE: Uuid = uuid!("11111111-1111-1111-1111-111111111111");
    pub const BOB: Uuid = uuid!("22222222-2222-2222-2222-222222222222");
    pub const CAROL: Uuid = uuid!("33333333-3333-3333-3333-333333333333");

    pub const GARDEN_PARTY: Uuid = uuid!("aaaaaaaa-0000-0000-0000-000000000001");
    pub const WEDDING: Uuid = uuid!("aaaaaaaa-0000-0000-0000-000000000002");
    pub const PAST_PICNIC: Uuid = uuid!("aaaaaaaa-0000-0000-0000-000000000003");
    pub const OFFSITE: Uuid = uuid!("aaaaaaaa-0000-0000-0000-000000000004");
}
