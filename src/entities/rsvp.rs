//! Rsvp entity and the per-event aggregate derived from it

use super::enums::RsvpResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One row per (user_id, event_id); resubmitting overwrites `response`.
#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct Rsvp {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub response: RsvpResponse,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Yes/no/maybe totals for one event. Never stored, always recomputed.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RsvpCounts {
    pub yes: i64,
    pub no: i64,
    pub maybe: i64,
}

impl RsvpCounts {
    pub fn add(&mut self, response: RsvpResponse, amount: i64) {
        match response {
            RsvpResponse::Yes => self.yes += amount,
            RsvpResponse::No => self.no += amount,
            RsvpResponse::Maybe => self.maybe += amount,
        }
    }

    pub fn total(&self) -> i64 {
        self.yes + self.no + self.maybe
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Folds `(response, amount)` pairs such as the rows of a GROUP BY.
impl FromIterator<(RsvpResponse, i64)> for RsvpCounts {
    fn from_iter<I: IntoIterator<Item = (RsvpResponse, i64)>>(iter: I) -> Self {
        let mut counts = RsvpCounts::default();
        for (response, amount) in iter {
            counts.add(response, amount);
        }
        counts
    }
}
