//! RsvpRepository - RSVP upserts, lookups and per-event aggregates

use super::PoolType;
use crate::entities::{Rsvp, RsvpCounts, RsvpResponse};
use chrono::Utc;
use sqlx::Error;
use tracing::{debug, info, instrument};
use uuid::Uuid;

pub struct RsvpRepository {
    connection_pool: PoolType,
}

impl RsvpRepository {
    pub fn new(connection_pool: PoolType) -> Self {
        Self { connection_pool }
    }

    /// Inserts the RSVP or overwrites the response of the existing one.
    ///
    /// Atomic on the `(user_id, event_id)` unique index: concurrent submissions
    /// for the same pair leave exactly one row, holding the last response.
    #[instrument(skip(self), fields(user_id = %user_id, event_id = %event_id))]
    pub async fn upsert(
        &self,
        user_id: &Uuid,
        event_id: &Uuid,
        response: RsvpResponse,
    ) -> Result<Rsvp, Error> {
        let now = Utc::now();
        let rsvp = sqlx::query_as::<_, Rsvp>(
            r#"
            INSERT INTO rsvps (id, user_id, event_id, response, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id, event_id) DO UPDATE SET
                response = excluded.response,
                updated_at = excluded.updated_at
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(event_id)
        .bind(response)
        .bind(now)
        .bind(now)
        .fetch_one(&self.connection_pool)
        .await?;

        info!(response = %rsvp.response, "RSVP stored");
        Ok(rsvp)
    }

    #[instrument(skip(self), fields(user_id = %user_id, event_id = %event_id))]
    pub async fn find(&self, user_id: &Uuid, event_id: &Uuid) -> Result<Option<Rsvp>, Error> {
        sqlx::query_as::<_, Rsvp>("SELECT * FROM rsvps WHERE user_id = ? AND event_id = ?")
            .bind(user_id)
            .bind(event_id)
            .fetch_optional(&self.connection_pool)
            .await
    }

    #[instrument(skip(self), fields(event_id = %event_id))]
    pub async fn list_by_event(&self, event_id: &Uuid) -> Result<Vec<Rsvp>, Error> {
        sqlx::query_as::<_, Rsvp>(
            "SELECT * FROM rsvps WHERE event_id = ? ORDER BY updated_at DESC",
        )
        .bind(event_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_by_user(
        &self,
        user_id: &Uuid,
        response: Option<RsvpResponse>,
    ) -> Result<Vec<Rsvp>, Error> {
        let rsvps = match response {
            Some(response) => {
                sqlx::query_as::<_, Rsvp>(
                    "SELECT * FROM rsvps WHERE user_id = ? AND response = ? ORDER BY updated_at DESC",
                )
                .bind(user_id)
                .bind(response)
                .fetch_all(&self.connection_pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Rsvp>(
                    "SELECT * FROM rsvps WHERE user_id = ? ORDER BY updated_at DESC",
                )
                .bind(user_id)
                .fetch_all(&self.connection_pool)
                .await?
            }
        };

        debug!(found = rsvps.len(), "Listed RSVPs of user");
        Ok(rsvps)
    }

    /// Yes/no/maybe totals, recomputed from the rows on every call
    #[instrument(skip(self), fields(event_id = %event_id))]
    pub async fn counts(&self, event_id: &Uuid) -> Result<RsvpCounts, Error> {
        let rows: Vec<(RsvpResponse, i64)> = sqlx::query_as(
            "SELECT response, COUNT(*) FROM rsvps WHERE event_id = ? GROUP BY response",
        )
        .bind(event_id)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::fixture_ids::{ALICE, BOB, CAROL, GARDEN_PARTY, OFFSITE, WEDDING};
    use sqlx::SqlitePool;

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "events", "rsvps")))]
    async fn test_upsert_overwrites_previous_response(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = RsvpRepository::new(pool);

        let first = repo.upsert(&CAROL, &WEDDING, RsvpResponse::Yes).await?;
        let second = repo.upsert(&CAROL, &WEDDING, RsvpResponse::No).await?;

        assert_eq!(first.id, second.id);
        assert_eq!(second.response, RsvpResponse::No);
        assert_eq!(repo.list_by_event(&WEDDING).await?.len(), 1);

        let stored = repo.find(&CAROL, &WEDDING).await?.unwrap();
        assert_eq!(stored.response, RsvpResponse::No);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "events", "rsvps")))]
    async fn test_counts_always_have_every_key(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = RsvpRepository::new(pool);

        let counts = repo.counts(&GARDEN_PARTY).await?;
        assert_eq!(counts, RsvpCounts { yes: 1, no: 0, maybe: 1 });

        let empty = repo.counts(&WEDDING).await?;
        assert_eq!(empty, RsvpCounts::default());
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "events", "rsvps")))]
    async fn test_list_by_user_with_filter(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = RsvpRepository::new(pool);

        assert_eq!(repo.list_by_user(&ALICE, None).await?.len(), 1);
        let declined = repo.list_by_user(&ALICE, Some(RsvpResponse::No)).await?;
        assert_eq!(declined[0].event_id, OFFSITE);
        assert!(repo.list_by_user(&BOB, Some(RsvpResponse::Maybe)).await?.is_empty());
        Ok(())
    }
}
