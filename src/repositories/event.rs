//! EventRepository - persistence of events

use super::{Create, Delete, PoolType, Read, ReadMany, Update};
use crate::dtos::{EventChangesDTO, NewEventDTO, Pagination};
use crate::entities::{Event, EventStatus, EventType};
use chrono::{DateTime, Utc};
use sqlx::{Error, QueryBuilder, Sqlite};
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Conditions combined with AND by [`EventRepository::list`]
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub event_type: Option<EventType>,
    pub status: Option<EventStatus>,
    pub user_id: Option<Uuid>,
    pub is_public: Option<bool>,
    /// Strictly after
    pub starts_after: Option<DateTime<Utc>>,
    /// Inclusive window on `event_date`
    pub between: Option<(DateTime<Utc>, DateTime<Utc>)>,
    /// Substring of title or description, case-insensitive
    pub search: Option<String>,
}

impl EventFilter {
    fn push_where(&self, query_builder: &mut QueryBuilder<'_, Sqlite>) {
        query_builder.push(" WHERE 1 = 1");
        if let Some(event_type) = self.event_type {
            query_builder.push(" AND event_type = ").push_bind(event_type);
        }
        if let Some(status) = self.status {
            query_builder.push(" AND status = ").push_bind(status);
        }
        if let Some(user_id) = self.user_id {
            query_builder.push(" AND user_id = ").push_bind(user_id);
        }
        if let Some(is_public) = self.is_public {
            query_builder.push(" AND is_public = ").push_bind(is_public);
        }
        if let Some(after) = self.starts_after {
            query_builder.push(" AND event_date > ").push_bind(after);
        }
        if let Some((from, to)) = self.between {
            query_builder
                .push(" AND event_date BETWEEN ")
                .push_bind(from)
                .push(" AND ")
                .push_bind(to);
        }
        if let Some(ref term) = self.search {
            let pattern = format!("%{}%", escape_like(term));
            query_builder
                .push(" AND (title LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR description LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub struct EventRepository {
    connection_pool: PoolType,
}

impl EventRepository {
    pub fn new(connection_pool: PoolType) -> Self {
        Self { connection_pool }
    }

    /// Matching events ordered by start date, plus the total before paging
    #[instrument(skip(self), fields(page = page.page, page_size = page.page_size))]
    pub async fn list(
        &self,
        filter: &EventFilter,
        page: &Pagination,
    ) -> Result<(Vec<Event>, i64), Error> {
        let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM events");
        filter.push_where(&mut count_query);
        let total: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.connection_pool)
            .await?;

        let mut query_builder = QueryBuilder::new("SELECT * FROM events");
        filter.push_where(&mut query_builder);
        query_builder
            .push(" ORDER BY event_date ASC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let events = query_builder
            .build_query_as::<Event>()
            .fetch_all(&self.connection_pool)
            .await?;

        debug!(found = events.len(), total, "Listed events");
        Ok((events, total))
    }
}

impl Create<Event, NewEventDTO> for EventRepository {
    #[instrument(skip(self, data), fields(user_id = %data.user_id))]
    async fn create(&self, data: &NewEventDTO) -> Result<Event, Error> {
        let now = Utc::now();
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (
                id, title, description, venue, event_date, image, event_type,
                is_public, max_attendees, status, user_id, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.venue)
        .bind(data.event_date)
        .bind(&data.image)
        .bind(data.event_type)
        .bind(data.is_public)
        .bind(data.max_attendees)
        .bind(data.status)
        .bind(data.user_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.connection_pool)
        .await?;

        info!(event_id = %event.id, "Event created");
        Ok(event)
    }
}

impl Read<Event, Uuid> for EventRepository {
    #[instrument(skip(self), fields(event_id = %id))]
    async fn read(&self, id: &Uuid) -> Result<Option<Event>, Error> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await?;

        if event.is_none() {
            debug!("Event not found");
        }
        Ok(event)
    }
}

impl ReadMany<Event, Uuid> for EventRepository {
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn read_many(&self, ids: &[Uuid]) -> Result<Vec<Event>, Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query_builder = QueryBuilder::new("SELECT * FROM events WHERE id IN (");
        let mut separated = query_builder.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        query_builder
            .build_query_as::<Event>()
            .fetch_all(&self.connection_pool)
            .await
    }
}

impl Update<Event, EventChangesDTO, Uuid> for EventRepository {
    #[instrument(skip(self, data), fields(event_id = %id))]
    async fn update(&self, id: &Uuid, data: &EventChangesDTO) -> Result<Event, Error> {
        let mut event = self.read(id).await?.ok_or(Error::RowNotFound)?;
        data.clone().apply(&mut event);

        let updated = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events SET
                title = ?, description = ?, venue = ?, event_date = ?, image = ?,
                event_type = ?, is_public = ?, max_attendees = ?, status = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.venue)
        .bind(event.event_date)
        .bind(&event.image)
        .bind(event.event_type)
        .bind(event.is_public)
        .bind(event.max_attendees)
        .bind(event.status)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.connection_pool)
        .await?;

        info!("Event updated");
        Ok(updated)
    }
}

impl Delete<Uuid> for EventRepository {
    /// Removes the event and, through the foreign key, all of its RSVPs
    #[instrument(skip(self), fields(event_id = %id))]
    async fn delete(&self, id: &Uuid) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        info!("Event deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::fixture_ids::{ALICE, BOB, GARDEN_PARTY, OFFSITE, PAST_PICNIC};
    use chrono::Duration;
    use sqlx::SqlitePool;

    const FIRST_PAGE: Pagination = Pagination { page: 1, page_size: 10 };

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "events")))]
    async fn test_list_filters_combine(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = EventRepository::new(pool);

        let (all, total) = repo.list(&EventFilter::default(), &FIRST_PAGE).await?;
        assert_eq!(total, 5);
        assert!(all.windows(2).all(|w| w[0].event_date <= w[1].event_date));

        let public_published = EventFilter {
            is_public: Some(true),
            status: Some(EventStatus::Published),
            ..Default::default()
        };
        let (events, _) = repo.list(&public_published, &FIRST_PAGE).await?;
        let ids: Vec<_> = events.iter().map(|e| e.id).collect();
        assert!(ids.contains(&GARDEN_PARTY));
        assert!(ids.contains(&PAST_PICNIC));
        assert!(!ids.contains(&OFFSITE));

        let upcoming = EventFilter {
            status: Some(EventStatus::Published),
            starts_after: Some(Utc::now()),
            ..Default::default()
        };
        let (events, _) = repo.list(&upcoming, &FIRST_PAGE).await?;
        assert!(events.iter().all(|e| e.id != PAST_PICNIC));
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "events")))]
    async fn test_search_escapes_wildcards(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = EventRepository::new(pool);

        let filter = EventFilter {
            search: Some("GARDEN".into()),
            ..Default::default()
        };
        let (events, total) = repo.list(&filter, &FIRST_PAGE).await?;
        assert_eq!(total, 1);
        assert_eq!(events[0].id, GARDEN_PARTY);

        let wildcard = EventFilter {
            search: Some("%".into()),
            ..Default::default()
        };
        let (_, total) = repo.list(&wildcard, &FIRST_PAGE).await?;
        assert_eq!(total, 0);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "events")))]
    async fn test_create_update_delete(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = EventRepository::new(pool);
        let created = repo
            .create(&NewEventDTO {
                title: "Launch".into(),
                description: String::new(),
                venue: "HQ".into(),
                event_date: Utc::now() + Duration::days(10),
                image: String::new(),
                event_type: EventType::Corporate,
                is_public: false,
                max_attendees: 0,
                status: EventStatus::Draft,
                user_id: BOB,
            })
            .await?;
        assert_eq!(created.user_id, BOB);
        assert_eq!(created.max_attendees, 0);

        let updated = repo
            .update(
                &created.id,
                &EventChangesDTO {
                    status: Some(EventStatus::Published),
                    max_attendees: Some(25),
                    ..Default::default()
                },
            )
            .await?;
        assert_eq!(updated.status, EventStatus::Published);
        assert_eq!(updated.max_attendees, 25);
        assert_eq!(updated.title, "Launch");

        repo.delete(&created.id).await?;
        assert!(repo.read(&created.id).await?.is_none());
        assert!(matches!(repo.delete(&created.id).await, Err(Error::RowNotFound)));
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "events")))]
    async fn test_list_by_owner_pages(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = EventRepository::new(pool);
        let mine = EventFilter {
            user_id: Some(ALICE),
            ..Default::default()
        };
        let (page, total) = repo.list(&mine, &Pagination { page: 2, page_size: 2 }).await?;
        assert_eq!(total, 3);
        assert_eq!(page.len(), 1);
        Ok(())
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
