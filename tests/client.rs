//! End-to-end tests of the API client and the RSVP panel against a live server

mod common;

#[cfg(test)]
mod client_tests {
    use super::common::*;
    use eventhub::client::{ApiClient, ClientError, RsvpPanel};
    use eventhub::dtos::{CreateEventDTO, CreateUserDTO, PageQuery};
    use eventhub::entities::{RsvpCounts, RsvpResponse};
    use reqwest::StatusCode;
    use sqlx::SqlitePool;
    use tokio::net::TcpListener;
    use uuid::Uuid;

    /// Serves the router on an ephemeral port and returns its base URL
    async fn spawn_server(pool: SqlitePool) -> String {
        let app = eventhub::create_router(create_test_state(pool));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });
        format!("http://{}", addr)
    }

    fn id(raw: &str) -> Uuid {
        Uuid::parse_str(raw).expect("valid fixture id")
    }

    // ============================================================
    // ApiClient
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "events")))]
    async fn test_health_and_listing(pool: SqlitePool) -> sqlx::Result<()> {
        let api = ApiClient::new(spawn_server(pool).await);

        let health = api.health().await.expect("health");
        assert_eq!(health.status, "ok");
        assert_eq!(health.service, "eventhub");

        let page = api
            .public_events(&PageQuery::new(1, 2), None)
            .await
            .expect("public events");
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.pagination.total, 3);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "events")))]
    async fn test_api_errors_carry_server_message(pool: SqlitePool) -> sqlx::Result<()> {
        let base = spawn_server(pool).await;
        let bob = ApiClient::new(&base).with_token(bob_token());

        let err = bob
            .get_event(&Uuid::new_v4())
            .await
            .expect_err("unknown event");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Event not found");

        let err = bob
            .event_rsvps(&id(GARDEN_PARTY))
            .await
            .expect_err("not the organizer");
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "events")))]
    async fn test_create_event_checked_locally(pool: SqlitePool) -> sqlx::Result<()> {
        let base = spawn_server(pool).await;
        let alice = ApiClient::new(&base).with_token(alice_token());

        let past = CreateEventDTO {
            title: "Time travel".into(),
            venue: "Lab".into(),
            event_date: "1999-12-31T23:59".into(),
            event_type: "other".into(),
            ..Default::default()
        };
        let err = alice.create_event(&past).await.expect_err("past date");
        assert!(matches!(err, ClientError::Validation(_)));

        let future = CreateEventDTO {
            event_date: "2099-12-31T23:59".into(),
            ..past
        };
        let event = alice.create_event(&future).await.expect("created");
        assert_eq!(event.user_id, id(ALICE));
        assert_eq!(event.capacity(), None);

        let mine = alice.my_events(&PageQuery::default()).await.expect("own events");
        assert_eq!(mine.pagination.total, 4);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_email_lookup_with_reserved_characters(pool: SqlitePool) -> sqlx::Result<()> {
        let base = spawn_server(pool).await;
        let carol = ApiClient::new(&base).with_token(carol_token());
        let email = "rsvp#1/a?b@example.com";

        let created = carol
            .create_user(&CreateUserDTO {
                email: email.into(),
                name: "Odd Address".into(),
                picture: String::new(),
                auth_id: "auth0|odd".into(),
                role: Default::default(),
            })
            .await
            .expect("provisioned");

        let found = carol.get_user_by_email(email).await.expect("found by email");
        assert_eq!(found.id, created.id);
        assert_eq!(found.email, email);

        let err = carol
            .get_user_by_email("rsvp#1")
            .await
            .expect_err("prefix is not an address");
        assert!(err.is_not_found());
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "events")))]
    async fn test_rsvp_round_trip(pool: SqlitePool) -> sqlx::Result<()> {
        let base = spawn_server(pool).await;
        let carol = ApiClient::new(&base).with_token(carol_token());
        let offsite = id(OFFSITE);

        assert!(carol.my_rsvp(&offsite).await.expect("lookup").is_none());

        carol
            .submit_rsvp(&offsite, RsvpResponse::Maybe)
            .await
            .expect("submitted");
        carol
            .submit_rsvp(&offsite, RsvpResponse::Yes)
            .await
            .expect("overwritten");

        let rsvp = carol.my_rsvp(&offsite).await.expect("lookup").expect("present");
        assert_eq!(rsvp.response, RsvpResponse::Yes);

        let mine = carol.my_rsvps(None).await.expect("own rsvps");
        assert_eq!(mine.len(), 1);

        let bob = ApiClient::new(&base).with_token(bob_token());
        let all = bob.event_rsvps(&offsite).await.expect("organizer view");
        assert_eq!(all.counts, RsvpCounts { yes: 1, no: 0, maybe: 0 });
        Ok(())
    }

    // ============================================================
    // RsvpPanel
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "events", "rsvps")))]
    async fn test_panel_for_guest(pool: SqlitePool) -> sqlx::Result<()> {
        let base = spawn_server(pool).await;
        let bob = ApiClient::new(&base).with_token(bob_token());
        let mut panel = RsvpPanel::new(id(GARDEN_PARTY));

        panel.load(&bob).await.expect("loaded");
        assert!(!panel.is_owner());
        assert!(panel.can_rsvp());
        assert_eq!(panel.user_response(), Some(RsvpResponse::Yes));
        assert_eq!(panel.counts(), RsvpCounts::default());
        assert!(!panel.show_counts());
        assert_eq!(panel.capacity(), None);

        panel.submit(&bob, RsvpResponse::Maybe).await.expect("submitted");
        assert_eq!(panel.user_response(), Some(RsvpResponse::Maybe));
        assert!(!panel.is_submitting());
        let notice = panel.notice().expect("notice");
        assert!(!notice.is_error);
        assert_eq!(notice.message, "Your response has been saved: Maybe");
        assert_eq!(panel.counts(), RsvpCounts::default());
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "events", "rsvps")))]
    async fn test_panel_for_organizer(pool: SqlitePool) -> sqlx::Result<()> {
        let base = spawn_server(pool).await;
        let alice = ApiClient::new(&base).with_token(alice_token());
        let mut panel = RsvpPanel::new(id(GARDEN_PARTY));

        panel.load(&alice).await.expect("loaded");
        assert!(panel.is_owner());
        assert!(!panel.can_rsvp());
        assert!(panel.show_counts());
        assert_eq!(panel.counts(), RsvpCounts { yes: 1, no: 0, maybe: 1 });

        let err = panel
            .submit(&alice, RsvpResponse::Yes)
            .await
            .expect_err("organizers cannot answer");
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(panel.user_response(), None);
        let notice = panel.notice().expect("notice");
        assert!(notice.is_error);
        assert_eq!(
            notice.message,
            "Error: Event organizers cannot RSVP to their own events"
        );

        panel.dismiss_notice();
        assert!(panel.notice().is_none());
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "events", "rsvps")))]
    async fn test_panel_for_anonymous_viewer(pool: SqlitePool) -> sqlx::Result<()> {
        let api = ApiClient::new(spawn_server(pool).await);
        let mut panel = RsvpPanel::new(id(GARDEN_PARTY));

        panel.load(&api).await.expect("loaded");
        assert!(!panel.can_rsvp());
        assert!(!panel.show_counts());
        assert_eq!(panel.user_response(), None);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "events", "rsvps")))]
    async fn test_panel_shows_capacity(pool: SqlitePool) -> sqlx::Result<()> {
        let base = spawn_server(pool).await;
        let alice = ApiClient::new(&base).with_token(alice_token());
        let mut panel = RsvpPanel::new(id(BIRTHDAY));

        panel.load(&alice).await.expect("loaded");
        assert_eq!(panel.capacity(), Some(1));
        assert!(panel.can_rsvp(), "a full event still takes answers");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "events", "rsvps")))]
    async fn test_failed_reload_clears_panel(pool: SqlitePool) -> sqlx::Result<()> {
        let base = spawn_server(pool).await;
        let alice = ApiClient::new(&base).with_token(alice_token());
        let mut panel = RsvpPanel::new(id(GARDEN_PARTY));

        panel.load(&alice).await.expect("loaded");
        assert!(panel.show_counts());

        alice
            .delete_event(&id(GARDEN_PARTY))
            .await
            .expect("deleted");

        let err = panel.load(&alice).await.expect_err("event is gone");
        assert!(err.is_not_found());
        assert!(!panel.is_owner());
        assert!(!panel.can_rsvp());
        assert!(!panel.show_counts());
        assert_eq!(panel.counts(), RsvpCounts::default());
        assert_eq!(panel.user_response(), None);
        let notice = panel.notice().expect("notice");
        assert!(notice.is_error);
        assert_eq!(notice.message, "Error: Event not found");
        Ok(())
    }
}
