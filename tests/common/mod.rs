#![allow(dead_code)]

use axum_test::TestServer;
use eventhub::core::AppState;
use eventhub::dtos::IdentityDTO;
use sqlx::SqlitePool;
use std::sync::Arc;

pub const JWT_SECRET: &str = "test-secret-for-eventhub-integration-tests";

pub const ALICE: &str = "11111111-1111-1111-1111-111111111111";
pub const BOB: &str = "22222222-2222-2222-2222-222222222222";
pub const CAROL: &str = "33333333-3333-3333-3333-333333333333";

/// Alice's, public, published, unlimited
pub const GARDEN_PARTY: &str = "aaaaaaaa-0000-0000-0000-000000000001";
/// Alice's draft with 120 seats
pub const WEDDING: &str = "aaaaaaaa-0000-0000-0000-000000000002";
/// Alice's, already happened
pub const PAST_PICNIC: &str = "aaaaaaaa-0000-0000-0000-000000000003";
/// Bob's, private
pub const OFFSITE: &str = "aaaaaaaa-0000-0000-0000-000000000004";
/// Bob's, one seat
pub const BIRTHDAY: &str = "aaaaaaaa-0000-0000-0000-000000000005";

/// AppState over the test database with the test JWT secret
pub fn create_test_state(pool: SqlitePool) -> Arc<AppState> {
    Arc::new(AppState::new(pool, JWT_SECRET.to_string()))
}

/// TestServer running the full router
pub fn create_test_server(pool: SqlitePool) -> TestServer {
    let app = eventhub::create_router(create_test_state(pool));
    TestServer::new(app).expect("Failed to create test server")
}

/// Token as the identity provider would sign it for `auth_id`
pub fn create_test_jwt(auth_id: &str, email: &str, name: &str) -> String {
    let identity = IdentityDTO {
        auth_id: auth_id.to_string(),
        email: email.to_string(),
        name: name.to_string(),
        picture: String::new(),
    };
    eventhub::auth::encode_jwt(&identity, JWT_SECRET).expect("Failed to create JWT token")
}

pub fn alice_token() -> String {
    create_test_jwt("auth0|alice", "alice@example.com", "Alice")
}

pub fn bob_token() -> String {
    create_test_jwt("auth0|bob", "bob@example.com", "Bob")
}

pub fn carol_token() -> String {
    create_test_jwt("auth0|carol", "carol@example.com", "Carol")
}

/// Value of the `authorization` header for `token`
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
