//! Core Module - infrastructure shared by the HTTP layer
//!
//! - Authentication and JWT
//! - Configuration and CORS
//! - Error handling and extractors
//! - Application state

pub mod auth;
pub mod config;
pub mod cors;
pub mod error;
pub mod extract;
pub mod state;

pub use auth::{
    Claims, authentication_middleware, decode_jwt, encode_jwt, require_admin, require_owner,
    require_self_or_admin,
};
pub use config::Config;
pub use cors::create_cors_layer;
pub use error::AppError;
pub use extract::{AppJson, non_empty, parse_id};
pub use state::AppState;
