use crate::core::{AppError, AppState};
use crate::dtos::IdentityDTO;
use crate::entities::{Event, User};
use axum::extract::State;
use axum::{Error, body::Body, extract::Request, http, http::Response, middleware::Next};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Claims of the identity-provider token (HS256, shared secret)
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub exp: usize, // Expiry time of the token
    pub iat: usize, // Issued at time of the token
    pub sub: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub picture: String,
}

impl From<Claims> for IdentityDTO {
    fn from(claims: Claims) -> Self {
        Self {
            auth_id: claims.sub,
            email: claims.email,
            name: claims.name,
            picture: claims.picture,
        }
    }
}

/// Signs a 24h token for `identity`. Production tokens come from the identity
/// provider; this is used by tests and local tooling.
#[instrument(skip(identity, secret), fields(auth_id = %identity.auth_id))]
pub fn encode_jwt(identity: &IdentityDTO, secret: &str) -> Result<String, Error> {
    debug!("Encoding JWT token for identity");
    let now = Utc::now();
    let expire: chrono::TimeDelta = Duration::hours(24);
    let claim = Claims {
        iat: now.timestamp() as usize,
        exp: (now + expire).timestamp() as usize,
        sub: identity.auth_id.clone(),
        email: identity.email.clone(),
        name: identity.name.clone(),
        picture: identity.picture.clone(),
    };

    encode(
        &Header::default(),
        &claim,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| {
        error!("Failed to encode JWT token: {:?}", e);
        Error::new("Error in encoding jwt token")
    })
}

#[instrument(skip(jwt_token, secret))]
pub fn decode_jwt(jwt_token: &str, secret: &str) -> Result<TokenData<Claims>, Error> {
    debug!("Decoding JWT token");
    decode::<Claims>(
        jwt_token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| {
        debug!("JWT token decoded for subject: {}", data.claims.sub);
        data
    })
    .map_err(|e| {
        warn!("Failed to decode JWT token: {:?}", e);
        Error::new("Error in decoding jwt token")
    })
}

/// Resolves the bearer token to a local, active [`User`] and stores it in the
/// request extensions. First-time identities are created on the fly.
#[instrument(skip(state, req, next))]
pub async fn authentication_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    debug!("Running authentication middleware");
    let auth_header = match req.headers().get(http::header::AUTHORIZATION) {
        Some(header) => header.to_str().map_err(|_| {
            warn!("Invalid authorization header format");
            AppError::forbidden("Empty header is not allowed")
        })?,
        None => {
            warn!("Missing authorization header");
            return Err(AppError::forbidden("Please add the JWT token to the header"));
        }
    };

    let token = match auth_header.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            token.trim().to_string()
        }
        _ => {
            warn!("Authorization header is not a bearer token");
            return Err(AppError::unauthorized("Unable to decode token"));
        }
    };

    let token_data = decode_jwt(&token, &state.jwt_secret)
        .map_err(|_| AppError::unauthorized("Unable to decode token"))?;

    let identity = IdentityDTO::from(token_data.claims);
    let current_user = state.user.sync_identity(&identity).await?;
    if !current_user.is_active {
        warn!(user_id = %current_user.id, "Deactivated user rejected");
        return Err(AppError::forbidden("Account is deactivated"));
    }

    info!(user_id = %current_user.id, "User authenticated");
    req.extensions_mut().insert(current_user);
    Ok(next.run(req).await)
}

/// Only the event's organizer passes
#[instrument(skip(event, user), fields(event_id = %event.id, user_id = %user.id))]
pub fn require_owner(event: &Event, user: &User, message: &'static str) -> Result<(), AppError> {
    if event.is_owned_by(&user.id) {
        Ok(())
    } else {
        warn!("User is not the organizer of the event");
        Err(AppError::forbidden(message))
    }
}

/// The user themself or an admin passes
pub fn require_self_or_admin(user: &User, target: &uuid::Uuid) -> Result<(), AppError> {
    if user.can_manage(target) {
        Ok(())
    } else {
        warn!(user_id = %user.id, target = %target, "Access to another account refused");
        Err(AppError::forbidden("You can only manage your own account"))
    }
}

pub fn require_admin(user: &User) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        warn!(user_id = %user.id, "Admin role required");
        Err(AppError::forbidden("Admin role required"))
    }
}
