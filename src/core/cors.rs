use axum::http::{HeaderName, HeaderValue, Method, header};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{debug, info, warn};

const PREFLIGHT_MAX_AGE_SECS: u64 = 86400;

pub fn create_cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
        ])
        .max_age(Duration::from_secs(PREFLIGHT_MAX_AGE_SECS));

    match allowed_origins(origins) {
        Some(list) => layer.allow_origin(list).allow_credentials(true),
        // credentials cannot be combined with a wildcard origin
        None => layer.allow_origin(AllowOrigin::any()),
    }
}

fn allowed_origins(origins: &[String]) -> Option<AllowOrigin> {
    let values: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => {
                debug!("CORS: Allowing origin: {}", origin);
                Some(value)
            }
            Err(e) => {
                warn!("CORS: Invalid origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    if values.is_empty() {
        warn!("CORS: No valid origins configured, using permissive settings for development");
        None
    } else {
        info!("CORS: Configured with {} allowed origin(s)", values.len());
        Some(AllowOrigin::list(values))
    }
}
