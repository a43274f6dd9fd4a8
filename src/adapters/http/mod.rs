//! HTTP adapters - REST API implementation.
//!
//! `build_router` assembles the marketplace routes, puts the bearer-token
//! middleware in front of the protected ones, and adds tracing, timeout,
//! body-limit and CORS layers.

pub mod marketplace;
pub mod middleware;

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use marketplace::{marketplace_routes, public_routes, ApiError, MarketplaceAppState};
pub use middleware::{auth_middleware, AuthState, RequireAuth};

/// Cross-cutting HTTP settings.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub request_timeout: Duration,
    pub max_body_bytes: usize,
    /// Allowed browser origins. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(15),
            max_body_bytes: 64 * 1024,
            cors_origins: Vec::new(),
        }
    }
}

/// Builds the complete application router.
pub fn build_router(
    state: MarketplaceAppState,
    validator: AuthState,
    settings: &HttpSettings,
) -> Router {
    let protected = marketplace_routes().route_layer(axum::middleware::from_fn_with_state(
        validator,
        auth_middleware,
    ));

    Router::new()
        .merge(protected)
        .merge(public_routes())
        .layer(DefaultBodyLimit::max(settings.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(settings.request_timeout))
        .layer(cors_layer(&settings.cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_layer_accepts_explicit_origins() {
        let _ = cors_layer(&["http://localhost:5173".to_string(), "bad\norigin".to_string()]);
    }

    #[test]
    fn default_settings_match_server_defaults() {
        let settings = HttpSettings::default();
        assert_eq!(settings.request_timeout, Duration::from_secs(15));
        assert_eq!(settings.max_body_bytes, 64 * 1024);
    }
}
