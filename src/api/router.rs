//! HTTP API router.
//!
//! Returns a composable `Router`. Health lives at the root, everything else
//! is nested under `/api/`.
//!
//! Layer stack (outermost → innermost):
//! Trace → CORS → Body limit → Extension → Rate limiter → Handler

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::config::AppConfig;

/// Largest accepted request body (10 MB).
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Build the API router for `config`.
pub fn api_router(config: &AppConfig) -> Router {
    build_router(ApiContext::new(config), &config.frontend_url)
}

/// Build router from a pre-constructed `ApiContext`.
pub(crate) fn build_router(ctx: ApiContext, frontend_url: &str) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let api = Router::new()
        .route(
            "/patients",
            get(endpoints::patients::list).post(endpoints::patients::create),
        )
        .route(
            "/patients/:id",
            get(endpoints::patients::detail).put(endpoints::patients::update),
        )
        .route("/forms", post(endpoints::forms::submit))
        .route("/forms/patient/:id", get(endpoints::forms::history))
        .route("/forms/patient/:id/latest", get(endpoints::forms::latest))
        .route("/predictions", post(endpoints::predictions::create))
        .route(
            "/predictions/patient/:id",
            get(endpoints::predictions::history),
        )
        .route(
            "/predictions/patient/:id/latest",
            get(endpoints::predictions::latest),
        )
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::rate::limit))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx));

    Router::new()
        .route("/health", get(endpoints::health::check))
        .nest("/api", api)
        .fallback(endpoints::not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors_layer(frontend_url))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(frontend_url: &str) -> CorsLayer {
    let origin = match HeaderValue::from_str(frontend_url.trim_end_matches('/')) {
        Ok(value) => AllowOrigin::exact(value),
        Err(e) => {
            tracing::warn!(frontend_url, error = %e, "Invalid frontend origin, CORS disabled");
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
