//! HTTP API.
//!
//! Exposes patients, forms and the risk prediction pipeline as JSON
//! endpoints. Routes are nested under `/api/` and rate limited per
//! client IP; `/health` sits outside the limit.
//!
//! The router is composable: `api_router()` returns a `Router` that can
//! be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_api_server, start_api_server_on, ApiServer};
pub use types::ApiContext;
