//! API middleware.
//!
//! Only the rate limiter runs as custom middleware. CORS, tracing and the
//! body size limit come from `tower-http` layers in the router.

pub mod rate;
