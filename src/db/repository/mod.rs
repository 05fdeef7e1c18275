//! Repository layer: entity-scoped database operations.
//!
//! One sub-module per table. All public functions are re-exported here.

mod form;
mod patient;
mod prediction;

pub use form::*;
pub use patient::*;
pub use prediction::*;
