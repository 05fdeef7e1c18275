pub mod enums;
pub mod form;
pub mod patient;
pub mod prediction;

pub use enums::*;
pub use form::*;
pub use patient::*;
pub use prediction::*;
