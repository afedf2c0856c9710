pub mod engine;
pub mod errors;
pub mod models;
pub mod parse;
pub mod settings;
pub mod store;

pub use engine::BookingEngine;
pub use errors::{BookingError, BookingResult};
pub use settings::GridSettings;
