//! `TripSense` - natural-language travel assistant
//!
//! Extracts a destination and an intent from a free-text prompt, then
//! fetches current weather and ranked points of interest for it and
//! composes a short answer with a packing tip and a map link.

pub mod api;
pub mod cache;
pub mod config;
pub mod enhancements;
pub mod error;
pub mod orchestrator;
pub mod poi;
pub mod router;
pub mod telemetry;
pub mod tools;
pub mod web;

// Re-export core types for public API
pub use config::TripSenseConfig;
pub use error::{ToolKind, TravelAiError};
pub use orchestrator::{TravelOrchestrator, TravelResponse};
pub use poi::{GeoPoint, PointOfInterest};
pub use router::{ExtractionResult, Intent};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TravelAiError>;
