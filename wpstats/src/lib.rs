//! WPStats Library
//!
//! A small facade that lets application code emit analytics events from a closed
//! taxonomy without binding call sites to a concrete analytics backend.
//!
//! # Architecture
//!
//! - [`Stat`] is the closed, append-only event taxonomy, grouped by [`FeatureArea`]
//! - [`StatsClient`] is the capability a backend implements
//! - [`ClientRegistry`] holds the single active backend; registering replaces it
//! - [`Stats`] is the facade callers use; it forwards each call once and never fails
//!
//! The library does NOT:
//! - Transmit, batch or store events
//! - Retry failed deliveries
//! - Decide when events are emitted
//!
//! Concrete backends live in the application layer (wpstats-cli).
//!
//! # Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use wpstats::{ClientRegistry, Properties, RecordingClient, Stat, Stats};
//!
//! let registry = Arc::new(ClientRegistry::new());
//! let stats = Stats::new(registry.clone());
//!
//! // Nothing registered yet: silently dropped
//! stats.track(Stat::ApplicationOpened);
//!
//! let backend = Arc::new(RecordingClient::new());
//! registry.register(backend.clone());
//!
//! stats.track_with_properties(
//!     Stat::ReaderOpenedArticle,
//!     &Properties::new().with("source", "freshly_pressed"),
//! );
//! assert_eq!(backend.len(), 1);
//! ```

// Public modules
pub mod client;
pub mod config;
pub mod registry;
pub mod stats;
pub mod types;

// Re-export main types for convenience
pub use client::{RecordingClient, StatsClient, TrackedEvent};
pub use config::StatsConfig;
pub use registry::ClientRegistry;
pub use stats::{register, shared, track, track_with_properties, Stats};
pub use types::{FeatureArea, Properties, PropertyValue, Result, Stat, StatsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_library_basics() {
        // Smoke test: a fresh facade starts enabled and dispatch is safe
        let stats = Stats::new(Arc::new(ClientRegistry::new()));
        assert!(stats.is_enabled());
        stats.track(Stat::ApplicationOpened);
    }
}
