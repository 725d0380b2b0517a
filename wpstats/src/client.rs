//! Backend capability
//!
//! Concrete analytics backends implement [`StatsClient`] and are handed to a
//! [`ClientRegistry`](crate::ClientRegistry) at startup. The library itself
//! ships no transmitting backend, only the in-memory [`RecordingClient`] used
//! as a test double.

use crate::types::{Properties, Stat};
use std::sync::{Mutex, PoisonError};

/// Trait for receiving dispatched stats without knowledge of the caller.
///
/// Both methods are fire-and-forget. Implementations must return quickly and
/// must contain their own failures: anything slow (network, disk) belongs on
/// the backend's own worker, not on the caller's thread.
///
/// # Example
///
/// ```
/// use wpstats::{Properties, Stat, StatsClient};
///
/// struct StdoutClient;
///
/// impl StatsClient for StdoutClient {
///     fn track(&self, stat: Stat) {
///         println!("{}", stat);
///     }
///
///     fn track_with_properties(&self, stat: Stat, properties: &Properties) {
///         println!("{} {:?}", stat, properties);
///     }
/// }
/// ```
pub trait StatsClient: Send + Sync {
    /// Receive a stat without metadata
    fn track(&self, stat: Stat);

    /// Receive a stat with metadata, exactly as the caller supplied it
    fn track_with_properties(&self, stat: Stat, properties: &Properties);

    /// Name used in log messages
    fn name(&self) -> &str {
        "client"
    }
}

/// One delivery observed by a [`RecordingClient`]
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedEvent {
    pub stat: Stat,
    /// `None` when the caller tracked without properties
    pub properties: Option<Properties>,
}

/// In-memory backend that records every delivery
#[derive(Debug, Default)]
pub struct RecordingClient {
    events: Mutex<Vec<TrackedEvent>>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn events(&self) -> Vec<TrackedEvent> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of deliveries of one stat
    pub fn count(&self, stat: Stat) -> usize {
        self.lock().iter().filter(|event| event.stat == stat).count()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<TrackedEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, event: TrackedEvent) {
        self.lock().push(event);
    }
}

impl StatsClient for RecordingClient {
    fn track(&self, stat: Stat) {
        self.push(TrackedEvent {
            stat,
            properties: None,
        });
    }

    fn track_with_properties(&self, stat: Stat, properties: &Properties) {
        self.push(TrackedEvent {
            stat,
            properties: Some(properties.clone()),
        });
    }

    fn name(&self) -> &str {
        "recording"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_client_keeps_absent_and_empty_apart() {
        let client = RecordingClient::new();
        client.track(Stat::ApplicationOpened);
        client.track_with_properties(Stat::ApplicationOpened, &Properties::new());

        let events = client.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].properties, None);
        assert_eq!(events[1].properties, Some(Properties::new()));
        assert_eq!(client.count(Stat::ApplicationOpened), 2);

        client.clear();
        assert!(client.is_empty());
    }
}
