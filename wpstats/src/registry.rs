//! Active backend registry
//!
//! Holds at most one active [`StatsClient`]. Registering a backend replaces the
//! previous one; applications that need several backends register a backend
//! that fans out itself. The registry references backends, it does not manage
//! their lifecycle.

use crate::client::StatsClient;
use std::sync::{Arc, PoisonError, RwLock};

/// Holder of the currently active backend
#[derive(Default)]
pub struct ClientRegistry {
    active: RwLock<Option<Arc<dyn StatsClient>>>,
}

impl ClientRegistry {
    /// Create an empty registry (no backend, every dispatch is a no-op)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with a backend already installed
    pub fn with_client(client: Arc<dyn StatsClient>) -> Self {
        Self {
            active: RwLock::new(Some(client)),
        }
    }

    /// Install `client` as the active backend, replacing any previous one
    ///
    /// Every dispatch that starts after this returns observes `client`.
    pub fn register(&self, client: Arc<dyn StatsClient>) {
        let name = client.name().to_string();
        let previous = {
            let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
            active.replace(client)
        };

        match previous {
            Some(old) => log::debug!("Replaced stats client '{}' with '{}'", old.name(), name),
            None => log::debug!("Registered stats client '{}'", name),
        }
    }

    /// The active backend, if any
    ///
    /// Returns a clone of the reference so callers dispatch without holding the lock.
    pub fn current(&self) -> Option<Arc<dyn StatsClient>> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remove the active backend, returning it
    pub fn clear(&self) -> Option<Arc<dyn StatsClient>> {
        let previous = self
            .active
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(old) = &previous {
            log::debug!("Cleared stats client '{}'", old.name());
        }
        previous
    }

    pub fn is_registered(&self) -> bool {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl std::fmt::Debug for ClientRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let active = self.current();
        f.debug_struct("ClientRegistry")
            .field("active", &active.as_ref().map(|client| client.name().to_string()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RecordingClient;

    #[test]
    fn test_empty_registry() {
        let registry = ClientRegistry::new();
        assert!(!registry.is_registered());
        assert!(registry.current().is_none());
        assert!(registry.clear().is_none());
    }

    #[test]
    fn test_register_replaces() {
        let registry = ClientRegistry::new();
        let first = Arc::new(RecordingClient::new());
        let second = Arc::new(RecordingClient::new());

        registry.register(first.clone());
        registry.register(second.clone());

        let current = registry.current().unwrap();
        assert!(Arc::ptr_eq(
            &current,
            &(second.clone() as Arc<dyn StatsClient>)
        ));

        // Registry only references the backend
        assert_eq!(Arc::strong_count(&first), 1);
    }

    #[test]
    fn test_clear_returns_previous() {
        let client: Arc<dyn StatsClient> = Arc::new(RecordingClient::new());
        let registry = ClientRegistry::with_client(client.clone());
        assert!(registry.is_registered());

        let removed = registry.clear().unwrap();
        assert!(Arc::ptr_eq(&removed, &client));
        assert!(!registry.is_registered());
    }
}
