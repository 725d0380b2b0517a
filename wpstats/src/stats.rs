//! Tracking facade
//!
//! [`Stats`] is the entry point application code calls. It resolves the active
//! backend through its [`ClientRegistry`] and forwards each call exactly once.
//! Tracking never fails from the caller's point of view: no backend means a
//! no-op, and a backend that panics is contained and logged.

use crate::client::StatsClient;
use crate::config::StatsConfig;
use crate::registry::ClientRegistry;
use crate::types::{Properties, Stat};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// The tracking facade
#[derive(Debug)]
pub struct Stats {
    registry: Arc<ClientRegistry>,
    enabled: AtomicBool,
    config: StatsConfig,
}

impl Stats {
    /// Create a facade over `registry` with default settings
    pub fn new(registry: Arc<ClientRegistry>) -> Self {
        Self::with_config(registry, StatsConfig::default())
    }

    /// Create a facade over `registry` honouring `config`
    pub fn with_config(registry: Arc<ClientRegistry>, config: StatsConfig) -> Self {
        Self {
            registry,
            enabled: AtomicBool::new(config.enabled),
            config,
        }
    }

    /// Registry this facade dispatches through
    pub fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }

    /// Install the active backend (shorthand for `registry().register`)
    pub fn register(&self, client: Arc<dyn StatsClient>) {
        self.registry.register(client);
    }

    /// Configuration this facade was built with
    ///
    /// `enabled` reflects the initial value; see [`Stats::is_enabled`] for the
    /// runtime state.
    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    /// Turn forwarding on or off at runtime
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
        log::debug!("Stats tracking {}", if enabled { "enabled" } else { "disabled" });
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Track a stat without properties
    ///
    /// The backend's `track` is called; no empty property bag is synthesized.
    pub fn track(&self, stat: Stat) {
        self.dispatch(stat, |client| client.track(stat));
    }

    /// Track a stat with properties, forwarded to the backend unmodified
    pub fn track_with_properties(&self, stat: Stat, properties: &Properties) {
        self.dispatch(stat, |client| client.track_with_properties(stat, properties));
    }

    fn dispatch<F>(&self, stat: Stat, forward: F)
    where
        F: FnOnce(&dyn StatsClient),
    {
        if !self.is_enabled() {
            log::trace!("Stats disabled, dropping {}", stat);
            return;
        }
        if self.config.is_muted(stat) {
            log::trace!("Stat {} is muted, dropping", stat);
            return;
        }

        let Some(client) = self.registry.current() else {
            log::trace!("No stats client registered, dropping {}", stat);
            return;
        };

        log::trace!("Dispatching {} to '{}'", stat, client.name());
        let result = panic::catch_unwind(AssertUnwindSafe(|| forward(client.as_ref())));
        if let Err(payload) = result {
            log::warn!(
                "Stats client '{}' panicked while tracking {}: {}",
                client.name(),
                stat,
                panic_message(payload.as_ref())
            );
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

static SHARED: OnceLock<Stats> = OnceLock::new();

/// Process-wide facade, created empty on first use
///
/// Startup code registers the backend once with [`register`]; tests should
/// prefer their own `Stats` over a private registry.
pub fn shared() -> &'static Stats {
    SHARED.get_or_init(|| Stats::new(Arc::new(ClientRegistry::new())))
}

/// Install the active backend on the process-wide facade
pub fn register(client: Arc<dyn StatsClient>) {
    shared().register(client);
}

/// Track a stat on the process-wide facade
pub fn track(stat: Stat) {
    shared().track(stat);
}

/// Track a stat with properties on the process-wide facade
pub fn track_with_properties(stat: Stat, properties: &Properties) {
    shared().track_with_properties(stat, properties);
}
