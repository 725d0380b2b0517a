//! Concrete stats backends
//!
//! These are application-side collaborators of the facade: they decide how a
//! stat leaves the process. Each one contains its own failures.

use serde::Serialize;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use wpstats::{Properties, Stat, StatsClient};

/// Emits one `info` log line per stat under the `wpstats::events` target
#[derive(Debug, Default)]
pub struct LogClient;

impl LogClient {
    pub fn new() -> Self {
        Self
    }
}

/// `key=value` pairs in insertion order
fn format_properties(properties: &Properties) -> String {
    properties
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join(" ")
}

impl StatsClient for LogClient {
    fn track(&self, stat: Stat) {
        log::info!(target: "wpstats::events", "{} (#{})", stat, stat.ordinal());
    }

    fn track_with_properties(&self, stat: Stat, properties: &Properties) {
        log::info!(
            target: "wpstats::events",
            "{} (#{}) {{{}}}",
            stat,
            stat.ordinal(),
            format_properties(properties)
        );
    }

    fn name(&self) -> &str {
        "log"
    }
}

#[derive(Serialize)]
struct JsonLine<'a> {
    timestamp: String,
    stat: Stat,
    ordinal: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<&'a Properties>,
}

/// Writes one JSON object per stat to a writer
///
/// Serialization and I/O errors are logged and dropped.
pub struct JsonLinesClient<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesClient<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consume the client and return the writer
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_line(&self, stat: Stat, properties: Option<&Properties>) {
        let line = JsonLine {
            timestamp: chrono::Utc::now().to_rfc3339(),
            stat,
            ordinal: stat.ordinal(),
            properties,
        };

        let json = match serde_json::to_string(&line) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Failed to serialize {}: {}", stat, e);
                return;
            }
        };

        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(writer, "{}", json).and_then(|_| writer.flush()) {
            log::warn!("Failed to write {}: {}", stat, e);
        }
    }
}

impl<W: Write + Send> StatsClient for JsonLinesClient<W> {
    fn track(&self, stat: Stat) {
        self.write_line(stat, None);
    }

    fn track_with_properties(&self, stat: Stat, properties: &Properties) {
        self.write_line(stat, Some(properties));
    }

    fn name(&self) -> &str {
        "jsonl"
    }
}

/// Forwards every stat to several backends
///
/// A backend that panics is skipped; the remaining backends still receive the stat.
pub struct FanOutClient {
    clients: Vec<Arc<dyn StatsClient>>,
}

impl FanOutClient {
    pub fn new(clients: Vec<Arc<dyn StatsClient>>) -> Self {
        Self { clients }
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    fn each<F: Fn(&dyn StatsClient)>(&self, stat: Stat, f: F) {
        for client in &self.clients {
            let result = panic::catch_unwind(AssertUnwindSafe(|| f(client.as_ref())));
            if result.is_err() {
                log::warn!("Backend '{}' panicked while tracking {}", client.name(), stat);
            }
        }
    }
}

impl StatsClient for FanOutClient {
    fn track(&self, stat: Stat) {
        self.each(stat, |client| client.track(stat));
    }

    fn track_with_properties(&self, stat: Stat, properties: &Properties) {
        self.each(stat, |client| client.track_with_properties(stat, properties));
    }

    fn name(&self) -> &str {
        "fan-out"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wpstats::RecordingClient;

    struct ExplodingClient;

    impl StatsClient for ExplodingClient {
        fn track(&self, _stat: Stat) {
            panic!("exploded");
        }

        fn track_with_properties(&self, _stat: Stat, _properties: &Properties) {
            panic!("exploded");
        }
    }

    #[test]
    fn test_json_lines_output() {
        let client = JsonLinesClient::new(Vec::new());
        client.track(Stat::ApplicationOpened);
        client.track_with_properties(
            Stat::EditorPublishPost,
            &Properties::new().with("word_count", 250).with("draft", false),
        );

        let output = String::from_utf8(client.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["stat"], "application_opened");
        assert_eq!(lines[0]["ordinal"], 0);
        assert!(lines[0].get("properties").is_none());
        assert!(lines[0]["timestamp"].as_str().is_some());

        assert_eq!(lines[1]["stat"], "editor_publish_post");
        assert_eq!(lines[1]["properties"]["word_count"], 250);
        assert_eq!(lines[1]["properties"]["draft"], false);
    }

    #[test]
    fn test_fan_out_survives_panicking_backend() {
        let first = Arc::new(RecordingClient::new());
        let second = Arc::new(RecordingClient::new());
        let fan_out = FanOutClient::new(vec![
            first.clone() as Arc<dyn StatsClient>,
            Arc::new(ExplodingClient),
            second.clone(),
        ]);

        fan_out.track(Stat::ReaderOpenedArticle);

        assert_eq!(fan_out.len(), 3);
        assert_eq!(first.count(Stat::ReaderOpenedArticle), 1);
        assert_eq!(second.count(Stat::ReaderOpenedArticle), 1);
    }

    #[test]
    fn test_format_properties() {
        let props = Properties::new().with("source", "reader").with("count", 3);
        assert_eq!(format_properties(&props), "source=reader count=3");
    }
}
