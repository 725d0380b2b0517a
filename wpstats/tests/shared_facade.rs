// Process-wide facade. Kept in its own test binary so no other test shares the static.
use std::sync::Arc;
use wpstats::{Properties, RecordingClient, Stat};

#[test]
fn shared_facade_dispatches_to_registered_client() {
    // Nothing registered yet
    wpstats::track(Stat::ApplicationOpened);
    assert!(!wpstats::shared().registry().is_registered());

    let client = Arc::new(RecordingClient::new());
    wpstats::register(client.clone());

    wpstats::track(Stat::ApplicationOpened);
    wpstats::track_with_properties(
        Stat::GiphyAccessed,
        &Properties::new().with("source", "media_library"),
    );

    let events = client.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].stat, Stat::ApplicationOpened);
    assert_eq!(events[1].stat, Stat::GiphyAccessed);
    assert_eq!(
        events[1].properties.as_ref().and_then(|p| p.get("source")).and_then(|v| v.as_str()),
        Some("media_library")
    );
}
