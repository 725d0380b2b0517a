//! Core types for the stats facade
//!
//! This module defines the closed event taxonomy (`Stat`), the feature areas the
//! events are grouped by, and the optional property bag attached to a single
//! track call. None of these types know anything about how events are delivered.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Result type for fallible construction paths (parsing names, building properties)
pub type Result<T> = std::result::Result<T, StatsError>;

/// Errors raised while building stats values
///
/// Dispatch never returns these: tracking is failure-transparent to callers.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("Unknown stat: {0}")]
    UnknownStat(String),

    #[error("Unknown feature area: {0}")]
    UnknownArea(String),

    #[error("Unsupported value for property '{key}': {kind} (only scalars are allowed)")]
    UnsupportedPropertyValue { key: String, kind: &'static str },

    #[error("Invalid property: {0}")]
    InvalidProperty(String),
}

/// A trackable event kind
///
/// Ordinals are explicit and append-only. Downstream systems may persist them,
/// so an existing variant must never be renumbered, reordered or removed.
/// New variants go at the end with the next free ordinal, and into `ALL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum Stat {
    ApplicationOpened = 0,
    ApplicationClosed = 1,
    ThemesAccessThemeBrowser = 2,
    ThemesChangedTheme = 3,
    ReaderAccessedReader = 4,
    ReaderOpenedArticle = 5,
    ReaderLikedArticle = 6,
    ReaderRebloggedArticle = 7,
    ReaderInfiniteScroll = 8,
    ReaderFollowedReaderTag = 9,
    ReaderUnfollowedReaderTag = 10,
    ReaderFilteredByReaderTag = 11,
    ReaderLoadedFreshlyPressed = 12,
    ReaderCommentedOnArticle = 13,
    StatsAccessStats = 14,
    EditorCreatePost = 15,
    EditorAddPhotoViaLocalLibrary = 16,
    #[serde(rename = "editor_add_photo_via_wp_media_library")]
    EditorAddPhotoViaWPMediaLibrary = 17,
    EditorUpdatePost = 18,
    EditorPublishPost = 19,
    NotificationsAccessNotifications = 20,
    NotificationsOpenNotificationDetails = 21,
    GiphyAccessed = 22,
}

impl Stat {
    /// Every stat, in ordinal order
    pub const ALL: [Stat; 23] = [
        Stat::ApplicationOpened,
        Stat::ApplicationClosed,
        Stat::ThemesAccessThemeBrowser,
        Stat::ThemesChangedTheme,
        Stat::ReaderAccessedReader,
        Stat::ReaderOpenedArticle,
        Stat::ReaderLikedArticle,
        Stat::ReaderRebloggedArticle,
        Stat::ReaderInfiniteScroll,
        Stat::ReaderFollowedReaderTag,
        Stat::ReaderUnfollowedReaderTag,
        Stat::ReaderFilteredByReaderTag,
        Stat::ReaderLoadedFreshlyPressed,
        Stat::ReaderCommentedOnArticle,
        Stat::StatsAccessStats,
        Stat::EditorCreatePost,
        Stat::EditorAddPhotoViaLocalLibrary,
        Stat::EditorAddPhotoViaWPMediaLibrary,
        Stat::EditorUpdatePost,
        Stat::EditorPublishPost,
        Stat::NotificationsAccessNotifications,
        Stat::NotificationsOpenNotificationDetails,
        Stat::GiphyAccessed,
    ];

    /// Stable ordinal of this stat
    pub fn ordinal(self) -> u32 {
        self as u32
    }

    /// Look up a stat by its ordinal
    pub fn from_ordinal(ordinal: u32) -> Option<Stat> {
        Self::ALL.get(ordinal as usize).copied()
    }

    /// Stable symbolic name (snake_case), identical to the serde representation
    pub fn name(self) -> &'static str {
        match self {
            Stat::ApplicationOpened => "application_opened",
            Stat::ApplicationClosed => "application_closed",
            Stat::ThemesAccessThemeBrowser => "themes_access_theme_browser",
            Stat::ThemesChangedTheme => "themes_changed_theme",
            Stat::ReaderAccessedReader => "reader_accessed_reader",
            Stat::ReaderOpenedArticle => "reader_opened_article",
            Stat::ReaderLikedArticle => "reader_liked_article",
            Stat::ReaderRebloggedArticle => "reader_reblogged_article",
            Stat::ReaderInfiniteScroll => "reader_infinite_scroll",
            Stat::ReaderFollowedReaderTag => "reader_followed_reader_tag",
            Stat::ReaderUnfollowedReaderTag => "reader_unfollowed_reader_tag",
            Stat::ReaderFilteredByReaderTag => "reader_filtered_by_reader_tag",
            Stat::ReaderLoadedFreshlyPressed => "reader_loaded_freshly_pressed",
            Stat::ReaderCommentedOnArticle => "reader_commented_on_article",
            Stat::StatsAccessStats => "stats_access_stats",
            Stat::EditorCreatePost => "editor_create_post",
            Stat::EditorAddPhotoViaLocalLibrary => "editor_add_photo_via_local_library",
            Stat::EditorAddPhotoViaWPMediaLibrary => "editor_add_photo_via_wp_media_library",
            Stat::EditorUpdatePost => "editor_update_post",
            Stat::EditorPublishPost => "editor_publish_post",
            Stat::NotificationsAccessNotifications => "notifications_access_notifications",
            Stat::NotificationsOpenNotificationDetails => "notifications_open_notification_details",
            Stat::GiphyAccessed => "giphy_accessed",
        }
    }

    /// Feature area this stat belongs to
    pub fn area(self) -> FeatureArea {
        match self {
            Stat::ApplicationOpened | Stat::ApplicationClosed => FeatureArea::Application,
            Stat::ThemesAccessThemeBrowser | Stat::ThemesChangedTheme => FeatureArea::Themes,
            Stat::ReaderAccessedReader
            | Stat::ReaderOpenedArticle
            | Stat::ReaderLikedArticle
            | Stat::ReaderRebloggedArticle
            | Stat::ReaderInfiniteScroll
            | Stat::ReaderFollowedReaderTag
            | Stat::ReaderUnfollowedReaderTag
            | Stat::ReaderFilteredByReaderTag
            | Stat::ReaderLoadedFreshlyPressed
            | Stat::ReaderCommentedOnArticle => FeatureArea::Reader,
            Stat::StatsAccessStats => FeatureArea::Stats,
            Stat::EditorCreatePost
            | Stat::EditorAddPhotoViaLocalLibrary
            | Stat::EditorAddPhotoViaWPMediaLibrary
            | Stat::EditorUpdatePost
            | Stat::EditorPublishPost => FeatureArea::Editor,
            Stat::NotificationsAccessNotifications
            | Stat::NotificationsOpenNotificationDetails => FeatureArea::Notifications,
            Stat::GiphyAccessed => FeatureArea::Media,
        }
    }
}

// `ALL` must stay dense and ordered: entry i carries ordinal i.
const _: () = {
    let mut i = 0;
    while i < Stat::ALL.len() {
        assert!(Stat::ALL[i] as usize == i);
        i += 1;
    }
};

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stat {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        Stat::ALL
            .iter()
            .copied()
            .find(|stat| stat.name() == lower)
            .ok_or_else(|| StatsError::UnknownStat(s.to_string()))
    }
}

/// Product surface a stat is emitted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureArea {
    Application,
    Themes,
    Reader,
    Stats,
    Editor,
    Notifications,
    Media,
}

impl FeatureArea {
    pub const ALL: [FeatureArea; 7] = [
        FeatureArea::Application,
        FeatureArea::Themes,
        FeatureArea::Reader,
        FeatureArea::Stats,
        FeatureArea::Editor,
        FeatureArea::Notifications,
        FeatureArea::Media,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FeatureArea::Application => "application",
            FeatureArea::Themes => "themes",
            FeatureArea::Reader => "reader",
            FeatureArea::Stats => "stats",
            FeatureArea::Editor => "editor",
            FeatureArea::Notifications => "notifications",
            FeatureArea::Media => "media",
        }
    }

    /// Stats belonging to this area, in ordinal order
    pub fn stats(self) -> impl Iterator<Item = Stat> {
        Stat::ALL.into_iter().filter(move |stat| stat.area() == self)
    }
}

impl fmt::Display for FeatureArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FeatureArea {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        FeatureArea::ALL
            .iter()
            .copied()
            .find(|area| area.name() == lower)
            .ok_or_else(|| StatsError::UnknownArea(s.to_string()))
    }
}

/// A single scalar property value
///
/// Nested structures are not representable: backends receive flat key/value
/// metadata only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::Int(i) => write!(f, "{}", i),
            PropertyValue::Float(x) => write!(f, "{}", x),
            PropertyValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Int(value.into())
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        PropertyValue::Int(value.into())
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

/// Convert a JSON value, rejecting null, arrays and objects
fn scalar_from_json(key: &str, value: serde_json::Value) -> Result<PropertyValue> {
    use serde_json::Value;

    match value {
        Value::Bool(b) => Ok(PropertyValue::Bool(b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(PropertyValue::Int(i))
            } else if n.is_u64() {
                // Above i64::MAX: a float would silently lose precision
                Err(StatsError::InvalidProperty(format!(
                    "integer out of range for '{}': {}",
                    key, n
                )))
            } else {
                match n.as_f64() {
                    Some(x) if n.is_f64() => Ok(PropertyValue::Float(x)),
                    _ => Err(StatsError::InvalidProperty(format!(
                        "unsupported number for '{}': {}",
                        key, n
                    ))),
                }
            }
        }
        Value::String(s) => Ok(PropertyValue::Text(s)),
        Value::Null => Err(StatsError::UnsupportedPropertyValue {
            key: key.to_string(),
            kind: "null",
        }),
        Value::Array(_) => Err(StatsError::UnsupportedPropertyValue {
            key: key.to_string(),
            kind: "array",
        }),
        Value::Object(_) => Err(StatsError::UnsupportedPropertyValue {
            key: key.to_string(),
            kind: "object",
        }),
    }
}

/// Metadata attached to one track call
///
/// Keys keep their insertion order. Inserting an existing key replaces the value
/// in place. Two bags are equal when they hold the same entries in the same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    entries: Vec<(String, PropertyValue)>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: add a property
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a property, returning the previous value for that key
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Option<PropertyValue> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Build properties from a JSON object
    ///
    /// Only scalar members are accepted; null, arrays and nested objects are
    /// rejected rather than flattened.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Object(map) => {
                let mut properties = Properties::new();
                for (key, value) in map {
                    let value = scalar_from_json(&key, value)?;
                    properties.insert(key, value);
                }
                Ok(properties)
            }
            other => Err(StatsError::InvalidProperty(format!(
                "expected a JSON object, got {}",
                other
            ))),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Properties
where
    K: Into<String>,
    V: Into<PropertyValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut properties = Properties::new();
        for (key, value) in iter {
            properties.insert(key, value);
        }
        properties
    }
}

impl Serialize for Properties {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
