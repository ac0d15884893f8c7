//! Facebook Graph webhook notification payloads.
//!
//! Parsing is forgiving: once a request is authenticated, a
//! structurally odd entry or change is dropped on its own and never takes its
//! siblings down with it. A body that is not a JSON object at all parses as an
//! envelope with no entries.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use shimmer_core::LiveVideoEvent;

/// The `field` of a change describing live video state.
pub const LIVE_VIDEOS_FIELD: &str = "live_videos";
/// The live video `status` that means a broadcast started.
pub const LIVE_STATUS: &str = "live";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NotificationEnvelope {
    #[serde(default, deserialize_with = "lenient_string")]
    pub object: Option<String>,
    #[serde(default, rename = "entry", deserialize_with = "lenient_vec")]
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Entry {
    /// Page id.
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub changes: Vec<Change>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Change {
    #[serde(default, deserialize_with = "lenient_string")]
    pub field: Option<String>,
    #[serde(default, deserialize_with = "lenient_value")]
    pub value: Option<ChangeValue>,
}

/// The fields of a change value this service reads; everything else is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChangeValue {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
}

impl NotificationEnvelope {
    /// Parse a request body, degrading malformed input to an empty envelope.
    pub fn parse(body: &[u8]) -> Self {
        match serde_json::from_slice(body) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::debug!(error = %e, "Notification body is not an envelope; treating as empty");
                Self::default()
            }
        }
    }

    /// Every live video start in the envelope, in payload order.
    pub fn live_video_events(&self) -> Vec<LiveVideoEvent> {
        self.entries
            .iter()
            .flat_map(|entry| entry.changes.iter())
            .filter_map(Change::live_video_event)
            .collect()
    }
}

impl Change {
    /// A live video event iff this is a `live_videos` change with status `live`
    /// and a non-empty video id.
    pub fn live_video_event(&self) -> Option<LiveVideoEvent> {
        if self.field.as_deref() != Some(LIVE_VIDEOS_FIELD) {
            return None;
        }
        let value = self.value.as_ref()?;
        if value.status.as_deref() != Some(LIVE_STATUS) {
            return None;
        }
        let video_id = value.id.as_deref().filter(|id| !id.is_empty())?;
        // A present title wins even when empty; description is the fallback.
        let title = value
            .title
            .as_deref()
            .or(value.description.as_deref())
            .unwrap_or_default();
        Some(LiveVideoEvent::new(video_id, title))
    }
}

/// Strings as-is, numbers in decimal form, anything else as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Arrays keep the elements that deserialize; non-arrays are empty.
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// A value that fails to deserialize becomes absent.
fn lenient_value<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(serde_json::from_value(Value::deserialize(deserializer)?).ok())
}
