use serde::{Deserialize, Serialize};

/// A Facebook page started broadcasting a live video.
///
/// Derived from a `live_videos` change whose status is `live`; never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveVideoEvent {
    pub video_id: String,
    /// May be empty when the platform sent neither a title nor a description.
    pub video_title: String,
}

impl LiveVideoEvent {
    pub fn new(video_id: impl Into<String>, video_title: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            video_title: video_title.into(),
        }
    }

    pub fn has_title(&self) -> bool {
        !self.video_title.is_empty()
    }
}

impl std::fmt::Display for LiveVideoEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.has_title() {
            write!(f, "video {} ({})", self.video_id, self.video_title)
        } else {
            write!(f, "video {}", self.video_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_title_when_present() {
        let event = LiveVideoEvent::new("987654321", "Sunday Morning Service");
        assert_eq!(event.to_string(), "video 987654321 (Sunday Morning Service)");
    }

    #[test]
    fn display_omits_empty_title() {
        let event = LiveVideoEvent::new("42", "");
        assert!(!event.has_title());
        assert_eq!(event.to_string(), "video 42");
    }

    #[test]
    fn serializes_snake_case_fields() {
        let event = LiveVideoEvent::new("V1", "Title");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["video_id"], "V1");
        assert_eq!(json["video_title"], "Title");
    }
}
