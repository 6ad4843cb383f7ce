//! Content record entity - the media bundle attached to one scene location

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DomainError;
use crate::ids::{LocationId, VideoId};
use crate::value_objects::VideoSource;

/// Media bundle for one location.
///
/// Only `id` and `video_source` matter to playback; the remaining fields are
/// presentation content for the side panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub id: LocationId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_quote: Option<String>,
    #[serde(
        default,
        rename = "mainVideoUrl",
        alias = "videoSource",
        deserialize_with = "deserialize_video_source",
        skip_serializing_if = "Option::is_none"
    )]
    pub video_source: Option<VideoSource>,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

impl ContentRecord {
    pub fn new(id: LocationId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            highlight_quote: None,
            video_source: None,
            chapters: Vec::new(),
        }
    }

    pub fn with_video(mut self, url: &str) -> Self {
        self.video_source = VideoSource::classify(url);
        self
    }

    pub fn with_highlight_quote(mut self, quote: impl Into<String>) -> Self {
        self.highlight_quote = Some(quote.into());
        self
    }

    pub fn with_chapter(mut self, chapter: Chapter) -> Self {
        self.chapters.push(chapter);
        self
    }

    /// The widget video id, when the main video is widget-hosted.
    pub fn widget_video(&self) -> Option<&VideoId> {
        self.video_source.as_ref().and_then(VideoSource::widget_id)
    }

    pub fn has_video(&self) -> bool {
        self.video_source.is_some()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation(format!(
                "Content record '{}' has an empty title",
                self.id
            )));
        }
        Ok(())
    }
}

/// A titled group of content blocks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub content_blocks: Vec<ContentBlock>,
}

/// One renderable block inside a chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Paragraph {
        text: String,
    },
    Quote {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attribution: Option<String>,
    },
    Image {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
    },
    /// Chapter videos are referenced, never played inline.
    Video {
        url: String,
    },
    /// Block kinds this version does not know how to render.
    #[serde(other)]
    Unsupported,
}

fn deserialize_video_source<'de, D>(deserializer: D) -> Result<Option<VideoSource>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(VideoSource::classify))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_catalog_record_shape() {
        let json = r#"{
            "id": "lighthouse",
            "title": "The Lighthouse",
            "highlightQuote": "Keep the light burning",
            "mainVideoUrl": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "chapters": [
                {
                    "title": "Origins",
                    "contentBlocks": [
                        { "type": "paragraph", "text": "Built in 1871." },
                        { "type": "quote", "text": "It never went dark.", "attribution": "Keeper" },
                        { "type": "image", "url": "/img/lamp.jpg" },
                        { "type": "carousel", "items": [] }
                    ]
                }
            ]
        }"#;

        let record: ContentRecord = serde_json::from_str(json).expect("valid record");
        assert_eq!(record.id.as_str(), "lighthouse");
        assert_eq!(
            record.widget_video().map(VideoId::as_str),
            Some("dQw4w9WgXcQ")
        );
        let blocks = &record.chapters[0].content_blocks;
        assert_eq!(blocks.len(), 4);
        assert!(matches!(blocks[1], ContentBlock::Quote { attribution: Some(_), .. }));
        assert!(matches!(blocks[2], ContentBlock::Image { alt: None, .. }));
        assert_eq!(blocks[3], ContentBlock::Unsupported);
    }

    #[test]
    fn empty_video_url_means_no_video() {
        let json = r#"{ "id": "quay", "title": "Quay", "mainVideoUrl": "" }"#;
        let record: ContentRecord = serde_json::from_str(json).expect("valid record");
        assert!(!record.has_video());
        assert!(record.chapters.is_empty());
    }

    #[test]
    fn direct_file_video_has_no_widget_id() {
        let id = LocationId::parse("market").expect("valid key");
        let record = ContentRecord::new(id, "Market").with_video("/media/market.mp4");
        assert!(record.has_video());
        assert_eq!(record.widget_video(), None);
    }

    #[test]
    fn blank_title_fails_validation() {
        let id = LocationId::parse("market").expect("valid key");
        assert!(ContentRecord::new(id, "  ").validate().is_err());
    }
}
