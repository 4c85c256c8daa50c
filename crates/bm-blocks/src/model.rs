//! Block model.
//!
//! Documents arrive from the editor as JSON:
//!
//! ```json
//! { "id": "email-1", "subject": "Launch", "blocks": [
//!     { "id": "b1", "type": "quickPoll", "props": { "question": "Ship it?" } }
//! ] }
//! ```
//!
//! Props are block-type-specific and every prop has a default, so a block with
//! empty props still renders.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Email document: an ordered list of blocks plus envelope fields.
///
/// Block order is rendering order, top to bottom.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Opaque document identifier (owned by the editor/storage layer).
    #[serde(default)]
    pub id: String,
    /// Email subject line.
    #[serde(default)]
    pub subject: String,
    /// Hidden inbox preview text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preheader: Option<String>,
    /// Blocks in rendering order.
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Document {
    /// Parse a document from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Block ids that occur more than once, in first-duplicate order.
    pub fn duplicate_block_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for block in &self.blocks {
            if !seen.insert(block.id.as_str()) && !duplicates.contains(&block.id.as_str()) {
                duplicates.push(block.id.as_str());
            }
        }
        duplicates
    }
}

/// A single content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Identifier, unique within its document.
    pub id: String,
    /// Block type.
    #[serde(rename = "type")]
    pub block_type: BlockType,
    /// Type-specific properties.
    #[serde(default)]
    pub props: Props,
}

impl Block {
    /// Create a block with empty props.
    pub fn new(id: impl Into<String>, block_type: BlockType) -> Self {
        Self {
            id: id.into(),
            block_type,
            props: Props::default(),
        }
    }

    /// Set a prop (builder style).
    #[must_use]
    pub fn with_prop(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.props.0.insert(key.to_owned(), value.into());
        self
    }
}

/// Closed set of block types the product defines.
///
/// Any unrecognized `type` string deserializes to [`BlockType::Unknown`],
/// which the renderer skips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockType {
    Heading,
    Text,
    Button,
    Image,
    Divider,
    Spacer,
    AnnouncementBanner,
    FeedbackPrompt,
    QuickPoll,
    Pattern,
    #[serde(other)]
    Unknown,
}

impl BlockType {
    /// Whether the block records recipient responses.
    pub fn is_interactive(self) -> bool {
        matches!(self, Self::FeedbackPrompt | Self::QuickPoll)
    }
}

/// Block properties with typed, defaulting accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Props(pub Map<String, Value>);

impl Props {
    /// Non-empty string prop.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// String prop, or `default` when missing, empty, or not a string.
    pub fn text_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.text(key).unwrap_or(default)
    }

    /// Unsigned integer prop clamped to `min..=max`.
    ///
    /// Accepts JSON numbers and numeric strings (`"24"`, `"24px"`).
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn number_in(&self, key: &str, default: u32, min: u32, max: u32) -> u32 {
        let parsed = match self.0.get(key) {
            Some(Value::Number(n)) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64)),
            Some(Value::String(s)) => s.trim().trim_end_matches("px").parse::<u64>().ok(),
            _ => None,
        };
        parsed
            .map_or(default, |n| u32::try_from(n).unwrap_or(u32::MAX))
            .clamp(min, max)
    }

    /// Boolean prop.
    pub fn flag_or(&self, key: &str, default: bool) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    /// Array prop.
    pub fn list(&self, key: &str) -> Option<&[Value]> {
        self.0.get(key).and_then(Value::as_array).map(Vec::as_slice)
    }

    /// Object prop.
    pub fn object(&self, key: &str) -> Option<&Map<String, Value>> {
        self.0.get(key).and_then(Value::as_object)
    }
}

/// The fixed rating scale offered by feedback prompts.
///
/// The scale value is what travels in the response link, so these strings are
/// part of the link protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackScale {
    Love,
    Like,
    Meh,
    Dislike,
}

impl FeedbackScale {
    /// All scale values in display order.
    pub const ALL: [Self; 4] = [Self::Love, Self::Like, Self::Meh, Self::Dislike];

    /// Wire value used in response links.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Love => "love",
            Self::Like => "like",
            Self::Meh => "meh",
            Self::Dislike => "dislike",
        }
    }

    /// Emoji shown for the option.
    pub fn emoji(self) -> &'static str {
        match self {
            Self::Love => "\u{1F60D}",
            Self::Like => "\u{1F642}",
            Self::Meh => "\u{1F610}",
            Self::Dislike => "\u{1F641}",
        }
    }

    /// Label used when the block does not override it.
    pub fn default_label(self) -> &'static str {
        match self {
            Self::Love => "Love it",
            Self::Like => "Like it",
            Self::Meh => "It's okay",
            Self::Dislike => "Not for me",
        }
    }

    /// Parse a wire value.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_document() {
        let doc = Document::from_json(
            r#"{"id":"e1","subject":"Hello","blocks":[
                {"id":"b1","type":"announcementBanner","props":{"title":"News"}},
                {"id":"b2","type":"quickPoll"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(doc.id, "e1");
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.blocks[0].block_type, BlockType::AnnouncementBanner);
        assert_eq!(doc.blocks[0].props.text("title"), Some("News"));
        assert_eq!(doc.blocks[1].block_type, BlockType::QuickPoll);
        assert!(doc.blocks[1].props.0.is_empty());
    }

    #[test]
    fn test_unknown_type_deserializes() {
        let doc = Document::from_json(r#"{"blocks":[{"id":"x","type":"carousel"}]}"#).unwrap();

        assert_eq!(doc.blocks[0].block_type, BlockType::Unknown);
    }

    #[test]
    fn test_duplicate_block_ids() {
        let doc = Document {
            blocks: vec![
                Block::new("a", BlockType::Text),
                Block::new("b", BlockType::Text),
                Block::new("a", BlockType::Text),
                Block::new("a", BlockType::Divider),
            ],
            ..Document::default()
        };

        assert_eq!(doc.duplicate_block_ids(), vec!["a"]);
    }

    #[test]
    fn test_props_text_ignores_blank() {
        let block = Block::new("b", BlockType::Text)
            .with_prop("text", "   ")
            .with_prop("align", 3);

        assert_eq!(block.props.text("text"), None);
        assert_eq!(block.props.text_or("text", "fallback"), "fallback");
        assert_eq!(block.props.text_or("align", "left"), "left");
    }

    #[test]
    fn test_props_number_in() {
        let props = Props(
            json!({"a": 40, "b": "32px", "c": 900, "d": "wide", "e": 12.6})
                .as_object()
                .unwrap()
                .clone(),
        );

        assert_eq!(props.number_in("a", 10, 0, 100), 40);
        assert_eq!(props.number_in("b", 10, 0, 100), 32);
        assert_eq!(props.number_in("c", 10, 0, 100), 100);
        assert_eq!(props.number_in("d", 10, 0, 100), 10);
        assert_eq!(props.number_in("e", 10, 0, 100), 13);
        assert_eq!(props.number_in("missing", 10, 0, 100), 10);
    }

    #[test]
    fn test_feedback_scale_roundtrip_values() {
        for scale in FeedbackScale::ALL {
            assert_eq!(FeedbackScale::parse(scale.as_str()), Some(scale));
        }
        assert_eq!(FeedbackScale::parse("LOVE"), None);
    }
}
