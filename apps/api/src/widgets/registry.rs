//! Widget kinds: the closed set of widget types this service can create.
//!
//! Each kind carries its tag, label, default title and a `parse_data` coercion
//! that turns arbitrary stored JSON into the kind's data shape. Stored widgets
//! whose tag is not in this table are kept as opaque placeholders (see
//! [`resolve_metadata`]) instead of being dropped.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::models::widget::WidgetMetadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    Link,
    Notes,
    Iframe,
}

/// Typed payload of a known widget kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WidgetData {
    Url { url: String },
    Notes { content: String },
}

/// Entry of `GET /api/v1/widget-types`.
#[derive(Debug, Clone, Serialize)]
pub struct WidgetDescriptor {
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    pub label: &'static str,
    pub default_title: &'static str,
    pub default_data: WidgetData,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 3] = [WidgetKind::Link, WidgetKind::Notes, WidgetKind::Iframe];

    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetKind::Link => "link",
            WidgetKind::Notes => "notes",
            WidgetKind::Iframe => "iframe",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }

    pub fn label(&self) -> &'static str {
        match self {
            WidgetKind::Link => "Link",
            WidgetKind::Notes => "Notes",
            WidgetKind::Iframe => "Iframe",
        }
    }

    pub fn default_title(&self) -> &'static str {
        self.label()
    }

    pub fn default_data(&self) -> WidgetData {
        match self {
            WidgetKind::Link | WidgetKind::Iframe => WidgetData::Url { url: String::new() },
            WidgetKind::Notes => WidgetData::Notes {
                content: String::new(),
            },
        }
    }

    /// Coerces raw JSON into this kind's data shape. Missing or non-string
    /// fields become empty strings; unrelated fields are discarded.
    pub fn parse_data(&self, raw: &Value) -> WidgetData {
        let field = |name: &str| {
            raw.get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        match self {
            WidgetKind::Link | WidgetKind::Iframe => WidgetData::Url { url: field("url") },
            WidgetKind::Notes => WidgetData::Notes {
                content: field("content"),
            },
        }
    }

    /// Fresh metadata for a newly created widget of this kind.
    pub fn default_metadata(&self) -> WidgetMetadata {
        WidgetMetadata {
            widget_type: self.as_str().to_string(),
            title: Some(self.default_title().to_string()),
            data: self.default_data().into_value(),
        }
    }

    pub fn descriptor(&self) -> WidgetDescriptor {
        WidgetDescriptor {
            kind: *self,
            label: self.label(),
            default_title: self.default_title(),
            default_data: self.default_data(),
        }
    }
}

impl WidgetData {
    pub fn into_value(self) -> Value {
        match self {
            WidgetData::Url { url } => json!({ "url": url }),
            WidgetData::Notes { content } => json!({ "content": content }),
        }
    }
}

/// Stored metadata after matching its tag against the kind table.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedWidget {
    Known {
        kind: WidgetKind,
        metadata: WidgetMetadata,
    },
    /// Unknown tag. Carried verbatim so a later full-layout write keeps it.
    Opaque(WidgetMetadata),
}

impl ResolvedWidget {
    pub fn into_metadata(self) -> WidgetMetadata {
        match self {
            ResolvedWidget::Known { metadata, .. } | ResolvedWidget::Opaque(metadata) => metadata,
        }
    }
}

/// Normalizes the data of known kinds and keeps unknown kinds as they are.
pub fn resolve_metadata(widget_id: &str, metadata: WidgetMetadata) -> ResolvedWidget {
    match WidgetKind::from_tag(&metadata.widget_type) {
        Some(kind) => {
            let data = kind.parse_data(&metadata.data).into_value();
            ResolvedWidget::Known {
                kind,
                metadata: WidgetMetadata { data, ..metadata },
            }
        }
        None => {
            warn!(
                "Widget {widget_id} has unknown type '{}'; keeping it as an opaque placeholder",
                metadata.widget_type
            );
            ResolvedWidget::Opaque(metadata)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip_through_from_tag() {
        for kind in WidgetKind::ALL {
            assert_eq!(WidgetKind::from_tag(kind.as_str()), Some(kind));
        }
        assert_eq!(WidgetKind::from_tag("clock"), None);
        assert_eq!(WidgetKind::from_tag("Link"), None);
    }

    #[test]
    fn test_serde_tag_matches_as_str() {
        for kind in WidgetKind::ALL {
            assert_eq!(serde_json::to_value(kind).unwrap(), json!(kind.as_str()));
        }
    }

    #[test]
    fn test_default_metadata_for_link() {
        let meta = WidgetKind::Link.default_metadata();
        assert_eq!(meta.widget_type, "link");
        assert_eq!(meta.title.as_deref(), Some("Link"));
        assert_eq!(meta.data, json!({ "url": "" }));
    }

    #[test]
    fn test_default_metadata_for_notes() {
        let meta = WidgetKind::Notes.default_metadata();
        assert_eq!(meta.widget_type, "notes");
        assert_eq!(meta.title.as_deref(), Some("Notes"));
        assert_eq!(meta.data, json!({ "content": "" }));
    }

    #[test]
    fn test_default_metadata_is_a_fresh_value() {
        let mut first = WidgetKind::Link.default_metadata();
        first.data = json!({ "url": "https://example.com" });
        assert_eq!(WidgetKind::Link.default_metadata().data, json!({ "url": "" }));
    }

    #[test]
    fn test_parse_data_coerces_bad_fields() {
        assert_eq!(
            WidgetKind::Link.parse_data(&json!({ "url": 42, "extra": true })),
            WidgetData::Url { url: String::new() }
        );
        assert_eq!(
            WidgetKind::Notes.parse_data(&Value::Null),
            WidgetData::Notes {
                content: String::new()
            }
        );
        assert_eq!(
            WidgetKind::Iframe.parse_data(&json!({ "url": "https://a.b" })),
            WidgetData::Url {
                url: "https://a.b".to_string()
            }
        );
    }

    #[test]
    fn test_resolve_known_kind_normalizes_data() {
        let stored = WidgetMetadata {
            widget_type: "notes".to_string(),
            title: None,
            data: json!({ "content": "hi", "stale": 1 }),
        };
        match resolve_metadata("w1", stored) {
            ResolvedWidget::Known { kind, metadata } => {
                assert_eq!(kind, WidgetKind::Notes);
                assert_eq!(metadata.data, json!({ "content": "hi" }));
            }
            other => panic!("expected known widget, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_unknown_kind_is_preserved_verbatim() {
        let stored = WidgetMetadata {
            widget_type: "weather".to_string(),
            title: Some("Forecast".to_string()),
            data: json!({ "city": "Oslo" }),
        };
        let resolved = resolve_metadata("w2", stored.clone());
        assert_eq!(resolved, ResolvedWidget::Opaque(stored.clone()));
        assert_eq!(resolved.into_metadata(), stored);
    }

    #[test]
    fn test_descriptor_lists_every_kind() {
        let tags: Vec<_> = WidgetKind::ALL
            .iter()
            .map(|k| serde_json::to_value(k.descriptor()).unwrap()["type"].clone())
            .collect();
        assert_eq!(tags, vec![json!("link"), json!("notes"), json!("iframe")]);
    }
}
