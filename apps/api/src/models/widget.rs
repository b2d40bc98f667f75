use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::layout::slot_finder::{Footprint, Rect};

/// One row of the `widgets` table. Metadata columns are nullable for rows
/// written before widget metadata existed.
#[derive(Debug, Clone, FromRow)]
#[allow(dead_code)]
pub struct WidgetRow {
    pub id: String,
    pub dashboard_id: String,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub widget_type: Option<String>,
    pub title: Option<String>,
    pub data: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Placed widget geometry as exchanged with clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutItem {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Footprint for LayoutItem {
    fn footprint(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }
}

/// Per-widget content. `widget_type` is kept as the raw tag so that kinds this
/// build does not know survive a reload-and-save cycle untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetMetadata {
    #[serde(rename = "type")]
    pub widget_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub data: Value,
}

/// Everything placed on one dashboard: geometry plus metadata keyed by widget id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardLayout {
    pub layout: Vec<LayoutItem>,
    #[serde(default)]
    pub metadata: BTreeMap<String, WidgetMetadata>,
}

impl DashboardLayout {
    pub fn contains(&self, widget_id: &str) -> bool {
        self.layout.iter().any(|item| item.id == widget_id)
    }

    /// Removes a widget and its metadata. Returns `false` if it was not present.
    pub fn remove(&mut self, widget_id: &str) -> bool {
        let before = self.layout.len();
        self.layout.retain(|item| item.id != widget_id);
        self.metadata.remove(widget_id);
        self.layout.len() != before
    }

    /// Drops metadata entries whose widget is no longer in the layout.
    pub fn prune_metadata(&mut self) {
        let layout = &self.layout;
        self.metadata
            .retain(|id, _| layout.iter().any(|item| &item.id == id));
    }
}
