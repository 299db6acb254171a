//! Post data model.
//!
//! Corpus records are loosely shaped JSON: any field may be missing, null,
//! or of an unexpected type. [`Document::from_record`] maps a record onto
//! explicit optional fields so every consumer states its own fallback.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Label shown when a post has no usable creation timestamp.
pub const UNKNOWN_DATE: &str = "Unknown date";

/// Epoch values at or above this are interpreted as milliseconds.
const EPOCH_MILLIS_THRESHOLD: f64 = 1e12;

/// One of the three tag dimensions usable as a multi-select filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetGroup {
    Models,
    Topics,
    Assignments,
}

impl FacetGroup {
    pub const ALL: [FacetGroup; 3] = [
        FacetGroup::Models,
        FacetGroup::Topics,
        FacetGroup::Assignments,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FacetGroup::Models => "models",
            FacetGroup::Topics => "topics",
            FacetGroup::Assignments => "assignments",
        }
    }
}

/// Facet values attached to a single post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub models: Vec<String>,
    pub topics: Vec<String>,
    pub assignments: Vec<String>,
}

impl Facets {
    pub fn get(&self, group: FacetGroup) -> &[String] {
        match group {
            FacetGroup::Models => &self.models,
            FacetGroup::Topics => &self.topics,
            FacetGroup::Assignments => &self.assignments,
        }
    }
}

/// Creation timestamp as it appeared in the record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Text(String),
    Number(f64),
}

/// A single post in the corpus.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    pub title: Option<String>,
    pub author_name: Option<String>,
    pub created_at: Option<RawTimestamp>,
    /// Plain body text (`document`).
    pub body_text: Option<String>,
    /// Fallback body text (`raw.document`).
    pub raw_body_text: Option<String>,
    /// Markup body with media references (`raw.content`).
    pub markup_content: Option<String>,
    pub facets: Facets,
}

impl Document {
    /// Build a document from one JSON record.
    ///
    /// Never fails: fields that are missing or have the wrong type are
    /// treated as absent, and a non-object record yields an empty document.
    pub fn from_record(record: &Value) -> Self {
        let raw = record.get("raw");
        let clusters = record.get("cluster_metadata");

        Document {
            title: string_field(record.get("title")),
            author_name: string_field(record.get("author_name")),
            created_at: timestamp_field(record.get("created_at")),
            body_text: string_field(record.get("document")),
            raw_body_text: string_field(raw.and_then(|r| r.get("document"))),
            markup_content: string_field(raw.and_then(|r| r.get("content"))),
            facets: Facets {
                models: id_list(clusters.and_then(|c| c.get("model_ids"))),
                topics: id_list(clusters.and_then(|c| c.get("topic_category_ids"))),
                assignments: id_list(clusters.and_then(|c| c.get("post_type_category_ids"))),
            },
        }
    }

    /// Body text to lay out: `document`, falling back to `raw.document`.
    pub fn body(&self) -> Option<&str> {
        self.body_text
            .as_deref()
            .or(self.raw_body_text.as_deref())
    }

    /// Parsed creation time, or `None` when missing or unparseable.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        match self.created_at.as_ref()? {
            RawTimestamp::Number(n) => from_epoch(*n),
            RawTimestamp::Text(s) => parse_timestamp_text(s),
        }
    }

    /// Creation date formatted with `format`, or [`UNKNOWN_DATE`].
    ///
    /// An invalid strftime `format` also yields [`UNKNOWN_DATE`].
    pub fn date_label(&self, format: &str) -> String {
        let Some(ts) = self.created_at() else {
            return UNKNOWN_DATE.to_string();
        };
        let mut label = String::new();
        match write!(label, "{}", ts.format(format)) {
            Ok(()) => label,
            Err(_) => UNKNOWN_DATE.to_string(),
        }
    }
}

/// Whether `format` is a strftime string chrono can render.
pub fn is_valid_date_format(format: &str) -> bool {
    StrftimeItems::new(format).all(|item| !matches!(item, Item::Error))
}

/// Display form of a facet id. Matching always uses the raw id.
pub fn display_facet(id: &str) -> String {
    id.replace('_', " ")
}

fn string_field(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

fn timestamp_field(value: Option<&Value>) -> Option<RawTimestamp> {
    match value? {
        Value::String(s) => Some(RawTimestamp::Text(s.clone())),
        Value::Number(n) => n.as_f64().map(RawTimestamp::Number),
        _ => None,
    }
}

fn id_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn from_epoch(n: f64) -> Option<DateTime<Utc>> {
    if !n.is_finite() {
        return None;
    }
    let millis = if n.abs() >= EPOCH_MILLIS_THRESHOLD {
        n
    } else {
        n * 1000.0
    };
    DateTime::from_timestamp_millis(millis as i64)
}

fn parse_timestamp_text(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    s.parse::<f64>().ok().and_then(from_epoch)
}
