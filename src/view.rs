//! Presentation-ready shapes shared by the CLI and the HTTP server.
//!
//! These wrap core values with display strings (date labels, facet names
//! with underscores shown as spaces) without changing the underlying ids.

use postdeck_core::corpus::TagUniverse;
use postdeck_core::layout::{render_document, ContentBlock};
use postdeck_core::models::{display_facet, Document, FacetGroup};
use serde::Serialize;

/// A facet id with its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetLabel {
    pub id: String,
    pub label: String,
}

impl FacetLabel {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            label: display_facet(id),
        }
    }
}

fn labels(ids: &[String]) -> Vec<FacetLabel> {
    ids.iter().map(|id| FacetLabel::new(id)).collect()
}

/// One row of a filtered listing.
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    /// Position in the current corpus generation.
    pub index: usize,
    pub title: Option<String>,
    pub author: Option<String>,
    pub date: String,
    pub models: Vec<FacetLabel>,
    pub topics: Vec<FacetLabel>,
    pub assignments: Vec<FacetLabel>,
}

impl PostSummary {
    pub fn new(index: usize, doc: &Document, date_format: &str) -> Self {
        Self {
            index,
            title: doc.title.clone(),
            author: doc.author_name.clone(),
            date: doc.date_label(date_format),
            models: labels(doc.facets.get(FacetGroup::Models)),
            topics: labels(doc.facets.get(FacetGroup::Topics)),
            assignments: labels(doc.facets.get(FacetGroup::Assignments)),
        }
    }
}

/// A selected post with its rendered content blocks.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentView {
    #[serde(flatten)]
    pub summary: PostSummary,
    pub blocks: Vec<ContentBlock>,
}

impl DocumentView {
    /// Render `doc` from scratch; nothing is cached between selections.
    pub fn new(index: usize, doc: &Document, date_format: &str) -> Self {
        Self {
            summary: PostSummary::new(index, doc, date_format),
            blocks: render_document(doc),
        }
    }
}

/// The tag universe with display labels.
#[derive(Debug, Clone, Serialize)]
pub struct TagsView {
    pub models: Vec<FacetLabel>,
    pub topics: Vec<FacetLabel>,
    pub assignments: Vec<FacetLabel>,
}

impl TagsView {
    pub fn new(universe: &TagUniverse) -> Self {
        Self {
            models: labels(universe.get(FacetGroup::Models)),
            topics: labels(universe.get(FacetGroup::Topics)),
            assignments: labels(universe.get(FacetGroup::Assignments)),
        }
    }

    pub fn get(&self, group: FacetGroup) -> &[FacetLabel] {
        match group {
            FacetGroup::Models => &self.models,
            FacetGroup::Topics => &self.topics,
            FacetGroup::Assignments => &self.assignments,
        }
    }
}
