//! Faceted filter engine.
//!
//! A document is visible when every active constraint holds:
//!
//! 1. Title query (trimmed, case-folded substring) when non-blank.
//! 2. Author query, same rule, when non-blank.
//! 3. For each facet group with a non-empty selection, at least one of the
//!    document's values for that group is selected (OR within a group).
//! 4. All active groups hold at once (AND across groups).
//!
//! Filtering never reorders and never mutates the corpus.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::models::{Document, FacetGroup};

/// User-selected filter state. Empty strings and empty sets impose no
/// constraint.
///
/// Every mutator consumes `self` and returns the updated criteria, so a
/// previously applied value is never changed underneath a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterCriteria {
    pub title_query: String,
    pub author_query: String,
    pub selected_models: BTreeSet<String>,
    pub selected_topics: BTreeSet<String>,
    pub selected_assignments: BTreeSet<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, query: impl Into<String>) -> Self {
        self.title_query = query.into();
        self
    }

    pub fn with_author(mut self, query: impl Into<String>) -> Self {
        self.author_query = query.into();
        self
    }

    /// Add `id` to the group's selection if absent, remove it if present.
    pub fn toggled(mut self, group: FacetGroup, id: &str) -> Self {
        let set = self.selected_mut(group);
        if !set.remove(id) {
            set.insert(id.to_string());
        }
        self
    }

    /// Criteria with `ids` selected in `group`, in addition to any already
    /// selected.
    pub fn with_selected<I, S>(mut self, group: FacetGroup, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_mut(group)
            .extend(ids.into_iter().map(Into::into));
        self
    }

    /// The "clear all" action.
    pub fn cleared(self) -> Self {
        Self::default()
    }

    pub fn selected(&self, group: FacetGroup) -> &BTreeSet<String> {
        match group {
            FacetGroup::Models => &self.selected_models,
            FacetGroup::Topics => &self.selected_topics,
            FacetGroup::Assignments => &self.selected_assignments,
        }
    }

    /// True when no dimension constrains the result.
    pub fn is_empty(&self) -> bool {
        self.title_query.trim().is_empty()
            && self.author_query.trim().is_empty()
            && FacetGroup::ALL.iter().all(|g| self.selected(*g).is_empty())
    }

    /// Whether a single document satisfies every active constraint.
    pub fn matches(&self, doc: &Document) -> bool {
        text_matches(doc.title.as_deref(), &self.title_query)
            && text_matches(doc.author_name.as_deref(), &self.author_query)
            && FacetGroup::ALL.iter().all(|group| {
                let selected = self.selected(*group);
                selected.is_empty() || doc.facets.get(*group).iter().any(|v| selected.contains(v))
            })
    }

    fn selected_mut(&mut self, group: FacetGroup) -> &mut BTreeSet<String> {
        match group {
            FacetGroup::Models => &mut self.selected_models,
            FacetGroup::Topics => &mut self.selected_topics,
            FacetGroup::Assignments => &mut self.selected_assignments,
        }
    }
}

/// Documents of `corpus` matching `criteria`, in corpus order.
pub fn filter<'a>(corpus: &'a [Document], criteria: &FilterCriteria) -> Vec<&'a Document> {
    corpus.iter().filter(|doc| criteria.matches(doc)).collect()
}

fn text_matches(field: Option<&str>, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }
    match field {
        Some(value) => value.to_lowercase().contains(&query.to_lowercase()),
        None => false,
    }
}
