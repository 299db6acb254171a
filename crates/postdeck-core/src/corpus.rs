//! Corpus store and corpus text parsing.
//!
//! A corpus is loaded as a whole ("replace the world"): the full text is
//! parsed into documents first, and only a completely parsed collection is
//! installed. A parse failure leaves the previous generation untouched.
//!
//! # Input formats
//!
//! - **Line-delimited JSON**: one record per non-blank line.
//! - **Single value**: a JSON array of records, or one bare record. Only
//!   chosen when the text has exactly one non-blank line and the source name
//!   does not carry a line-delimited extension (`.jsonl`, `.ndjson`).

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::filter::{filter, FilterCriteria};
use crate::models::{Document, FacetGroup};

/// Source-name extensions that force line-delimited parsing.
const LINE_DELIMITED_EXTENSIONS: [&str; 2] = [".jsonl", ".ndjson"];

/// Load-level failure. Aborts the whole load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid JSON on line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid JSON: {0}")]
    Value(#[source] serde_json::Error),
}

/// All distinct facet values observed across a corpus, sorted per group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagUniverse {
    pub models: Vec<String>,
    pub topics: Vec<String>,
    pub assignments: Vec<String>,
}

impl TagUniverse {
    /// Sorted, deduplicated union of every document's facet values.
    pub fn from_documents(documents: &[Document]) -> Self {
        let collect = |group: FacetGroup| -> Vec<String> {
            documents
                .iter()
                .flat_map(|d| d.facets.get(group).iter().cloned())
                .collect::<BTreeSet<String>>()
                .into_iter()
                .collect()
        };

        TagUniverse {
            models: collect(FacetGroup::Models),
            topics: collect(FacetGroup::Topics),
            assignments: collect(FacetGroup::Assignments),
        }
    }

    pub fn get(&self, group: FacetGroup) -> &[String] {
        match group {
            FacetGroup::Models => &self.models,
            FacetGroup::Topics => &self.topics,
            FacetGroup::Assignments => &self.assignments,
        }
    }
}

/// Owns the documents of one load generation and their tag universe.
#[derive(Debug, Clone, Default)]
pub struct CorpusStore {
    documents: Vec<Document>,
    universe: TagUniverse,
    generation: u64,
}

impl CorpusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `text` and install it as the next generation.
    ///
    /// `source_name` is the file name or URL the text came from; it only
    /// influences format selection. Returns the number of documents loaded.
    pub fn load_text(&mut self, text: &str, source_name: Option<&str>) -> Result<usize, LoadError> {
        let documents = parse_corpus(text, source_name)?;
        let count = documents.len();
        self.replace(documents);
        tracing::info!(
            documents = count,
            generation = self.generation,
            "corpus loaded"
        );
        Ok(count)
    }

    /// Install an already-parsed collection, replacing the current one.
    pub fn replace(&mut self, documents: Vec<Document>) {
        self.universe = TagUniverse::from_documents(&documents);
        self.documents = documents;
        self.generation += 1;
    }

    /// A new store holding `documents` as the generation after this one.
    ///
    /// `self` is left untouched, so readers of the current generation are
    /// unaffected until the caller swaps the successor in.
    pub fn successor(&self, documents: Vec<Document>) -> CorpusStore {
        let mut next = CorpusStore {
            generation: self.generation,
            ..CorpusStore::default()
        };
        next.replace(documents);
        next
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, index: usize) -> Option<&Document> {
        self.documents.get(index)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Number of successful loads so far; `0` before the first.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn tag_universe(&self) -> &TagUniverse {
        &self.universe
    }

    /// Documents matching `criteria`, in corpus order.
    pub fn filter(&self, criteria: &FilterCriteria) -> Vec<&Document> {
        filter(&self.documents, criteria)
    }

    /// Like [`CorpusStore::filter`], paired with each document's position in
    /// the corpus.
    pub fn filter_indexed(&self, criteria: &FilterCriteria) -> Vec<(usize, &Document)> {
        self.documents
            .iter()
            .enumerate()
            .filter(|(_, doc)| criteria.matches(doc))
            .collect()
    }
}

/// Parse corpus text into documents without touching any store.
pub fn parse_corpus(text: &str, source_name: Option<&str>) -> Result<Vec<Document>, LoadError> {
    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .collect();

    let line_delimited = source_name.is_some_and(has_line_delimited_extension);

    if lines.len() == 1 && !line_delimited {
        let value: Value = serde_json::from_str(lines[0].1).map_err(LoadError::Value)?;
        return Ok(match value {
            Value::Array(records) => records.iter().map(Document::from_record).collect(),
            record => vec![Document::from_record(&record)],
        });
    }

    lines
        .into_iter()
        .map(|(idx, line)| {
            serde_json::from_str::<Value>(line)
                .map(|record| Document::from_record(&record))
                .map_err(|source| LoadError::Line {
                    line: idx + 1,
                    source,
                })
        })
        .collect()
}

fn has_line_delimited_extension(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    LINE_DELIMITED_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(ext))
}
