//! Corpus acquisition.
//!
//! Turns a configured source into corpus text. `http://` and `https://`
//! sources are fetched with `reqwest`; anything else is read from the local
//! filesystem. Parsing and installation happen in
//! [`postdeck_core::corpus`].

use anyhow::{bail, Context, Result};
use postdeck_core::corpus::{parse_corpus, CorpusStore};
use postdeck_core::models::Document;
use std::time::Duration;

use crate::config::Config;

/// Raw corpus text plus the name used for format selection.
#[derive(Debug, Clone)]
pub struct CorpusText {
    pub text: String,
    /// File path or URL path; its extension decides line-delimited parsing.
    pub name: String,
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Fetch the corpus text from `source`.
pub async fn fetch_corpus_text(source: &str, timeout: Duration) -> Result<CorpusText> {
    if is_remote(source) {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        let resp = client
            .get(source)
            .send()
            .await
            .with_context(|| format!("fetching {}", source))?;
        let status = resp.status();
        if !status.is_success() {
            bail!("fetching {}: HTTP {}", source, status);
        }
        let name = resp.url().path().to_string();
        let text = resp
            .text()
            .await
            .with_context(|| format!("reading response body from {}", source))?;
        Ok(CorpusText { text, name })
    } else {
        let text = tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("reading {}", source))?;
        Ok(CorpusText {
            text,
            name: source.to_string(),
        })
    }
}

/// Acquire and parse the configured corpus without installing it anywhere.
///
/// Acquisition and parse failures are both load-level: nothing is returned
/// and the caller keeps whatever corpus it already had.
pub async fn fetch_documents(config: &Config) -> Result<Vec<Document>> {
    let source = &config.corpus.source;
    let timeout = Duration::from_secs(config.corpus.timeout_secs);

    let documents = read_and_parse(source, timeout)
        .await
        .context("Failed to load corpus")?;

    tracing::info!(source = %source, documents = documents.len(), "corpus acquired");
    Ok(documents)
}

async fn read_and_parse(source: &str, timeout: Duration) -> Result<Vec<Document>> {
    let corpus = fetch_corpus_text(source, timeout).await?;
    parse_corpus(&corpus.text, Some(&corpus.name)).with_context(|| format!("parsing {}", source))
}

/// Acquire the configured corpus into a fresh store (generation 1).
pub async fn load_corpus(config: &Config) -> Result<CorpusStore> {
    let documents = fetch_documents(config).await?;
    let mut store = CorpusStore::new();
    store.replace(documents);
    Ok(store)
}
