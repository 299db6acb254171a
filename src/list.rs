//! Filtered post listing.
//!
//! Backs the `postdeck list` command and `GET /posts`. Both build a
//! [`FilterCriteria`] from user input and run it over the loaded corpus.

use anyhow::Result;
use postdeck_core::corpus::CorpusStore;
use postdeck_core::filter::FilterCriteria;
use postdeck_core::models::FacetGroup;

use crate::acquire;
use crate::config::Config;
use crate::view::PostSummary;

/// Raw filter input as received from the CLI or a query string.
#[derive(Debug, Clone, Default)]
pub struct FilterInput {
    pub title: Option<String>,
    pub author: Option<String>,
    pub models: Vec<String>,
    pub topics: Vec<String>,
    pub assignments: Vec<String>,
}

impl FilterInput {
    pub fn to_criteria(&self) -> FilterCriteria {
        FilterCriteria::new()
            .with_title(self.title.clone().unwrap_or_default())
            .with_author(self.author.clone().unwrap_or_default())
            .with_selected(FacetGroup::Models, non_blank(&self.models))
            .with_selected(FacetGroup::Topics, non_blank(&self.topics))
            .with_selected(FacetGroup::Assignments, non_blank(&self.assignments))
    }
}

fn non_blank(ids: &[String]) -> Vec<String> {
    ids.iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Summaries of every post matching `criteria`, in corpus order.
pub fn list_posts(
    store: &CorpusStore,
    criteria: &FilterCriteria,
    date_format: &str,
) -> Vec<PostSummary> {
    store
        .filter_indexed(criteria)
        .into_iter()
        .map(|(index, doc)| PostSummary::new(index, doc, date_format))
        .collect()
}

/// CLI entry point: load the corpus, filter, and print.
pub async fn run_list(config: &Config, input: &FilterInput, json: bool) -> Result<()> {
    let store = acquire::load_corpus(config).await?;
    let criteria = input.to_criteria();
    let posts = list_posts(&store, &criteria, &config.display.date_format);
    tracing::debug!(matched = posts.len(), total = store.len(), "filter applied");

    if json {
        println!("{}", serde_json::to_string_pretty(&posts)?);
        return Ok(());
    }

    if posts.is_empty() {
        println!("No matching posts.");
        return Ok(());
    }

    for post in &posts {
        let title = post.title.as_deref().unwrap_or("(untitled)");
        match post.author.as_deref() {
            Some(author) => {
                println!("{:>4}  {:<14}  {} ({})", post.index, post.date, title, author)
            }
            None => println!("{:>4}  {:<14}  {}", post.index, post.date, title),
        }
    }
    println!();
    println!("{} of {} posts", posts.len(), store.len());

    Ok(())
}
