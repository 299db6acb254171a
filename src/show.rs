//! Single post view.
//!
//! Renders one post's content blocks. Used by both the `postdeck show` CLI
//! command and `GET /posts/{index}`.

use anyhow::{bail, Result};
use postdeck_core::corpus::CorpusStore;
use postdeck_core::layout::ContentBlock;

use crate::acquire;
use crate::config::Config;
use crate::view::DocumentView;

/// Message printed when a post has no blocks at all.
pub const NO_CONTENT: &str = "No content available.";

/// Core show function returning structured data (used by CLI and server).
pub fn view_document(store: &CorpusStore, index: usize, date_format: &str) -> Result<DocumentView> {
    match store.get(index) {
        Some(doc) => Ok(DocumentView::new(index, doc, date_format)),
        None => bail!(
            "post not found: index {} (corpus has {} posts)",
            index,
            store.len()
        ),
    }
}

/// CLI entry point: load the corpus, render the post, and print it.
pub async fn run_show(config: &Config, index: usize, json: bool) -> Result<()> {
    let store = acquire::load_corpus(config).await?;
    let view = view_document(&store, index, &config.display.date_format)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    let post = &view.summary;
    println!("--- Post {} ---", post.index);
    println!(
        "title:       {}",
        post.title.as_deref().unwrap_or("(untitled)")
    );
    if let Some(ref author) = post.author {
        println!("author:      {}", author);
    }
    println!("date:        {}", post.date);
    for (name, facets) in [
        ("models:", &post.models),
        ("topics:", &post.topics),
        ("assignments:", &post.assignments),
    ] {
        if !facets.is_empty() {
            let labels: Vec<&str> = facets.iter().map(|f| f.label.as_str()).collect();
            println!("{:<12} {}", name, labels.join(", "));
        }
    }
    println!();

    println!("--- Content ---");
    if view.blocks.is_empty() {
        println!("{}", NO_CONTENT);
        return Ok(());
    }
    for block in &view.blocks {
        println!("{}", render_block(block));
        println!();
    }

    Ok(())
}

/// Plain-text rendering of one block for terminal output.
fn render_block(block: &ContentBlock) -> String {
    match block {
        ContentBlock::Paragraph { text } => text.clone(),
        ContentBlock::LineBreakParagraph { lines } => lines.join("\n"),
        ContentBlock::Image { src } => format!("[image] {}", src),
        ContentBlock::Link { url, text } if text == url => format!("[link] {}", url),
        ContentBlock::Link { url, text } => format!("[link] {} <{}>", text, url),
        ContentBlock::File { url } => format!("[file] {}", url),
    }
}
