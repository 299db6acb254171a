//! Content layout: interleaving body text with extracted images.
//!
//! [`assemble_layout`] turns a post body and its ordered image sources into
//! the block sequence handed to the presentation layer. It runs in one of
//! two modes.
//!
//! # Interleaved mode (images present, body non-empty)
//!
//! The body is walked line by line. Each non-blank line becomes a
//! [`ContentBlock::Paragraph`]. After each line (blank or not) the next
//! unplaced image is inserted when either
//!
//! - the following line, trimmed, is empty or starts with `Output`,
//!   `Analysis` or `Prompt`, or
//! - the current line, trimmed, ends with `:`.
//!
//! Each trigger places exactly one image. Images still unplaced after the
//! last line are appended in order. The triggers follow the authoring
//! convention of the source posts (a narrated step followed by a
//! screenshot) and are kept exactly as they are.
//!
//! # Paragraph mode (no images)
//!
//! The body is split on blank lines (`"\n\n"`); each non-empty trimmed
//! group becomes a [`ContentBlock::LineBreakParagraph`] that keeps its
//! internal line breaks. When images exist but the body is blank, the
//! images are emitted on their own.
//!
//! Carriage returns are normalized away before either mode runs.

use serde::Serialize;

use crate::markup::parse_markup;
use crate::models::Document;

/// Line prefixes that signal the preceding text introduces an image.
const IMAGE_LEAD_PREFIXES: [&str; 3] = ["Output", "Analysis", "Prompt"];

/// One renderable unit of a post's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Paragraph { text: String },
    LineBreakParagraph { lines: Vec<String> },
    Image { src: String },
    Link { url: String, text: String },
    File { url: String },
}

/// Lay out body text and images as an ordered block sequence.
///
/// Links and files are not handled here; see [`render_document`].
pub fn assemble_layout(body: Option<&str>, images: &[String]) -> Vec<ContentBlock> {
    let body = body.map(normalize_newlines).unwrap_or_default();
    let has_body = !body.trim().is_empty();

    if !images.is_empty() && has_body {
        interleave(&body, images)
    } else if !images.is_empty() {
        image_blocks(images)
    } else {
        paragraphs(&body)
    }
}

/// Full block sequence for a post: laid-out body and images, then one block
/// per link, then one block per file.
///
/// Unparseable markup contributes no media; the body is still laid out.
pub fn render_document(doc: &Document) -> Vec<ContentBlock> {
    let media = parse_markup(doc.markup_content.as_deref());
    let mut blocks = assemble_layout(doc.body(), &media.images);

    blocks.extend(media.links.into_iter().map(|link| ContentBlock::Link {
        text: link.text.unwrap_or_else(|| link.url.clone()),
        url: link.url,
    }));
    blocks.extend(
        media
            .files
            .into_iter()
            .map(|url| ContentBlock::File { url }),
    );
    blocks
}

fn interleave(body: &str, images: &[String]) -> Vec<ContentBlock> {
    let lines: Vec<&str> = body.split('\n').collect();

    let (mut blocks, remaining) = lines.iter().enumerate().fold(
        (Vec::new(), images),
        |(mut blocks, remaining), (i, line)| {
            let current = line.trim();
            if !current.is_empty() {
                blocks.push(ContentBlock::Paragraph {
                    text: line.to_string(),
                });
            }

            let next = lines.get(i + 1).map(|l| l.trim());
            let triggered = next.is_some_and(introduces_image) || current.ends_with(':');

            match remaining.split_first() {
                Some((src, rest)) if triggered => {
                    blocks.push(ContentBlock::Image { src: src.clone() });
                    (blocks, rest)
                }
                _ => (blocks, remaining),
            }
        },
    );

    blocks.extend(image_blocks(remaining));
    blocks
}

fn introduces_image(next: &str) -> bool {
    next.is_empty() || IMAGE_LEAD_PREFIXES.iter().any(|p| next.starts_with(p))
}

fn image_blocks(images: &[String]) -> Vec<ContentBlock> {
    images
        .iter()
        .map(|src| ContentBlock::Image { src: src.clone() })
        .collect()
}

fn paragraphs(body: &str) -> Vec<ContentBlock> {
    body.split("\n\n")
        .map(str::trim)
        .filter(|group| !group.is_empty())
        .map(|group| ContentBlock::LineBreakParagraph {
            lines: group.split('\n').map(str::to_string).collect(),
        })
        .collect()
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Facets;

    fn imgs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn p(text: &str) -> ContentBlock {
        ContentBlock::Paragraph {
            text: text.to_string(),
        }
    }

    fn img(src: &str) -> ContentBlock {
        ContentBlock::Image {
            src: src.to_string(),
        }
    }

    #[test]
    fn test_colon_line_places_image() {
        let blocks = assemble_layout(Some("Step one:\nStep two"), &imgs(&["img1.png"]));
        assert_eq!(blocks, vec![p("Step one:"), img("img1.png"), p("Step two")]);
    }

    #[test]
    fn test_blank_next_line_places_image() {
        let blocks = assemble_layout(Some("Intro\n\nMore"), &imgs(&["a", "b"]));
        // "Intro" is followed by a blank line; the blank line itself is not.
        assert_eq!(blocks, vec![p("Intro"), img("a"), p("More"), img("b")]);
    }

    #[test]
    fn test_keyword_next_lines_place_images() {
        let body = "Ran the model\nOutput shown below\nThen\nAnalysis follows\nAnd\nPrompt text";
        let blocks = assemble_layout(Some(body), &imgs(&["1", "2", "3"]));
        assert_eq!(
            blocks,
            vec![
                p("Ran the model"),
                img("1"),
                p("Output shown below"),
                p("Then"),
                img("2"),
                p("Analysis follows"),
                p("And"),
                img("3"),
                p("Prompt text"),
            ]
        );
    }

    #[test]
    fn test_prefix_match_is_case_sensitive() {
        let blocks = assemble_layout(Some("a\noutput\nb"), &imgs(&["x"]));
        assert_eq!(blocks, vec![p("a"), p("output"), p("b"), img("x")]);
    }

    #[test]
    fn test_consecutive_blank_lines_each_trigger() {
        let blocks = assemble_layout(Some("a\n\n\nb"), &imgs(&["1", "2", "3", "4"]));
        // Only "a" and the first blank line are followed by a blank line.
        assert_eq!(
            blocks,
            vec![p("a"), img("1"), img("2"), p("b"), img("3"), img("4")]
        );
    }

    #[test]
    fn test_trailing_images_appended_in_order() {
        let blocks = assemble_layout(Some("no trigger here"), &imgs(&["a", "b"]));
        assert_eq!(blocks, vec![p("no trigger here"), img("a"), img("b")]);
    }

    #[test]
    fn test_more_triggers_than_images() {
        let blocks = assemble_layout(Some("one:\ntwo:\nthree:"), &imgs(&["a"]));
        assert_eq!(blocks, vec![p("one:"), img("a"), p("two:"), p("three:")]);
    }

    #[test]
    fn test_paragraph_text_keeps_original_spacing() {
        let blocks = assemble_layout(Some("  indented:  \nnext"), &imgs(&["a"]));
        assert_eq!(blocks, vec![p("  indented:  "), img("a"), p("next")]);
    }

    #[test]
    fn test_crlf_body() {
        let blocks = assemble_layout(Some("Step one:\r\nStep two"), &imgs(&["i"]));
        assert_eq!(blocks, vec![p("Step one:"), img("i"), p("Step two")]);
    }

    #[test]
    fn test_paragraph_mode() {
        let blocks = assemble_layout(Some("Para one.\n\nPara two.\nwith break."), &[]);
        assert_eq!(
            blocks,
            vec![
                ContentBlock::LineBreakParagraph {
                    lines: vec!["Para one.".to_string()],
                },
                ContentBlock::LineBreakParagraph {
                    lines: vec!["Para two.".to_string(), "with break.".to_string()],
                },
            ]
        );
    }

    #[test]
    fn test_paragraph_mode_drops_empty_groups() {
        let blocks = assemble_layout(Some("\n\n  \n\nOnly\n\n\n\n"), &[]);
        assert_eq!(
            blocks,
            vec![ContentBlock::LineBreakParagraph {
                lines: vec!["Only".to_string()],
            }]
        );
    }

    #[test]
    fn test_images_with_blank_body() {
        assert_eq!(
            assemble_layout(Some("  \n "), &imgs(&["a", "b"])),
            vec![img("a"), img("b")]
        );
        assert_eq!(assemble_layout(None, &imgs(&["a"])), vec![img("a")]);
    }

    #[test]
    fn test_nothing_yields_no_blocks() {
        assert!(assemble_layout(None, &[]).is_empty());
        assert!(assemble_layout(Some(" \n\n "), &[]).is_empty());
    }

    #[test]
    fn test_idempotent() {
        let images = imgs(&["a", "b"]);
        let body = Some("Look:\nOutput\n\nEnd");
        assert_eq!(assemble_layout(body, &images), assemble_layout(body, &images));
    }

    #[test]
    fn test_render_document_appends_links_then_files() {
        let doc = Document {
            body_text: Some("See this:\nDone".to_string()),
            markup_content: Some(
                "<post><file url='f.pdf'/><image src='s.png'/><link href='http://x'>X site</link><link href='http://y'/></post>"
                    .to_string(),
            ),
            facets: Facets::default(),
            ..Document::default()
        };
        assert_eq!(
            render_document(&doc),
            vec![
                p("See this:"),
                img("s.png"),
                p("Done"),
                ContentBlock::Link {
                    url: "http://x".to_string(),
                    text: "X site".to_string(),
                },
                ContentBlock::Link {
                    url: "http://y".to_string(),
                    text: "http://y".to_string(),
                },
                ContentBlock::File {
                    url: "f.pdf".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_render_document_with_broken_markup_keeps_body() {
        let doc = Document {
            raw_body_text: Some("First.\n\nSecond.".to_string()),
            markup_content: Some("<post><image src='a.png'>".to_string()),
            ..Document::default()
        };
        assert_eq!(
            render_document(&doc),
            vec![
                ContentBlock::LineBreakParagraph {
                    lines: vec!["First.".to_string()],
                },
                ContentBlock::LineBreakParagraph {
                    lines: vec!["Second.".to_string()],
                },
            ]
        );
    }

    #[test]
    fn test_render_document_links_only() {
        let doc = Document {
            markup_content: Some("<p><link href='u'>t</link></p>".to_string()),
            ..Document::default()
        };
        assert_eq!(
            render_document(&doc),
            vec![ContentBlock::Link {
                url: "u".to_string(),
                text: "t".to_string(),
            }]
        );
    }
}
