//! Media reference extraction from post markup bodies.
//!
//! The markup body is an XML-like element tree. Three element kinds are
//! recognized (tag names compared case-insensitively, namespace prefixes
//! ignored):
//!
//! | Element | Attribute | Contributes |
//! |---------|-----------|-------------|
//! | `image` | `src`     | image source, if non-empty |
//! | `file`  | `url`     | file URL, if non-empty |
//! | `link`  | `href`    | link URL plus the element's flattened text |
//!
//! Every other element is an inert container: it is descended into but not
//! interpreted. References are reported in document (pre-order) order and
//! duplicates are kept.
//!
//! Extraction is all-or-nothing. Input that is not a single well-formed
//! element tree yields [`MediaRefs::default`]; the failure never reaches the
//! caller. Two HTML habits are tolerated: named entities such as `&nbsp;`
//! (unknown names expand to nothing) and unclosed void elements such as
//! `<br>`.

use quick_xml::escape::resolve_html5_entity;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use thiserror::Error;

/// A `link` element found in markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRef {
    pub url: String,
    /// Flattened, trimmed text content; `None` when the element has none.
    pub text: Option<String>,
}

/// A single extracted reference, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MediaReference {
    Image { src: String },
    File { url: String },
    Link { url: String, text: Option<String> },
}

/// References extracted from one markup body, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MediaRefs {
    pub images: Vec<String>,
    pub files: Vec<String>,
    pub links: Vec<LinkRef>,
}

impl MediaRefs {
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.files.is_empty() && self.links.is_empty()
    }

    /// Links followed by files, as tagged references.
    pub fn trailing_references(&self) -> Vec<MediaReference> {
        self.links
            .iter()
            .map(|l| MediaReference::Link {
                url: l.url.clone(),
                text: l.text.clone(),
            })
            .chain(
                self.files
                    .iter()
                    .map(|url| MediaReference::File { url: url.clone() }),
            )
            .collect()
    }
}

#[derive(Debug, Error)]
enum MarkupError {
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
    #[error(transparent)]
    Attr(#[from] quick_xml::events::attributes::AttrError),
    #[error("text outside the root element")]
    StrayText,
    #[error("closing tag does not match the open element")]
    MismatchedEnd,
    #[error("more than one root element")]
    MultipleRoots,
    #[error("unexpected closing tag")]
    UnbalancedEnd,
    #[error("{0} element(s) left open at end of input")]
    Unclosed(usize),
    #[error("no root element")]
    NoRoot,
}

/// HTML elements that never take a closing tag.
///
/// `link` is left out: here it is a container whose text is the display text.
const VOID_ELEMENTS: [&str; 13] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "meta", "param", "source", "track",
    "wbr",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Image,
    File,
    Link,
    Other,
}

impl Kind {
    fn of(start: &BytesStart<'_>) -> Self {
        let name = start.local_name();
        let name = name.as_ref();
        if name.eq_ignore_ascii_case(b"image") {
            Kind::Image
        } else if name.eq_ignore_ascii_case(b"file") {
            Kind::File
        } else if name.eq_ignore_ascii_case(b"link") {
            Kind::Link
        } else {
            Kind::Other
        }
    }
}

/// Extract image, file and link references from a markup body.
///
/// Blank or absent input returns the empty result immediately. Malformed
/// input is logged at debug level and also returns the empty result.
pub fn parse_markup(markup: Option<&str>) -> MediaRefs {
    let markup = match markup {
        Some(m) if !m.trim().is_empty() => m,
        _ => return MediaRefs::default(),
    };

    match extract(markup) {
        Ok(refs) => refs,
        Err(e) => {
            tracing::debug!(error = %e, "markup could not be parsed; no media extracted");
            MediaRefs::default()
        }
    }
}

/// An element still waiting for its closing tag.
struct OpenElement {
    /// Lower-cased local name.
    name: Vec<u8>,
    /// Index into `MediaRefs::links` when this is a link collecting text.
    link: Option<usize>,
}

fn extract(markup: &str) -> Result<MediaRefs, MarkupError> {
    let mut reader = Reader::from_str(markup);
    let config = reader.config_mut();
    config.trim_text(false);
    // End tags are matched against `open` below so void elements can be
    // skipped.
    config.check_end_names = false;

    let mut refs = MediaRefs::default();
    let mut open: Vec<OpenElement> = Vec::new();
    let mut link_text: Vec<String> = Vec::new();
    let mut seen_root = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                enter_root(open.is_empty(), &mut seen_root)?;
                let name = lower_local_name(&e);
                let link = visit(&e, &mut refs)?;
                if is_void(&name) {
                    continue;
                }
                if link.is_some() {
                    link_text.push(String::new());
                }
                open.push(OpenElement { name, link });
            }
            Event::Empty(e) => {
                enter_root(open.is_empty(), &mut seen_root)?;
                visit(&e, &mut refs)?;
            }
            Event::End(e) => {
                let name = lower_end_name(&e);
                if is_void(&name) {
                    continue;
                }
                let element = open.pop().ok_or(MarkupError::UnbalancedEnd)?;
                if element.name != name {
                    return Err(MarkupError::MismatchedEnd);
                }
                if let Some(idx) = element.link {
                    let text = link_text.pop().unwrap_or_default();
                    let text = text.trim();
                    if !text.is_empty() {
                        refs.links[idx].text = Some(text.to_string());
                    }
                }
            }
            Event::Text(t) => {
                let text = t.unescape_with(resolve_entity)?;
                if open.is_empty() {
                    if !text.trim().is_empty() {
                        return Err(MarkupError::StrayText);
                    }
                } else {
                    append_link_text(&mut link_text, &text);
                }
            }
            Event::CData(c) => {
                if open.is_empty() {
                    return Err(MarkupError::StrayText);
                }
                let bytes = c.into_inner();
                append_link_text(&mut link_text, &String::from_utf8_lossy(&bytes));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !open.is_empty() {
        return Err(MarkupError::Unclosed(open.len()));
    }
    if !seen_root {
        return Err(MarkupError::NoRoot);
    }
    Ok(refs)
}

/// Marks the root as seen when an element starts at the top level; a second
/// top-level element is an error.
fn enter_root(at_top: bool, seen_root: &mut bool) -> Result<(), MarkupError> {
    if at_top {
        if *seen_root {
            return Err(MarkupError::MultipleRoots);
        }
        *seen_root = true;
    }
    Ok(())
}

fn lower_local_name(e: &BytesStart<'_>) -> Vec<u8> {
    e.local_name().as_ref().to_ascii_lowercase()
}

fn lower_end_name(e: &BytesEnd<'_>) -> Vec<u8> {
    e.local_name().as_ref().to_ascii_lowercase()
}

fn is_void(name: &[u8]) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.as_bytes() == name)
}

/// XML and HTML named entities; unknown names expand to nothing.
fn resolve_entity(name: &str) -> Option<&'static str> {
    Some(resolve_html5_entity(name).unwrap_or(""))
}

/// Record the reference carried by one element. Returns the link index when
/// the element is a link whose text should be collected.
fn visit(e: &BytesStart<'_>, refs: &mut MediaRefs) -> Result<Option<usize>, MarkupError> {
    match Kind::of(e) {
        Kind::Image => {
            if let Some(src) = non_empty_attr(e, "src")? {
                refs.images.push(src);
            }
            Ok(None)
        }
        Kind::File => {
            if let Some(url) = non_empty_attr(e, "url")? {
                refs.files.push(url);
            }
            Ok(None)
        }
        Kind::Link => match attr(e, "href")? {
            Some(url) => {
                refs.links.push(LinkRef {
                    url,
                    text: None,
                });
                Ok(Some(refs.links.len() - 1))
            }
            None => Ok(None),
        },
        Kind::Other => Ok(None),
    }
}

fn attr(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, MarkupError> {
    match e.try_get_attribute(name)? {
        Some(a) => Ok(Some(a.unescape_value_with(resolve_entity)?.into_owned())),
        None => Ok(None),
    }
}

fn non_empty_attr(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, MarkupError> {
    Ok(attr(e, name)?.filter(|v| !v.is_empty()))
}

/// Text inside nested links belongs to every enclosing link.
fn append_link_text(link_text: &mut [String], text: &str) {
    for buf in link_text.iter_mut() {
        buf.push_str(text);
    }
}
