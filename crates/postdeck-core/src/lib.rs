//! # Postdeck Core
//!
//! Pure, synchronous logic for Postdeck: the post data model, the corpus
//! store, faceted filtering, markup media extraction, and content layout.
//!
//! This crate contains no tokio, network, or filesystem dependencies.
//! Callers acquire corpus text themselves and hand it to
//! [`corpus::CorpusStore::load_text`]; everything downstream of that is a
//! pure function over immutable inputs.
//!
//! ```text
//! corpus text ──▶ CorpusStore ──▶ filter(criteria) ──▶ visible posts
//!                      │
//!                      └─▶ selected post ──▶ parse_markup ──▶ assemble_layout ──▶ blocks
//! ```

pub mod corpus;
pub mod filter;
pub mod layout;
pub mod markup;
pub mod models;
