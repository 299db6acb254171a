//! # Postdeck
//!
//! Browse a corpus of authored posts, narrow it with text and facet filters,
//! and read a single post reconstructed from its markup body and media.
//!
//! The pure logic (corpus store, filter engine, markup parser, layout
//! assembler) lives in [`postdeck_core`]. This crate adds acquisition,
//! configuration, and two presentation surfaces: the `postdeck` CLI and a
//! JSON HTTP API.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌──────────────────┐
//! │ Acquisition │──▶│ CorpusStore  │──▶│ filter(criteria) │──▶ listing
//! │ file / URL  │   │ + TagUniverse│   └──────────────────┘
//! └─────────────┘   └──────┬───────┘
//!                          ▼
//!              parse_markup ─▶ assemble_layout ─▶ blocks ─▶ CLI / HTTP
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! postdeck --corpus posts.jsonl list --model gpt_4 --title prompt
//! postdeck --corpus posts.jsonl tags
//! postdeck --corpus posts.jsonl show 3
//! postdeck --config ./config/postdeck.toml serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`acquire`] | Corpus acquisition from files and URLs |
//! | [`view`] | Display shapes shared by CLI and HTTP |
//! | [`list`] | Filtered listing |
//! | [`tags`] | Tag universe listing |
//! | [`show`] | Single post rendering |
//! | [`server`] | JSON HTTP API |
//! | [`logging`] | Tracing subscriber setup |

pub mod acquire;
pub mod config;
pub mod list;
pub mod logging;
pub mod server;
pub mod show;
pub mod tags;
pub mod view;
