//! titrari-addon - Stremio subtitle addon for titrari.ro
//!
//! Discovers Romanian subtitles on titrari.ro by IMDb id and serves them
//! to Stremio as ready-to-use UTF-8 text. Subtitles on the site arrive as
//! ZIP/RAR archives in legacy encodings, often as whole-season packs; the
//! addon downloads, extracts the right episode and normalizes the text.
//!
//! # Modules
//!
//! - `models` - request/response types and the addon manifest
//! - `api` - titrari.ro scraping client
//! - `extract` - archive resolution, episode matching, text decoding
//! - `cache` - TTL cache for results and download URLs
//! - `service` - lookup orchestration
//! - `server` - axum HTTP routes
//! - `cli` - configuration

pub mod api;
pub mod cache;
pub mod cli;
pub mod extract;
pub mod models;
pub mod server;
pub mod service;

pub use models::{EpisodeTarget, Manifest, MediaType, SubtitleCandidate, SubtitleRequest};
pub use service::SubtitleService;
