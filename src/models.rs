//! Data structures and types for the titrari.ro addon
//!
//! Contains all shared models used across the application organized by domain:
//! - **Requests**: media type and parsed Stremio compound ids
//! - **Episodes**: the (season, episode) target for archive extraction
//! - **Candidates**: discovered subtitle offerings and their wire format
//! - **Manifest**: the static Stremio addon manifest

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Request Models
// =============================================================================

/// Media type discriminator from the Stremio resource path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Series,
}

impl MediaType {
    /// Parse the `{type}` path segment; anything unknown is treated as a movie
    pub fn from_path_segment(s: &str) -> Self {
        match s {
            "series" => MediaType::Series,
            _ => MediaType::Movie,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Movie => write!(f, "movie"),
            MediaType::Series => write!(f, "series"),
        }
    }
}

/// Episode a caller wants extracted from a multi-episode archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeTarget {
    pub season: u32,
    pub episode: u32,
}

impl EpisodeTarget {
    /// Build a target from parsed numbers; zero is not a valid season/episode
    pub fn new(season: u32, episode: u32) -> Option<Self> {
        if season == 0 || episode == 0 {
            return None;
        }
        Some(Self { season, episode })
    }
}

impl fmt::Display for EpisodeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{:02}E{:02}", self.season, self.episode)
    }
}

/// A parsed subtitle lookup request
///
/// Stremio encodes requests as `{type}/{imdbId[:season:episode]}.json`;
/// this is the decoded form handed to the lookup service.
#[derive(Debug, Clone)]
pub struct SubtitleRequest {
    pub media_type: MediaType,
    pub imdb_id: String,
    pub target: Option<EpisodeTarget>,
}

impl SubtitleRequest {
    /// Parse a compound id like `tt0903747:1:5` (season/episode optional)
    pub fn parse(media_type: MediaType, compound_id: &str) -> Self {
        let mut parts = compound_id.split(':');
        let imdb_id = parts.next().unwrap_or_default().to_string();
        let season = parts.next().and_then(|s| s.parse().ok());
        let episode = parts.next().and_then(|s| s.parse().ok());

        let target = match (season, episode) {
            (Some(s), Some(e)) => EpisodeTarget::new(s, e),
            _ => None,
        };

        Self {
            media_type,
            imdb_id,
            target,
        }
    }

    /// Numeric IMDb id as titrari.ro expects it (no `tt` prefix)
    pub fn numeric_imdb_id(&self) -> &str {
        self.imdb_id.trim_start_matches("tt")
    }

    /// Cache key for this request; `x` marks an absent season/episode
    pub fn cache_key(&self) -> String {
        let season = self
            .target
            .map(|t| t.season.to_string())
            .unwrap_or_else(|| "x".to_string());
        let episode = self
            .target
            .map(|t| t.episode.to_string())
            .unwrap_or_else(|| "x".to_string());
        format!("{}:{}:{}", self.imdb_id, season, episode)
    }
}

// =============================================================================
// Candidate Models
// =============================================================================

/// One discovered subtitle offering, in the shape Stremio expects
///
/// `url` points at our own proxy endpoint, which lazily downloads the
/// archive and extracts the right member when the player asks for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleCandidate {
    pub id: String,
    #[serde(skip)]
    pub subtitle_id: u64,
    pub lang: String,
    pub url: String,
    pub title: String,
    pub fps: String,
    pub downloads: u32,
}

impl SubtitleCandidate {
    /// Build a candidate and its proxy URL for a given request
    pub fn new(
        subtitle_id: u64,
        title: String,
        fps: Option<String>,
        downloads: u32,
        base_url: &str,
        target: Option<EpisodeTarget>,
    ) -> Self {
        let token = match target {
            Some(t) => format!("{}:{}:{}", subtitle_id, t.season, t.episode),
            None => subtitle_id.to_string(),
        };
        let id = format!("titrari:{}", token);

        Self {
            id,
            subtitle_id,
            lang: "ro".to_string(),
            url: format!("{}/download/{}.srt", base_url.trim_end_matches('/'), token),
            title,
            fps: fps.unwrap_or_else(|| "Auto".to_string()),
            downloads,
        }
    }
}

impl fmt::Display for SubtitleCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} - {}⬇", self.lang, self.title, self.downloads)
    }
}

// =============================================================================
// Manifest
// =============================================================================

/// Static Stremio addon manifest served at /manifest.json
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub id: String,
    pub version: String,
    pub name: String,
    pub description: String,
    pub resources: Vec<String>,
    pub types: Vec<String>,
    pub catalogs: Vec<String>,
    pub id_prefixes: Vec<String>,
    pub logo: String,
}

impl Manifest {
    pub fn new() -> Self {
        Self {
            id: "ro.titrari.stremio".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            name: "Titrari.ro".to_string(),
            description: "Subtitrari in limba romana de pe titrari.ro".to_string(),
            resources: vec!["subtitles".to_string()],
            types: vec!["movie".to_string(), "series".to_string()],
            catalogs: vec![],
            id_prefixes: vec!["tt".to_string()],
            logo: "https://titrari.ro/images/logo.png".to_string(),
        }
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
