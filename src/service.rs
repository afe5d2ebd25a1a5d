//! Subtitle lookup service
//!
//! The per-request flow behind the Stremio subtitles resource: check the
//! result cache, search titrari.ro, filter series rows down to the right
//! episode, rank by popularity and cache the outcome. Season packs whose
//! row text only names the season are verified by downloading the archive
//! and running it through the resolver before they are accepted.
//!
//! Rows are verified one at a time; failures of any single row are logged
//! and swallowed so one broken archive never empties the whole result.

use std::time::Duration;

use anyhow::{Context, Result};
use regex::RegexBuilder;
use tracing::{debug, info, warn};

use crate::api::{SearchRow, TitrariClient};
use crate::cache::TtlCache;
use crate::extract;
use crate::models::{EpisodeTarget, MediaType, SubtitleCandidate, SubtitleRequest};

/// Search results are reused for half an hour
const RESULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Download URLs must outlive the result TTL; players fetch the proxy URL
/// long after the lookup that produced it
const URL_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Orchestrates search, episode filtering, ranking and caching
pub struct SubtitleService {
    client: TitrariClient,
    base_url: String,
    results: TtlCache<Vec<SubtitleCandidate>>,
    download_urls: TtlCache<String>,
}

impl SubtitleService {
    /// Create a service; `base_url` is the externally reachable address
    /// used to build proxy URLs handed back to the player
    pub fn new(client: TitrariClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            results: TtlCache::new(RESULT_TTL),
            download_urls: TtlCache::new(URL_TTL),
        }
    }

    /// Find subtitle candidates for a request, best first
    ///
    /// Never fails: an unreachable upstream yields an empty list.
    pub async fn find_subtitles(&self, request: &SubtitleRequest) -> Vec<SubtitleCandidate> {
        let key = request.cache_key();
        if let Some(cached) = self.results.get(&key) {
            debug!(key = %key, "result cache hit");
            return cached;
        }

        let rows = match self.client.search(request.numeric_imdb_id()).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(imdb = %request.imdb_id, error = %e, "search failed");
                return Vec::new();
            }
        };

        let mut candidates = Vec::new();
        for row in &rows {
            if let Some(candidate) = self.evaluate_row(row, request).await {
                candidates.push(candidate);
            }
        }

        // popularity ranking; stable sort keeps discovery order on ties
        candidates.sort_by(|a, b| b.downloads.cmp(&a.downloads));

        info!(
            imdb = %request.imdb_id,
            found = rows.len(),
            accepted = candidates.len(),
            "subtitle lookup complete"
        );

        self.results.put(key, candidates.clone());
        candidates
    }

    /// Resolve a previously discovered subtitle id into decoded text
    ///
    /// `Ok(None)` means "not found" (unknown or expired id, or no matching
    /// member in the archive); `Err` is an unexpected download failure.
    pub async fn resolve_subtitle(
        &self,
        subtitle_id: u64,
        target: Option<EpisodeTarget>,
    ) -> Result<Option<String>> {
        let url = match self.download_urls.get(&subtitle_id.to_string()) {
            Some(url) => url,
            None => {
                debug!(subtitle_id, "unknown subtitle id at proxy endpoint");
                return Ok(None);
            }
        };

        let blob = self
            .client
            .download(&url)
            .await
            .context("subtitle archive download failed")?;

        Ok(extract::resolve(&blob, target))
    }

    /// Decide whether a search row is acceptable for this request
    async fn evaluate_row(
        &self,
        row: &SearchRow,
        request: &SubtitleRequest,
    ) -> Option<SubtitleCandidate> {
        if request.media_type == MediaType::Series {
            if let Some(target) = request.target {
                let text = match &row.title {
                    Some(title) => format!("{} {}", title, row.matchable_text),
                    None => row.matchable_text.clone(),
                };

                if !mentions_exact_episode(&text, target) {
                    if !mentions_season(&text, target.season) {
                        debug!(subtitle_id = row.subtitle_id, %target, "row names neither episode nor season");
                        return None;
                    }

                    // season pack: download and check the episode is inside
                    debug!(subtitle_id = row.subtitle_id, %target, "verifying season pack");
                    let blob = match self.client.download(&row.download_url).await {
                        Ok(blob) => blob,
                        Err(e) => {
                            // verification download failed; drop the row
                            warn!(subtitle_id = row.subtitle_id, error = %e, "verification download failed, dropping row");
                            return None;
                        }
                    };
                    if extract::resolve(&blob, Some(target)).is_none() {
                        debug!(subtitle_id = row.subtitle_id, %target, "episode not in archive");
                        return None;
                    }
                }
            }
        }

        self.download_urls
            .put(row.subtitle_id.to_string(), row.download_url.clone());

        let title = row
            .title
            .clone()
            .unwrap_or_else(|| format!("Titrari.ro - {}", request.imdb_id));

        Some(SubtitleCandidate::new(
            row.subtitle_id,
            title,
            row.fps.clone(),
            row.downloads,
            &self.base_url,
            request.target,
        ))
    }
}

/// Does the row text carry an exact `SxxEyy`-style marker for the target?
fn mentions_exact_episode(text: &str, target: EpisodeTarget) -> bool {
    let EpisodeTarget { season, episode } = target;
    let specs = [
        format!(r"S0*{season}E0*{episode}([^0-9]|$)"),
        format!(r"S0*{season}\.E0*{episode}"),
        format!(r"{season}x0*{episode}([^0-9]|$)"),
    ];
    any_matches(&specs, text)
}

/// Does the row text name the target season (a season pack)?
fn mentions_season(text: &str, season: u32) -> bool {
    let specs = [
        format!(r"Sezon[ul\s]*0*{season}([^0-9]|$)"),
        format!(r"Season\s*0*{season}([^0-9]|$)"),
        format!(r"S0*{season}([^0-9E]|$)"),
    ];
    any_matches(&specs, text)
}

fn any_matches(specs: &[String], text: &str) -> bool {
    specs
        .iter()
        .filter_map(|spec| {
            RegexBuilder::new(spec)
                .case_insensitive(true)
                .build()
                .ok()
        })
        .any(|re| re.is_match(text))
}
