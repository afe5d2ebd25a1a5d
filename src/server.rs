//! HTTP boundary: Stremio addon routes
//!
//! Thin request-dispatch layer over the lookup service:
//! - `GET /manifest.json` - static addon manifest
//! - `GET /subtitles/{type}/{imdbId[:season:episode]}.json` - candidate list
//! - `GET /download/{subtitleId[:season:episode]}.srt` - proxy endpoint that
//!   lazily downloads the archive and serves the extracted, decoded text
//! - `GET /` - install landing page

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::{error, info};

use crate::models::{EpisodeTarget, Manifest, MediaType, SubtitleRequest};
use crate::service::SubtitleService;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SubtitleService>,
    pub base_url: String,
}

/// Wire shape of the subtitles resource response
#[derive(Debug, Serialize)]
struct SubtitlesResponse {
    subtitles: Vec<crate::models::SubtitleCandidate>,
}

/// Build the addon router
pub fn router(service: Arc<SubtitleService>, base_url: impl Into<String>) -> Router {
    let state = AppState {
        service,
        base_url: base_url.into(),
    };

    Router::new()
        .route("/", get(landing_page))
        .route("/manifest.json", get(manifest))
        .route("/subtitles/{media_type}/{compound_id}", get(list_subtitles))
        .route("/download/{token}", get(download_subtitle))
        .with_state(state)
}

async fn manifest() -> Json<Manifest> {
    Json(Manifest::new())
}

async fn list_subtitles(
    State(state): State<AppState>,
    Path((media_type, compound_id)): Path<(String, String)>,
) -> Json<SubtitlesResponse> {
    let compound_id = compound_id.trim_end_matches(".json");
    let request = SubtitleRequest::parse(MediaType::from_path_segment(&media_type), compound_id);

    info!(
        media_type = %request.media_type,
        imdb = %request.imdb_id,
        target = ?request.target,
        "subtitle lookup request"
    );

    let subtitles = state.service.find_subtitles(&request).await;
    Json(SubtitlesResponse { subtitles })
}

async fn download_subtitle(State(state): State<AppState>, Path(token): Path<String>) -> Response {
    let token = token.trim_end_matches(".srt");
    let (subtitle_id, target) = match parse_download_token(token) {
        Some(parsed) => parsed,
        None => return StatusCode::NOT_FOUND.into_response(),
    };

    match state.service.resolve_subtitle(subtitle_id, target).await {
        Ok(Some(text)) => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            text,
        )
            .into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            error!(subtitle_id, error = %e, "proxy extraction failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn landing_page(State(state): State<AppState>) -> Html<String> {
    let manifest_url = format!("{}/manifest.json", state.base_url.trim_end_matches('/'));
    let install_url = format!(
        "stremio://{}",
        manifest_url
            .trim_start_matches("https://")
            .trim_start_matches("http://")
    );

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="ro">
<head><meta charset="utf-8"><title>Titrari.ro Stremio Addon</title></head>
<body style="font-family: sans-serif; text-align: center; margin-top: 4em;">
  <h1>Titrari.ro</h1>
  <p>Subtitrari in limba romana de pe titrari.ro</p>
  <p><a href="{install_url}">Instaleaza in Stremio</a></p>
  <p><small>Manifest: <a href="{manifest_url}">{manifest_url}</a></small></p>
</body>
</html>
"#
    ))
}

/// Parse the proxy path token `subtitleId[:season:episode]`
fn parse_download_token(token: &str) -> Option<(u64, Option<EpisodeTarget>)> {
    let mut parts = token.split(':');
    let subtitle_id = parts.next()?.parse().ok()?;
    let season = parts.next().and_then(|s| s.parse().ok());
    let episode = parts.next().and_then(|s| s.parse().ok());

    let target = match (season, episode) {
        (Some(s), Some(e)) => EpisodeTarget::new(s, e),
        _ => None,
    };

    Some((subtitle_id, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_download_token_movie() {
        let (id, target) = parse_download_token("12345").unwrap();
        assert_eq!(id, 12345);
        assert!(target.is_none());
    }

    #[test]
    fn test_parse_download_token_episode() {
        let (id, target) = parse_download_token("12345:2:7").unwrap();
        assert_eq!(id, 12345);
        let target = target.unwrap();
        assert_eq!(target.season, 2);
        assert_eq!(target.episode, 7);
    }

    #[test]
    fn test_parse_download_token_garbage() {
        assert!(parse_download_token("not-a-number").is_none());
        assert!(parse_download_token("").is_none());
    }

    #[test]
    fn test_parse_download_token_zero_episode_means_no_target() {
        let (_, target) = parse_download_token("5:0:0").unwrap();
        assert!(target.is_none());
    }
}
