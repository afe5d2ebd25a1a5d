//! Subtitle Lookup Service Tests
//!
//! Full lookup flows against a mocked titrari.ro: episode filtering,
//! season-pack verification, ranking, caching and the proxy resolve path.

use std::io::{Cursor, Write};

use mockito::{Matcher, Server, ServerGuard};
use titrari_addon::api::TitrariClient;
use titrari_addon::models::{EpisodeTarget, MediaType, SubtitleRequest};
use titrari_addon::service::SubtitleService;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const ADDON_BASE: &str = "http://addon.local:7000";

fn build_zip(members: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, content) in members {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Render a search results page with (id, title, downloads) rows
fn search_page(rows: &[(u64, &str, u32)]) -> String {
    let mut html = String::from("<html><body><table>");
    for (id, title, downloads) in rows {
        html.push_str(&format!(
            r#"<tr class="row1">
                <td><h1><a style="color:black" href="details.php?id={id}">{title}</a></h1></td>
                <td>Descarcari: {downloads}</td>
                <td><a href="get.php?id={id}">Descarca</a></td>
            </tr>"#
        ));
    }
    html.push_str("</table></body></html>");
    html
}

fn service_for(server: &ServerGuard) -> SubtitleService {
    SubtitleService::new(TitrariClient::with_base_url(server.url()), ADDON_BASE)
}

async fn mock_search(server: &mut ServerGuard, page: &str) -> mockito::Mock {
    server
        .mock("GET", Matcher::Regex(r"^/index\.php".to_string()))
        .with_status(200)
        .with_body(page)
        .create_async()
        .await
}

// =============================================================================
// Movie Lookups
// =============================================================================

#[tokio::test]
async fn test_movie_lookup_accepts_rows_without_downloading() {
    let mut server = Server::new_async().await;
    mock_search(&mut server, &search_page(&[(100, "Some Movie (2020)", 40)])).await;
    let download = server
        .mock("GET", "/get.php?id=100")
        .expect(0)
        .create_async()
        .await;

    let service = service_for(&server);
    let request = SubtitleRequest::parse(MediaType::Movie, "tt1877830");
    let candidates = service.find_subtitles(&request).await;

    download.assert_async().await;
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].id, "titrari:100");
    assert_eq!(candidates[0].lang, "ro");
    assert_eq!(candidates[0].url, format!("{ADDON_BASE}/download/100.srt"));
}

#[tokio::test]
async fn test_unreachable_site_yields_empty_list() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", Matcher::Regex(r"^/index\.php".to_string()))
        .with_status(503)
        .create_async()
        .await;

    let service = service_for(&server);
    let request = SubtitleRequest::parse(MediaType::Movie, "tt1877830");
    assert!(service.find_subtitles(&request).await.is_empty());
}

// =============================================================================
// Series Episode Filtering
// =============================================================================

#[tokio::test]
async fn test_exact_episode_marker_accepted_without_download() {
    let mut server = Server::new_async().await;
    mock_search(&mut server, &search_page(&[(200, "Show S01E05 rosub", 10)])).await;
    let download = server
        .mock("GET", "/get.php?id=200")
        .expect(0)
        .create_async()
        .await;

    let service = service_for(&server);
    let request = SubtitleRequest::parse(MediaType::Series, "tt0903747:1:5");
    let candidates = service.find_subtitles(&request).await;

    download.assert_async().await;
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].id, "titrari:200:1:5");
    assert_eq!(candidates[0].url, format!("{ADDON_BASE}/download/200:1:5.srt"));
}

#[tokio::test]
async fn test_season_pack_verified_by_downloading() {
    let mut server = Server::new_async().await;
    mock_search(&mut server, &search_page(&[(300, "Show - Sezonul 1", 5)])).await;
    let zip = build_zip(&[
        ("Show.S01E04.srt", "patru".as_bytes()),
        ("Show.S01E05.srt", "cinci".as_bytes()),
    ]);
    let download = server
        .mock("GET", "/get.php?id=300")
        .with_status(200)
        .with_body(zip)
        .create_async()
        .await;

    let service = service_for(&server);
    let request = SubtitleRequest::parse(MediaType::Series, "tt0903747:1:5");
    let candidates = service.find_subtitles(&request).await;

    download.assert_async().await;
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].id, "titrari:300:1:5");
}

#[tokio::test]
async fn test_season_pack_without_subtitles_is_dropped() {
    let mut server = Server::new_async().await;
    mock_search(&mut server, &search_page(&[(310, "Show - Sezonul 1", 5)])).await;
    let zip = build_zip(&[("readme.txt", b"no subtitles inside".as_slice())]);
    server
        .mock("GET", "/get.php?id=310")
        .with_status(200)
        .with_body(zip)
        .create_async()
        .await;

    let service = service_for(&server);
    let request = SubtitleRequest::parse(MediaType::Series, "tt0903747:1:5");
    assert!(service.find_subtitles(&request).await.is_empty());
}

#[tokio::test]
async fn test_drops_season_pack_when_verification_download_fails() {
    let mut server = Server::new_async().await;
    mock_search(&mut server, &search_page(&[(400, "Show Sezonul 2", 3)])).await;
    server
        .mock("GET", "/get.php?id=400")
        .with_status(500)
        .create_async()
        .await;

    let service = service_for(&server);
    let request = SubtitleRequest::parse(MediaType::Series, "tt0903747:2:1");
    assert!(service.find_subtitles(&request).await.is_empty());
}

#[tokio::test]
async fn test_row_naming_neither_episode_nor_season_is_dropped() {
    let mut server = Server::new_async().await;
    mock_search(&mut server, &search_page(&[(500, "Complete collection", 3)])).await;
    let download = server
        .mock("GET", "/get.php?id=500")
        .expect(0)
        .create_async()
        .await;

    let service = service_for(&server);
    let request = SubtitleRequest::parse(MediaType::Series, "tt0903747:2:1");
    assert!(service.find_subtitles(&request).await.is_empty());
    download.assert_async().await;
}

#[tokio::test]
async fn test_series_without_episode_skips_filtering() {
    let mut server = Server::new_async().await;
    mock_search(&mut server, &search_page(&[(600, "Complete collection", 3)])).await;

    let service = service_for(&server);
    let request = SubtitleRequest::parse(MediaType::Series, "tt0903747");
    assert_eq!(service.find_subtitles(&request).await.len(), 1);
}

// =============================================================================
// Ranking and Caching
// =============================================================================

#[tokio::test]
async fn test_candidates_ranked_by_downloads() {
    let mut server = Server::new_async().await;
    mock_search(
        &mut server,
        &search_page(&[(700, "Less popular", 5), (701, "More popular", 500)]),
    )
    .await;

    let service = service_for(&server);
    let request = SubtitleRequest::parse(MediaType::Movie, "tt1877830");
    let candidates = service.find_subtitles(&request).await;

    assert_eq!(candidates[0].id, "titrari:701");
    assert_eq!(candidates[1].id, "titrari:700");
}

#[tokio::test]
async fn test_repeat_lookup_is_served_from_cache() {
    let mut server = Server::new_async().await;
    let search = mock_search(&mut server, &search_page(&[(800, "Some Movie", 40)])).await;

    let service = service_for(&server);
    let request = SubtitleRequest::parse(MediaType::Movie, "tt1877830");

    let first = service.find_subtitles(&request).await;
    let second = service.find_subtitles(&request).await;

    // single upstream hit despite two lookups
    search.assert_async().await;
    assert_eq!(first.len(), second.len());
    assert_eq!(first[0].id, second[0].id);
}

// =============================================================================
// Proxy Resolve Path
// =============================================================================

#[tokio::test]
async fn test_resolve_after_lookup_extracts_subtitle_text() {
    let mut server = Server::new_async().await;
    mock_search(&mut server, &search_page(&[(900, "Some Movie", 40)])).await;
    let zip = build_zip(&[("Some.Movie.srt", "Bună seara".as_bytes())]);
    server
        .mock("GET", "/get.php?id=900")
        .with_status(200)
        .with_body(zip)
        .create_async()
        .await;

    let service = service_for(&server);
    let request = SubtitleRequest::parse(MediaType::Movie, "tt1877830");
    service.find_subtitles(&request).await;

    let text = service.resolve_subtitle(900, None).await.unwrap();
    assert_eq!(text.as_deref(), Some("Bună seara"));
}

#[tokio::test]
async fn test_resolve_unknown_id_is_not_found() {
    let server = Server::new_async().await;
    let service = service_for(&server);
    let resolved = service.resolve_subtitle(424242, None).await.unwrap();
    assert!(resolved.is_none());
}

#[tokio::test]
async fn test_resolve_download_failure_is_an_error() {
    let mut server = Server::new_async().await;
    mock_search(&mut server, &search_page(&[(950, "Some Movie", 40)])).await;
    server
        .mock("GET", "/get.php?id=950")
        .with_status(500)
        .create_async()
        .await;

    let service = service_for(&server);
    let request = SubtitleRequest::parse(MediaType::Movie, "tt1877830");
    service.find_subtitles(&request).await;

    assert!(service.resolve_subtitle(950, None).await.is_err());
}

#[tokio::test]
async fn test_resolve_picks_episode_from_season_pack() {
    let mut server = Server::new_async().await;
    mock_search(&mut server, &search_page(&[(960, "Show Sezonul 1", 9)])).await;
    let zip = build_zip(&[
        ("Show.S01E01.srt", "unu".as_bytes()),
        ("Show.S01E02.srt", "doi".as_bytes()),
    ]);
    // hit twice: once for verification, once at resolve time
    server
        .mock("GET", "/get.php?id=960")
        .with_status(200)
        .with_body(zip)
        .expect(2)
        .create_async()
        .await;

    let service = service_for(&server);
    let request = SubtitleRequest::parse(MediaType::Series, "tt0903747:1:2");
    let candidates = service.find_subtitles(&request).await;
    assert_eq!(candidates.len(), 1);

    let target = EpisodeTarget::new(1, 2);
    let text = service.resolve_subtitle(960, target).await.unwrap().unwrap();
    assert!(text.contains("doi"));
    assert!(!text.contains("unu"));
}
