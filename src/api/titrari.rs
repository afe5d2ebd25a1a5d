//! titrari.ro search client
//!
//! Scrapes the titrari.ro search results page. The site has no API; each
//! result row carries a `get.php?id=N` download link plus free text with
//! the title, framerate and download count. The markup is brittle by
//! nature, so parsing is defensive: rows that cannot be understood are
//! skipped rather than failing the whole search.

use std::time::Duration;

use anyhow::Result;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::debug;

/// titrari.ro client error types
#[derive(Error, Debug)]
pub enum TitrariError {
    #[error("titrari.ro returned HTTP {0}")]
    ServerError(u16),

    #[error("request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

/// One raw result row from the search page, before episode filtering
#[derive(Debug, Clone)]
pub struct SearchRow {
    /// Site-assigned numeric id, parsed from the download link
    pub subtitle_id: u64,
    /// Absolute download URL for the archive
    pub download_url: String,
    /// Display title, when the row has one
    pub title: Option<String>,
    /// Full row text, used for episode/season pattern matching
    pub matchable_text: String,
    pub fps: Option<String>,
    pub downloads: u32,
}

/// titrari.ro scraping client
pub struct TitrariClient {
    base_url: String,
    client: reqwest::Client,
}

impl TitrariClient {
    /// Create a client against the real site
    pub fn new() -> Self {
        Self::with_base_url("https://titrari.ro")
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        use reqwest::header::{HeaderMap, HeaderValue};

        // browser-like headers; the site serves bots a different page
        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            HeaderValue::from_static(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
            ),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("ro-RO,ro;q=0.9,en;q=0.8"),
        );
        headers.insert(
            reqwest::header::REFERER,
            HeaderValue::from_static("https://titrari.ro/"),
        );

        Self {
            base_url: base_url.into(),
            client: reqwest::Client::builder()
                .default_headers(headers)
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Search by numeric IMDb id (no `tt` prefix) and parse the result rows
    pub async fn search(&self, numeric_imdb_id: &str) -> Result<Vec<SearchRow>> {
        let url = format!(
            "{}/index.php?page=numaicautamcaneiesepenas&z7=&z2=&z5={}&z3=-1&z4=-1&z8=1&z9=All&z11=0&z6=0",
            self.base_url, numeric_imdb_id
        );

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(15))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TitrariError::ServerError(status.as_u16()).into());
        }

        let html = response.text().await?;
        let rows = parse_search_page(&html, &self.base_url);
        debug!(imdb = numeric_imdb_id, rows = rows.len(), "parsed search page");
        Ok(rows)
    }

    /// Download an archive (or bare subtitle file) as raw bytes
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TitrariError::ServerError(status.as_u16()).into());
        }

        Ok(response.bytes().await?.to_vec())
    }
}

impl Default for TitrariClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract result rows from the search page markup
///
/// Anchors on the `get.php?id=` download links and climbs to the enclosing
/// table row for the title and free text. Kept synchronous and separate so
/// the non-Send DOM types never live across an await point.
pub fn parse_search_page(html: &str, base_url: &str) -> Vec<SearchRow> {
    let document = Html::parse_document(html);

    let link_selector = match Selector::parse(r#"a[href*="get.php?id="]"#) {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };
    let title_selector = Selector::parse(r#"h1 a, .row1 a[style*="color:black"]"#).ok();
    let h1_selector = Selector::parse("h1").ok();

    let id_re = Regex::new(r"id=(\d+)").ok();
    let fps_re = Regex::new(r"(?i)Framerate[:\s]*([0-9.]+)\s*FPS").ok();
    let downloads_re = Regex::new(r"(?i)Descarcari[:\s]*(\d+)").ok();

    let mut rows = Vec::new();

    for link in document.select(&link_selector) {
        let href = match link.value().attr("href") {
            Some(href) => href,
            None => continue,
        };

        let subtitle_id = match id_re
            .as_ref()
            .and_then(|re| re.captures(href))
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u64>().ok())
        {
            Some(id) => id,
            None => continue,
        };

        let row = link
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "tr");

        let row_text = row
            .map(|tr| tr.text().collect::<Vec<_>>().join(" "))
            .unwrap_or_default();

        let title = row.and_then(|tr| {
            let from_links = title_selector.as_ref().and_then(|sel| {
                tr.select(sel)
                    .map(|el| el.text().collect::<String>().trim().to_string())
                    .find(|text| text.len() > 3)
            });
            from_links.or_else(|| {
                h1_selector.as_ref().and_then(|sel| {
                    tr.select(sel)
                        .map(|el| el.text().collect::<String>().trim().to_string())
                        .find(|text| !text.is_empty())
                })
            })
        });

        let fps = fps_re
            .as_ref()
            .and_then(|re| re.captures(&row_text))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());

        let downloads = downloads_re
            .as_ref()
            .and_then(|re| re.captures(&row_text))
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);

        rows.push(SearchRow {
            subtitle_id,
            download_url: absolutize(href, base_url),
            title,
            matchable_text: row_text,
            fps,
            downloads,
        });
    }

    rows
}

/// Resolve a possibly-relative download link against the site base
fn absolutize(href: &str, base_url: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            href.trim_start_matches('/')
        )
    }
}
