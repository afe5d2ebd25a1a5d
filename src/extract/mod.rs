//! Archive-aware subtitle extraction
//!
//! Downloads from titrari.ro arrive as ZIP or RAR archives, or occasionally
//! as a bare subtitle file. The resolver sniffs the container from the
//! leading bytes, enumerates subtitle members, lets the episode matcher
//! pick one and hands its bytes to the text decoder. Every failure along
//! the way (corrupt container, missing member) resolves to `None`; the
//! caller always gets either text or absence, never an error.

pub mod decode;
pub mod episode;

pub use decode::decode;
pub use episode::{is_subtitle_name, select_episode};

use std::io::{Cursor, Read, Write};

use tracing::{debug, warn};
use unrar::Archive;

use crate::models::EpisodeTarget;

/// Container format detected from a blob's magic number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    PlainText,
    Zip,
    Rar,
}

/// Classify a downloaded blob by its leading bytes
pub fn sniff(blob: &[u8]) -> ContainerKind {
    if blob.starts_with(b"PK") {
        ContainerKind::Zip
    } else if blob.starts_with(b"Rar!") {
        ContainerKind::Rar
    } else {
        ContainerKind::PlainText
    }
}

/// Resolve a downloaded blob into decoded subtitle text
///
/// For archives the member set is filtered to `.srt`/`.sub` names and the
/// episode matcher picks one; plain text is decoded as-is (no episode
/// filtering is possible on a single file).
pub fn resolve(blob: &[u8], target: Option<EpisodeTarget>) -> Option<String> {
    match sniff(blob) {
        ContainerKind::PlainText => {
            debug!(len = blob.len(), "plain subtitle file");
            Some(decode(blob))
        }
        ContainerKind::Zip => {
            debug!(len = blob.len(), "zip archive detected");
            resolve_zip(blob, target)
        }
        ContainerKind::Rar => {
            debug!(len = blob.len(), "rar archive detected");
            resolve_rar(blob, target)
        }
    }
}

fn resolve_zip(blob: &[u8], target: Option<EpisodeTarget>) -> Option<String> {
    let mut archive = match zip::ZipArchive::new(Cursor::new(blob)) {
        Ok(archive) => archive,
        Err(e) => {
            warn!(error = %e, "failed to open zip archive");
            return None;
        }
    };

    // collect member names in archive order before borrowing entries
    let mut names = Vec::new();
    for index in 0..archive.len() {
        if let Ok(entry) = archive.by_index(index) {
            if is_subtitle_name(entry.name()) {
                names.push(entry.name().to_string());
            }
        }
    }

    let chosen = select_episode(&names, target)?;
    debug!(member = %chosen, "extracting zip member");

    let mut entry = archive.by_name(&chosen).ok()?;
    let mut content = Vec::new();
    entry.read_to_end(&mut content).ok()?;
    Some(decode(&content))
}

fn resolve_rar(blob: &[u8], target: Option<EpisodeTarget>) -> Option<String> {
    // the unrar library works on paths, so the blob goes through a temp file
    let mut tmp = tempfile::NamedTempFile::new().ok()?;
    tmp.write_all(blob).ok()?;

    let listing = match Archive::new(tmp.path()).open_for_listing() {
        Ok(listing) => listing,
        Err(e) => {
            warn!(error = %e, "failed to open rar archive");
            return None;
        }
    };

    let names: Vec<String> = listing
        .filter_map(|header| header.ok())
        .map(|header| header.filename.to_string_lossy().into_owned())
        .filter(|name| is_subtitle_name(name))
        .collect();

    let chosen = select_episode(&names, target)?;
    debug!(member = %chosen, "extracting rar member");

    // second phase: walk headers again and read the selected member
    let mut archive = Archive::new(tmp.path()).open_for_processing().ok()?;
    while let Some(header) = archive.read_header().ok()? {
        archive = if header.entry().filename.to_string_lossy() == chosen.as_str() {
            let (content, _) = header.read().ok()?;
            return Some(decode(&content));
        } else {
            header.skip().ok()?
        };
    }

    None
}
