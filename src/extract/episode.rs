//! Episode selection inside multi-file archives
//!
//! Season packs bundle a whole season of `.srt` files under wildly
//! inconsistent naming conventions. The matcher tries an ordered list of
//! patterns, most specific first, and the first (pattern, name) pair wins:
//! every name is tested against a pattern before the next, looser pattern
//! is tried. When nothing matches, the first subtitle file is returned
//! rather than nothing, because a plausible file beats an empty answer.

use regex::RegexBuilder;

use crate::models::EpisodeTarget;

/// Pick the archive member to extract for the given target
///
/// `names` is scanned in input order. With no target (movies), the first
/// name with a subtitle extension wins. Leading zeros are tolerated on
/// both sides and every numeric pattern anchors on a trailing non-digit so
/// that episode numbers embedded in larger numbers never match.
pub fn select_episode(names: &[String], target: Option<EpisodeTarget>) -> Option<String> {
    let target = match target {
        Some(t) => t,
        None => return first_subtitle(names),
    };

    for pattern in episode_patterns(target) {
        for name in names {
            if is_subtitle_name(name) && pattern.is_match(name) {
                return Some(name.clone());
            }
        }
    }

    // no convention matched; hand back something plausible
    first_subtitle(names)
}

/// True for the subtitle formats the site distributes
pub fn is_subtitle_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.ends_with(".srt") || lower.ends_with(".sub")
}

fn first_subtitle(names: &[String]) -> Option<String> {
    names.iter().find(|n| is_subtitle_name(n)).cloned()
}

/// Naming conventions in priority order, compiled for one target
fn episode_patterns(target: EpisodeTarget) -> Vec<regex::Regex> {
    let EpisodeTarget { season, episode } = target;
    let mut specs = vec![
        format!(r"S0*{season}E0*{episode}[^0-9]"),
        format!(r"{season}x0*{episode}[^0-9]"),
        format!(r"S0*{season}\.E0*{episode}"),
    ];
    // bare concatenation ("103" = S1E03) only makes sense for one-digit seasons
    if season < 10 {
        specs.push(format!(r"[^0-9]0*{season}0*{episode}[^0-9]"));
    }
    specs.push(format!(r"Episode[\s._-]*0*{episode}"));
    specs.push(format!(r"Ep0*{episode}[^0-9]"));
    specs.push(format!(r"E0*{episode}[^0-9]"));

    specs
        .iter()
        .filter_map(|spec| {
            RegexBuilder::new(spec)
                .case_insensitive(true)
                .build()
                .ok()
        })
        .collect()
}
