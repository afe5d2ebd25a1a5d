//! Romanian subtitle text decoding
//!
//! Subtitle files on titrari.ro come from many eras and tools, with no
//! encoding metadata and plenty of historical double-encoding damage.
//! Statistical charset detection is unreliable on short garbled text, so
//! correctness is anchored on "does it produce valid Romanian-looking
//! text" instead: an ordered chain of candidate decodings, each followed
//! by a diacritic-repair pass, where the first result that contains a
//! Romanian diacritic and no replacement or C1 control character wins.
//! Latin-1 is the terminal fallback because it maps every byte to a
//! codepoint and can never fail.

use encoding_rs::WINDOWS_1250;
use tracing::debug;

/// Known mis-encoded sequences and their corrections.
///
/// Applied in declaration order. The multi-character garbles (double-encoded
/// files) come first: "Èš" must be rewritten before the single-character
/// "š" entry gets a chance to split it. The single-character group covers
/// the legacy cedilla and caron codepoints that the windows-1250 table
/// yields for the bytes Romanian subtitle tools used for Ș/ș/Ț/ț.
const DIACRITIC_REPAIRS: &[(&str, &str)] = &[
    // UTF-8 bytes read through the windows-1250 table
    ("Č™", "ș"),
    ("Č›", "ț"),
    ("Ä‚", "Ă"),
    ("Ă®", "î"),
    ("ĂŽ", "Î"),
    ("Ă˘", "â"),
    ("Ă‚", "Â"),
    // UTF-8 bytes read through the windows-1252 table
    ("È™", "ș"),
    ("È˜", "Ș"),
    ("È›", "ț"),
    ("Èš", "Ț"),
    ("Äƒ", "ă"),
    ("Ã®", "î"),
    ("ÃŽ", "Î"),
    ("Ã¢", "â"),
    ("Ã‚", "Â"),
    // cedilla variants (bytes 0xAA/0xBA/0xDE/0xFE)
    ("Ş", "Ș"),
    ("ş", "ș"),
    ("Ţ", "Ț"),
    ("ţ", "ț"),
    // caron codepoints reused for comma-below letters (0x8A/0x9A/0x8C/0x9C)
    ("Š", "Ș"),
    ("š", "ș"),
    ("Ś", "Ț"),
    ("ś", "ț"),
];

const ROMANIAN_DIACRITICS: &[char] = &['ș', 'ț', 'ă', 'î', 'â', 'Ș', 'Ț', 'Ă', 'Î', 'Â'];

/// Decode raw subtitle bytes into best-effort Romanian text. Never fails.
pub fn decode(buffer: &[u8]) -> String {
    let attempts: &[(&str, fn(&[u8]) -> Option<String>)] = &[
        ("windows-1250", decode_windows_1250),
        ("utf-8", decode_utf8),
    ];

    for (label, attempt) in attempts {
        if let Some(text) = attempt(buffer).map(repair_diacritics) {
            if looks_romanian(&text) {
                debug!(encoding = label, "decoded subtitle text");
                return text;
            }
        }
    }

    debug!(encoding = "latin-1", "decoded subtitle text via fallback");
    repair_diacritics(decode_latin1(buffer))
}

/// Replace known mis-encoded sequences with the correct characters
fn repair_diacritics(text: String) -> String {
    let mut fixed = text;
    for (wrong, correct) in DIACRITIC_REPAIRS {
        if fixed.contains(wrong) {
            fixed = fixed.replace(wrong, correct);
        }
    }
    fixed
}

/// Accept a decoding only if it yielded plausible Romanian text
///
/// The windows-1250 table maps its undefined bytes (0x81, 0x83, 0x88, 0x90,
/// 0x98) to C1 control characters rather than U+FFFD, and UTF-8 input hits
/// exactly those bytes ("ă" is 0xC4 0x83). No real subtitle contains C1
/// controls, so their presence marks a mis-decode just like U+FFFD does.
fn looks_romanian(text: &str) -> bool {
    text.contains(ROMANIAN_DIACRITICS)
        && !text
            .chars()
            .any(|c| c == '\u{FFFD}' || ('\u{80}'..='\u{9F}').contains(&c))
}

fn decode_windows_1250(buffer: &[u8]) -> Option<String> {
    let (text, _, _) = WINDOWS_1250.decode(buffer);
    Some(text.into_owned())
}

fn decode_utf8(buffer: &[u8]) -> Option<String> {
    String::from_utf8(buffer.to_vec()).ok()
}

/// Lossless byte-to-codepoint mapping; the guaranteed terminal fallback
fn decode_latin1(buffer: &[u8]) -> String {
    buffer.iter().map(|&b| char::from(b)).collect()
}
