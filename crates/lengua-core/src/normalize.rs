//! Answer normalization.
//!
//! Every comparison between a learner's answer and an expected value goes
//! through [`normalize`], so that case, accents and stray whitespace never
//! decide a verdict.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const COMBINING_TILDE: char = '\u{0303}';

/// Canonicalize free text for comparison.
///
/// Lowercases, strips diacritics and collapses whitespace. "ñ" is a letter of
/// its own in Spanish and keeps its tilde, so `normalize("Año")` is `"año"`
/// while `normalize("canción")` is `"cancion"`.
pub fn normalize(input: &str) -> String {
    let lowered = input.to_lowercase();

    let mut stripped = String::with_capacity(lowered.len());
    let mut prev = None;
    for c in lowered.nfd() {
        if is_combining_mark(c) && !(c == COMBINING_TILDE && prev == Some('n')) {
            continue;
        }
        stripped.push(c);
        prev = Some(c);
    }

    stripped
        .nfc()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// [`normalize`] for values that may be missing; `None` behaves like `""`.
pub fn normalize_opt(input: Option<&str>) -> String {
    input.map(normalize).unwrap_or_default()
}

/// Loose equality: equal after normalization.
pub fn equals_loose(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}
