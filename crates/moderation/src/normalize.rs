//! Text canonicalization for blocklist matching
//!
//! Both sides of every comparison go through the same folding, so a
//! keyword and an obfuscated spelling of it land on the same string.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Look-alike substitutions, applied in order
const SUBSTITUTIONS: &[(&[char], char)] = &[
    (&['1'], 'i'),
    (&['0'], 'o'),
    (&['3'], 'e'),
    (&['4'], 'a'),
    (&['5'], 's'),
    (&['7'], 't'),
    (&['@'], 'a'),
];

/// Letters folded into the `i` class only when comparing
const COMPARISON_FOLDS: &[(char, char)] = &[('l', 'i')];

/// Invisible separators used to split words without showing a gap
const ZERO_WIDTH: &[char] = &['\u{200B}', '\u{200C}', '\u{2060}', '\u{FEFF}'];

/// Canonicalize text for matching
///
/// Lowercases, strips diacritics, folds leetspeak digits and symbols back
/// to letters, and trims surrounding whitespace.
///
/// ```
/// use moderation::normalize;
///
/// assert_eq!(normalize("P4l3st1ne"), "palestine");
/// assert_eq!(normalize("  Café  "), "cafe");
/// ```
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c) && !ZERO_WIDTH.contains(c))
        .map(substitute)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Canonical form used for equality and containment checks
///
/// [`normalize`] plus the `l` to `i` fold. Applying the fold to both
/// operands catches `1` standing in for `l` ("pa1estine") while keeping
/// [`normalize`] output readable.
pub fn comparison_key(text: &str) -> String {
    normalize(text).chars().map(fold_for_comparison).collect()
}

fn substitute(c: char) -> char {
    SUBSTITUTIONS
        .iter()
        .fold(c, |c, (from, to)| if from.contains(&c) { *to } else { c })
}

fn fold_for_comparison(c: char) -> char {
    COMPARISON_FOLDS
        .iter()
        .find(|(from, _)| *from == c)
        .map_or(c, |(_, to)| *to)
}
