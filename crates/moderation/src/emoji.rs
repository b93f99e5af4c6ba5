//! Emoji extraction and topic associations
//!
//! Emoji are detected per grapheme cluster, so flags, ZWJ sequences and
//! skin-tone variants come out as one unit. Detection defers to the `emojis`
//! database rather than a hand-maintained code point range list.
//!
//! Emoji are compared in canonical form: variation selectors and skin-tone
//! modifiers are removed, so blocking 👍 also blocks 👍🏽.

use std::collections::HashSet;
use unicode_normalization::char::is_combining_mark;
use unicode_segmentation::UnicodeSegmentation;

const ZERO_WIDTH_JOINER: char = '\u{200D}';
const KEYCAP: char = '\u{20E3}';
const SKIN_TONES: std::ops::RangeInclusive<char> = '\u{1F3FB}'..='\u{1F3FF}';

/// Canonical comparison form of an emoji
///
/// Drops skin tones, variation selectors (U+FE0E, U+FE0F) and other
/// combining marks. The keycap mark is kept since it is part of the emoji.
pub fn canonical(emoji: &str) -> String {
    emoji
        .trim()
        .chars()
        .filter(|c| !SKIN_TONES.contains(c) && (*c == KEYCAP || !is_combining_mark(*c)))
        .collect()
}

/// Check whether a single grapheme cluster is an emoji
pub fn is_emoji(grapheme: &str) -> bool {
    if grapheme.is_empty() || grapheme.is_ascii() {
        return false;
    }
    emojis::get(grapheme).is_some() || emojis::get(&canonical(grapheme)).is_some()
}

/// Extract the distinct emoji present in `text`, in canonical form
///
/// A cluster the database does not know, such as an emoji with a stray
/// joiner appended, is split on U+200D and then into code points so the
/// emoji inside it are still found.
pub fn extract_emojis(text: &str) -> HashSet<String> {
    let mut found = HashSet::new();

    for grapheme in text.graphemes(true) {
        if is_emoji(grapheme) {
            found.insert(canonical(grapheme));
            continue;
        }

        for piece in grapheme.split(ZERO_WIDTH_JOINER) {
            if is_emoji(piece) {
                found.insert(canonical(piece));
                continue;
            }

            found.extend(
                piece
                    .chars()
                    .map(String::from)
                    .filter(|c| is_emoji(c))
                    .map(|c| canonical(&c)),
            );
        }
    }

    found
}

/// Keywords that corroborate an otherwise ambiguous emoji
///
/// A watermelon in a recipe post means fruit; next to "gaza" it is a
/// political marker. Emoji without an entry are unambiguous and match on
/// presence alone.
pub fn associated_keywords(emoji: &str) -> Option<&'static [&'static str]> {
    let keywords: &'static [&'static str] = match canonical(emoji).as_str() {
        "🍉" => &["watermelon", "palestine", "gaza", "ceasefire"],
        "🇵🇸" => &["palestine", "gaza", "ceasefire"],
        "🇮🇱" => &["israel", "zionism", "idf"],
        "🇺🇦" => &["ukraine", "kyiv", "zelensky"],
        "🇷🇺" => &["russia", "kremlin", "putin"],
        "🟧" => &["bitcoin", "btc", "orange pill"],
        "⚡" => &["zap", "lightning", "sats"],
        "🤙" => &["pura vida", "nostr"],
        "🍆" => &["nsfw", "horny", "eggplant"],
        "🍑" => &["nsfw", "horny", "peach"],
        _ => return None,
    };
    Some(keywords)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_emoji() {
        let found = extract_emojis("nice day, had watermelon 🍉 for lunch");
        assert_eq!(found.len(), 1);
        assert!(found.contains("🍉"));
    }

    #[test]
    fn test_extract_flag_sequence() {
        let found = extract_emojis("solidarity 🇵🇸 and 🇺🇦");
        assert!(found.contains("🇵🇸"));
        assert!(found.contains("🇺🇦"));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_extract_zwj_sequence_as_one() {
        let found = extract_emojis("family 👨‍👩‍👧 photo");
        assert_eq!(found.len(), 1);
        assert!(found.contains("👨‍👩‍👧"));
    }

    #[test]
    fn test_skin_tone_folds_to_base() {
        let found = extract_emojis("ok 👍🏽");
        assert!(found.contains("👍"));
        assert_eq!(canonical("👍🏿"), "👍");
    }

    #[test]
    fn test_variation_selector_removed() {
        assert_eq!(canonical("⚡\u{FE0F}"), "⚡");
        assert!(extract_emojis("zap ⚡\u{FE0F}").contains("⚡"));
    }

    #[test]
    fn test_text_presentation_selector_removed() {
        assert_eq!(canonical("🐸\u{FE0E}"), "🐸");
        assert!(extract_emojis("🐸\u{FE0E}").contains("🐸"));
    }

    #[test]
    fn test_combining_mark_does_not_hide_emoji() {
        assert!(extract_emojis("🐸\u{301}").contains("🐸"));
    }

    #[test]
    fn test_unknown_zwj_sequence_is_split() {
        let found = extract_emojis("🐸\u{200D}🔥");
        assert!(found.contains("🐸"));
        assert!(found.contains("🔥"));

        assert!(extract_emojis("🐸\u{200D}").contains("🐸"));
    }

    #[test]
    fn test_keycap_kept() {
        assert_eq!(canonical("1\u{FE0F}\u{20E3}"), "1\u{20E3}");
    }

    #[test]
    fn test_no_emoji() {
        assert!(extract_emojis("").is_empty());
        assert!(extract_emojis("plain text #hashtag 123 *").is_empty());
        assert!(extract_emojis("naïve café").is_empty());
    }

    #[test]
    fn test_associations() {
        let keywords = associated_keywords("🍉").unwrap();
        assert!(keywords.contains(&"watermelon"));
        assert!(associated_keywords("⚡\u{FE0F}").is_some());
        assert!(associated_keywords("🐸").is_none());
    }
}
