//! Title to identifier transform.
//!
//! Turns display titles such as `"I'm In Your Mind Fuzz"` into the URL-safe
//! identifiers used for content file names and links
//! (`"im-in-your-mind-fuzz"`).
//!
//! Rules, applied in a single pass:
//! 1. NFKD decomposition; combining marks are dropped so `"é"` becomes `"e"`
//! 2. ASCII letters and digits are kept (lowercased)
//! 3. Whitespace and `-` are word separators; each run becomes one `-`
//! 4. Everything else is removed, including `&` and `_`
//! 5. No leading, trailing or doubled hyphens

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Convert arbitrary text into a lowercase, hyphen-separated identifier.
///
/// Returns an empty string when nothing usable remains.
pub fn to_identifier(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_separator = false;

    for c in text.nfkd() {
        if is_combining_mark(c) {
            continue;
        }

        if c.is_ascii_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('-');
            }
            pending_separator = false;
            out.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' {
            pending_separator = true;
        }
    }

    out
}

/// Check whether `text` is already a canonical identifier.
pub fn is_identifier(text: &str) -> bool {
    !text.is_empty() && to_identifier(text) == text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_titles() {
        assert_eq!(to_identifier("Hello World"), "hello-world");
        assert_eq!(to_identifier("NONAGON"), "nonagon");
        assert_eq!(to_identifier("Too  Many    Spaces"), "too-many-spaces");
        assert_eq!(to_identifier("12 Bar Bruise"), "12-bar-bruise");
    }

    #[test]
    fn test_punctuation_is_removed() {
        assert_eq!(to_identifier("I'm In Your Mind"), "im-in-your-mind");
        assert_eq!(to_identifier("\"Quoted Title\""), "quoted-title");
        assert_eq!(to_identifier("Album (Deluxe Edition)"), "album-deluxe-edition");
        assert_eq!(to_identifier("Song [Live Version]"), "song-live-version");
        assert_eq!(to_identifier("Oh No!!!"), "oh-no");
        assert_eq!(to_identifier("First, Second, Third"), "first-second-third");
        assert_eq!(to_identifier("Semi;Colon:Test"), "semicolontest");
        assert_eq!(to_identifier("snake_case"), "snakecase");
    }

    #[test]
    fn test_ampersand_is_dropped() {
        assert_eq!(to_identifier("Rock & Roll"), "rock-roll");
        assert_eq!(to_identifier("This&That"), "thisthat");
    }

    #[test]
    fn test_diacritics() {
        assert_eq!(to_identifier("Café"), "cafe");
        assert_eq!(to_identifier("Naïve"), "naive");
        assert_eq!(to_identifier("München"), "munchen");
        assert_eq!(to_identifier("Señor"), "senor");
        assert_eq!(to_identifier("Paper Mâché Dream Balloon"), "paper-mache-dream-balloon");
        // no ASCII base
        assert_eq!(to_identifier("Ørsted Ω"), "rsted");
    }

    #[test]
    fn test_hyphens_are_separators() {
        assert_eq!(to_identifier("-Hello-"), "hello");
        assert_eq!(to_identifier("--World--"), "world");
        assert_eq!(to_identifier("Hello - - World"), "hello-world");
        assert_eq!(
            to_identifier("Float Along - Fill Your Lungs"),
            "float-along-fill-your-lungs"
        );
        assert_eq!(to_identifier("ALREADY-KEBAB-CASE"), "already-kebab-case");
    }

    #[test]
    fn test_empty_results() {
        assert_eq!(to_identifier(""), "");
        assert_eq!(to_identifier("   "), "");
        assert_eq!(to_identifier("!!!"), "");
        assert_eq!(to_identifier("@#$%"), "");
        assert_eq!(to_identifier(" - "), "");
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("flying-microtonal-banana"));
        assert!(is_identifier("kg"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("Flying"));
        assert!(!is_identifier("-kg"));
        assert!(!is_identifier("k--g"));
        assert!(!is_identifier("../secret"));
    }
}
