//! Label sanitization and canonical identity keys
//!
//! Every free-text label passes through `sanitize` before it is stored or
//! compared. `canonical_key` is the one place entity identity is decided:
//! sanitize, trim, case-fold. Both functions are pure and total.

/// Strip characters the persistence format cannot carry.
///
/// Keeps tab, newline, carriage return, and the printable ranges of the
/// XML-derived graph format (U+0020–U+D7FF, U+E000–U+FFFD, supplementary
/// planes). Everything else — other C0 controls, lone surrogates cannot
/// occur in `str` — is removed.
pub fn sanitize(s: &str) -> String {
    s.chars().filter(|&c| is_allowed(c)).collect()
}

fn is_allowed(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r')
        || ('\u{0020}'..='\u{D7FF}').contains(&c)
        || ('\u{E000}'..='\u{FFFD}').contains(&c)
        || ('\u{10000}'..='\u{10FFFF}').contains(&c)
}

/// Canonical identity key for an entity label: sanitized, trimmed,
/// lowercased. Two labels with the same canonical key are the same entity.
pub fn canonical_key(s: &str) -> String {
    sanitize(s).trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_illegal_control_characters() {
        assert_eq!(sanitize("GA\u{0}RCH"), "GARCH");
        assert_eq!(sanitize("a\u{1}b\u{8}c\u{b}d\u{1f}e"), "abcde");
    }

    #[test]
    fn keeps_whitespace_controls_and_unicode() {
        assert_eq!(sanitize("a\tb\nc\rd"), "a\tb\nc\rd");
        assert_eq!(sanitize("volatilité 時系列 😀"), "volatilité 時系列 😀");
    }

    #[test]
    fn sanitize_is_idempotent() {
        for s in ["GA\u{0}RCH", "plain", "a\u{7f}b", "mixed\u{2}\ttext\n"] {
            let once = sanitize(s);
            assert_eq!(sanitize(&once), once);
        }
    }

    #[test]
    fn canonical_key_folds_case_and_trims() {
        assert_eq!(canonical_key("  GARCH "), "garch");
        assert_eq!(canonical_key("Volatility Modeling"), "volatility modeling");
    }

    #[test]
    fn labels_differing_only_in_stripped_chars_collide() {
        assert_eq!(canonical_key("GAR\u{0}CH"), canonical_key("garch"));
    }
}
