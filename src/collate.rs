//! Locale-aware string ordering for post titles, using the Unicode Collation
//! Algorithm with the root locale's tailoring at the default (tertiary)
//! strength. Base letters decide first, then diacritics, then case, with
//! lowercase before uppercase. Expansions such as `ß` (`ss`) and `æ` (`ae`)
//! are honoured and punctuation sorts before letters.
//!
//! Two strings which tie at every level compare [`Ordering::Equal`], so a
//! stable sort keeps them in input order.

use icu_collator::{Collator, CollatorOptions};
use std::cmp::Ordering;
use tracing::error;

/// A loaded collator. Build one per sort rather than per comparison.
pub struct Collation {
    collator: Option<Collator>,
}

impl Collation {
    /// Loads the root collation. If the collation data can't be loaded the
    /// failure is logged and comparisons fall back to code point order.
    pub fn new() -> Collation {
        match Collator::try_new(&Default::default(), CollatorOptions::new()) {
            Ok(collator) => Collation {
                collator: Some(collator),
            },
            Err(err) => {
                error!(error = %err, "loading collation data, using code point order");
                Collation { collator: None }
            }
        }
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match &self.collator {
            Some(collator) => collator.compare(a, b),
            None => a.cmp(b),
        }
    }
}

impl Default for Collation {
    fn default() -> Collation {
        Collation::new()
    }
}

/// Compares two strings with a freshly loaded [`Collation`].
pub fn compare(a: &str, b: &str) -> Ordering {
    Collation::new().compare(a, b)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_plain_order() {
        assert_eq!(Ordering::Less, compare("A", "B"));
        assert_eq!(Ordering::Greater, compare("b", "a"));
        assert_eq!(Ordering::Less, compare("", "a"));
        assert_eq!(Ordering::Less, compare("abc", "abcd"));
    }

    #[test]
    fn test_case_is_not_primary() {
        // Bytewise, every uppercase letter sorts before every lowercase one.
        assert_eq!(Ordering::Less, compare("apple", "Banana"));
        assert_eq!(Ordering::Less, compare("Zebra", "zoo"));
    }

    #[test]
    fn test_lowercase_first_on_tie() {
        assert_eq!(Ordering::Less, compare("apple", "Apple"));
        assert_eq!(Ordering::Greater, compare("Apple", "apple"));
    }

    #[test]
    fn test_diacritics() {
        assert_eq!(Ordering::Less, compare("cote", "côte"));
        assert_eq!(Ordering::Less, compare("Éclair", "Frost"));
        assert_eq!(Ordering::Less, compare("résumé", "rule"));
    }

    #[test]
    fn test_canonical_equivalence() {
        // Precomposed and decomposed forms of `é`.
        assert_eq!(Ordering::Equal, compare("caf\u{e9}", "cafe\u{301}"));
        assert_eq!(Ordering::Equal, compare("same", "same"));
    }

    #[test]
    fn test_expansions() {
        assert_eq!(Ordering::Less, compare("Œuvre", "Open"));
        assert_eq!(Ordering::Less, compare("Straße", "Strasze"));
        assert_eq!(Ordering::Less, compare("æble", "afton"));
    }

    #[test]
    fn test_symbols_before_letters() {
        assert_eq!(Ordering::Less, compare("~x", "a"));
        assert_eq!(Ordering::Less, compare("#1", "1"));
    }

    #[test]
    fn test_collation_reused() {
        let collation = Collation::new();
        let mut titles = vec!["Straße", "Open", "~Notes", "Œuvre", "apple"];
        titles.sort_by(|a, b| collation.compare(a, b));
        assert_eq!(vec!["~Notes", "apple", "Œuvre", "Open", "Straße"], titles);
    }
}
