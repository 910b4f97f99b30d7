use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// How forgiving a comparison should be.
///
/// `Strict` keeps diacritics, since Swedish words differ meaningfully by them (e.g. "har" and
/// "här"). `Loose` is for free-text answers where "Forsta advent" should still match
/// "Första advent".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strictness {
    Strict,
    Loose,
}

/// A string that has been through `normalize`. Only constructible by normalizing, so two values
/// can be compared directly.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalizes `text` for comparison.
pub fn normalize(text: &str, strictness: Strictness) -> NormalizedText {
    let folded: String = match strictness {
        Strictness::Strict => {
            // Lower-casing can produce decomposed sequences, so compose again afterwards.
            let composed: String = text.nfc().collect();
            composed.to_lowercase().nfc().collect()
        }
        // Compatibility forms may decompose into upper-case letters ("℡" into "TEL"), so
        // decompose before lower-casing as well as after.
        Strictness::Loose => text
            .nfkd()
            .collect::<String>()
            .to_lowercase()
            .nfkd()
            .filter(|c| !is_combining_mark(*c))
            .filter(|c| c.is_alphanumeric() || c.is_whitespace())
            .collect(),
    };
    NormalizedText(collapse_whitespace(&folded))
}

pub fn normalize_strict(text: &str) -> NormalizedText {
    normalize(text, Strictness::Strict)
}

pub fn normalize_loose(text: &str) -> NormalizedText {
    normalize(text, Strictness::Loose)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case- and diacritic-folded form of a single letter. "Ö", "ö" and "O" all fold to "o".
pub fn fold_letter(c: char) -> String {
    c.to_lowercase()
        .collect::<String>()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// The letters of `text`, upper-cased, composed, with everything else dropped. "Glögg!" becomes
/// "GLÖGG".
pub fn word_letters(text: &str) -> String {
    let composed: String = text.nfc().collect();
    composed
        .to_uppercase()
        .nfc()
        .filter(|c| c.is_alphabetic())
        .collect()
}

/// The set of answers accepted for a free-text puzzle. Always contains the canonical solution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AcceptedAnswers {
    answers: HashSet<NormalizedText>,
}

impl AcceptedAnswers {
    pub fn new<S: AsRef<str>>(canonical: &str, alternatives: &[S]) -> Self {
        let answers = std::iter::once(canonical)
            .chain(alternatives.iter().map(|s| s.as_ref()))
            .map(normalize_loose)
            .filter(|answer| !answer.is_empty())
            .collect();
        Self { answers }
    }

    pub fn is_match(&self, guess: &str) -> bool {
        self.answers.contains(&normalize_loose(guess))
    }

    pub fn iter(&self) -> impl Iterator<Item = &NormalizedText> {
        self.answers.iter()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strict_keeps_diacritics() {
        assert_eq!(normalize_strict("  GLÖGG  ").as_str(), "glögg");
        assert_ne!(normalize_strict("här"), normalize_strict("har"));
        assert_eq!(normalize_strict("ÅÄÖ").as_str(), "åäö");
    }

    #[test]
    fn test_strict_composes_decomposed_input() {
        // "o" followed by a combining diaeresis.
        let decomposed = "glo\u{0308}gg";
        assert_eq!(normalize_strict(decomposed), normalize_strict("glögg"));
    }

    #[test]
    fn test_whitespace_collapses() {
        assert_eq!(
            normalize_strict(" Lay  All\tYour \n Love ").as_str(),
            "lay all your love"
        );
        assert_eq!(normalize_loose("   ").as_str(), "");
    }

    #[test]
    fn test_loose_strips_diacritics_and_punctuation() {
        assert_eq!(normalize_loose("Första advent!").as_str(), "forsta advent");
        assert_eq!(normalize_loose("...Baby One More Time").as_str(), "baby one more time");
        assert_eq!(normalize_loose("Māori").as_str(), "maori");
        assert_eq!(normalize_loose("1:a advent").as_str(), "1a advent");
    }

    #[test]
    fn test_fold_letter() {
        assert_eq!(fold_letter('Ö'), "o");
        assert_eq!(fold_letter('å'), "a");
        assert_eq!(fold_letter('J'), "j");
    }

    #[test]
    fn test_word_letters() {
        assert_eq!(word_letters("Glögg!"), "GLÖGG");
        assert_eq!(word_letters("r i s"), "RIS");
        assert_eq!(word_letters("12-3"), "");
    }

    #[test]
    fn test_accepted_answers_include_canonical() {
        let answers = AcceptedAnswers::new("Fiji", &["Republic of Fiji", "Fiji Islands"]);
        assert_eq!(answers.len(), 3);
        assert!(answers.is_match("fiji"));
        assert!(answers.is_match("  FIJI  "));
        assert!(answers.is_match("republic of fiji"));
        assert!(!answers.is_match("Samoa"));
    }

    #[test]
    fn test_accepted_answers_tolerate_typing_variation() {
        let answers = AcceptedAnswers::new("Första advent", &["1:a advent"]);
        assert!(answers.is_match("forsta advent"));
        assert!(answers.is_match("Första   advent."));
        assert!(answers.is_match("1a advent"));
        assert!(!answers.is_match("andra advent"));
    }

    #[test]
    fn test_accepted_answers_dedupe_variants() {
        let answers = AcceptedAnswers::new("Poker Face", &["Poker Face", "poker face!"]);
        assert_eq!(answers.len(), 1);
    }

    proptest! {
        #[test]
        fn test_strict_is_idempotent(text in "[\\p{L}\\p{M}\\p{N}\\p{P}\\s]{0,24}") {
            let once = normalize_strict(&text);
            prop_assert_eq!(normalize_strict(once.as_str()), once);
        }

        #[test]
        fn test_loose_is_idempotent(text in "[\\p{L}\\p{M}\\p{N}\\p{P}\\s]{0,24}") {
            let once = normalize_loose(&text);
            prop_assert_eq!(normalize_loose(once.as_str()), once);
        }

        #[test]
        fn test_swedish_idempotent(text in "[a-zA-ZåäöÅÄÖé \t]{0,20}") {
            for strictness in [Strictness::Strict, Strictness::Loose] {
                let once = normalize(&text, strictness);
                prop_assert_eq!(normalize(once.as_str(), strictness), once);
            }
        }
    }
}
