//! Sentence splitting and context-sentence extraction.

use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::warn;

use crate::errors::NoMatchError;

/// Protocol for splitting prose into sentences.
pub trait SentenceTokenizer: Send + Sync {
    /// Splits text into trimmed, non-empty sentences in reading order.
    fn split_sentences(&self, text: &str) -> Vec<String>;
}

/// Words that end with a period without ending a sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "etc", "sr", "jr", "st", "mt", "ft", "vs", "al", "e.g",
    "i.e", "cf", "ca", "approx", "no", "nos", "vol", "fig", "figs", "pp", "ed", "eds",
    "inc", "ltd", "co", "corp", "gen", "gov", "rev", "lt", "col", "sgt", "capt", "jan", "feb",
    "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec", "u.s", "u.k",
];

/// A candidate boundary: terminal punctuation, optional closing quotes or
/// brackets, optional citation markers like `[12]` or `[citation needed]`,
/// then whitespace.
static BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:[.!?]+|…)["'”’»)\]]*(?:\[[^\]]{1,24}\])*\s+"#)
        .unwrap_or_else(|e| unreachable!("invalid sentence boundary pattern: {e}"))
});

/// Rule-based sentence tokenizer for encyclopedia prose.
///
/// Splits after `.`, `!`, `?` or `…` when whitespace follows and the next
/// word does not start with a lowercase letter. Known abbreviations and
/// single-letter initials never end a sentence. Decimal numbers are safe
/// because a boundary requires whitespace after the punctuation.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedTokenizer;

impl RuleBasedTokenizer {
    /// Creates a new tokenizer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn is_abbreviation(preceding: &str) -> bool {
        let word = preceding
            .rsplit(char::is_whitespace)
            .next()
            .unwrap_or_default()
            .trim_start_matches(|c: char| matches!(c, '(' | '[' | '"' | '\'' | '“' | '‘'));
        if word.is_empty() {
            return false;
        }
        let mut chars = word.chars();
        if let (Some(first), None) = (chars.next(), chars.next()) {
            // Initials such as "J. R. R. Tolkien".
            return first.is_alphabetic();
        }
        let lower = word.to_lowercase();
        ABBREVIATIONS.contains(&lower.as_str())
    }
}

impl SentenceTokenizer for RuleBasedTokenizer {
    fn split_sentences(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut start = 0;

        for boundary in BOUNDARY.find_iter(text) {
            let next_char = text[boundary.end()..].chars().next();
            if next_char.is_some_and(char::is_lowercase) {
                continue;
            }

            let punctuation = &text[boundary.start()..];
            if punctuation.starts_with('.')
                && !punctuation.starts_with("..")
                && Self::is_abbreviation(&text[start..boundary.start()])
            {
                continue;
            }

            let sentence = text[start..boundary.end()].trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            start = boundary.end();
        }

        let rest = text[start..].trim();
        if !rest.is_empty() {
            sentences.push(rest.to_string());
        }
        sentences
    }
}

/// Finds the sentence of a paragraph that contains a link's anchor text.
#[derive(Clone)]
pub struct SentenceExtractor {
    tokenizer: Arc<dyn SentenceTokenizer>,
}

impl SentenceExtractor {
    /// Creates an extractor over the given tokenizer.
    #[must_use]
    pub fn new(tokenizer: Arc<dyn SentenceTokenizer>) -> Self {
        Self { tokenizer }
    }

    /// Returns the first sentence of `paragraph_text` containing `anchor_text`.
    ///
    /// Surrounding whitespace of the anchor text is ignored when matching.
    /// A mismatch is logged as a diagnostic and returned as [`NoMatchError`];
    /// callers drop the link.
    pub fn extract(&self, anchor_text: &str, paragraph_text: &str) -> Result<String, NoMatchError> {
        let needle = anchor_text.trim();
        let mut sentences = self.tokenizer.split_sentences(paragraph_text);

        if !needle.is_empty() {
            if let Some(index) = sentences.iter().position(|s| s.contains(needle)) {
                return Ok(sentences.swap_remove(index));
            }
        }

        warn!(
            anchor_text = %anchor_text,
            sentences = ?sentences,
            "Anchor text wasn't found in the paragraph sentences"
        );
        Err(NoMatchError::new(anchor_text, sentences))
    }
}

impl Default for SentenceExtractor {
    fn default() -> Self {
        Self::new(Arc::new(RuleBasedTokenizer))
    }
}

impl std::fmt::Debug for SentenceExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentenceExtractor").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn split(text: &str) -> Vec<String> {
        RuleBasedTokenizer.split_sentences(text)
    }

    #[test]
    fn test_splits_simple_sentences() {
        assert_eq!(
            split("See B for details. C is elsewhere! Is D near?"),
            vec!["See B for details.", "C is elsewhere!", "Is D near?"]
        );
    }

    #[test]
    fn test_keeps_abbreviations_and_initials() {
        assert_eq!(
            split("Dr. Smith met J. R. R. Tolkien in St. Andrews. They talked."),
            vec!["Dr. Smith met J. R. R. Tolkien in St. Andrews.", "They talked."]
        );
        assert_eq!(
            split("Some cats, e.g. Siamese, are vocal. Dogs bark."),
            vec!["Some cats, e.g. Siamese, are vocal.", "Dogs bark."]
        );
    }

    #[test]
    fn test_decimals_and_lowercase_continuations_do_not_split() {
        assert_eq!(
            split("Pi is about 3.14 in value. The end."),
            vec!["Pi is about 3.14 in value.", "The end."]
        );
        assert_eq!(split("Wait... what happened?"), vec!["Wait... what happened?"]);
    }

    #[test]
    fn test_citation_markers_and_quotes_stay_with_sentence() {
        assert_eq!(
            split("Rust is fast.[1] It is \"safe.\" Really."),
            vec!["Rust is fast.[1]", "It is \"safe.\"", "Really."]
        );
    }

    #[test]
    fn test_citation_markers_with_spaces_stay_with_sentence() {
        assert_eq!(
            split("Rust is fast.[citation needed] It is also safe.[note 2][3] Really."),
            vec![
                "Rust is fast.[citation needed]",
                "It is also safe.[note 2][3]",
                "Really.",
            ]
        );
    }

    #[test]
    fn test_empty_and_unterminated_text() {
        assert!(split("   ").is_empty());
        assert_eq!(split("  no terminal punctuation  "), vec!["no terminal punctuation"]);
    }

    #[test]
    fn test_extract_returns_first_matching_sentence() {
        let extractor = SentenceExtractor::default();
        let sentence = extractor
            .extract("B", "A is a page. See B for details. B appears again.")
            .unwrap();
        assert_eq!(sentence, "See B for details.");
    }

    #[test]
    fn test_extract_ignores_anchor_whitespace() {
        let extractor = SentenceExtractor::default();
        let sentence = extractor.extract(" Graph theory ", "Graph theory is old. It grew.").unwrap();
        assert_eq!(sentence, "Graph theory is old.");
    }

    #[test]
    fn test_extract_fails_when_anchor_spans_sentences() {
        let extractor = SentenceExtractor::default();
        let err = extractor
            .extract("end. Start", "This is the end. Start again here.")
            .unwrap_err();
        assert_eq!(err.anchor_text, "end. Start");
        assert_eq!(err.sentences.len(), 2);
    }

    #[test]
    fn test_extract_uses_custom_tokenizer() {
        struct LineTokenizer;
        impl SentenceTokenizer for LineTokenizer {
            fn split_sentences(&self, text: &str) -> Vec<String> {
                text.lines().map(String::from).collect()
            }
        }

        let extractor = SentenceExtractor::new(Arc::new(LineTokenizer));
        assert_eq!(extractor.extract("beta", "alpha\nbeta gamma").unwrap(), "beta gamma");
    }
}
