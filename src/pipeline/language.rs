//! Per-line script detection: split text into an Arabic and an Other bucket.
//!
//! Runs on the summary, not on the raw extracted text. Each bucket is narrated
//! with its own voice.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Arabic letters from hamza (U+0621) to yeh (U+064A).
static RE_ARABIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\x{0621}-\x{064A}]").unwrap());

/// Which narration branch a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageBucket {
    Arabic,
    /// Everything without an Arabic letter, narrated in English.
    Other,
}

impl LanguageBucket {
    /// Short code used in artifact file names.
    pub fn file_suffix(self) -> &'static str {
        match self {
            LanguageBucket::Arabic => "ar",
            LanguageBucket::Other => "en",
        }
    }

    /// Classify one line.
    pub fn of_line(line: &str) -> Self {
        if RE_ARABIC.is_match(line) {
            LanguageBucket::Arabic
        } else {
            LanguageBucket::Other
        }
    }
}

impl fmt::Display for LanguageBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageBucket::Arabic => f.write_str("Arabic"),
            LanguageBucket::Other => f.write_str("English"),
        }
    }
}

/// Split `text` on `\n` and route each line to its bucket, preserving order.
///
/// Returns `(arabic, other)`, each trimmed of surrounding whitespace. Empty
/// lines land in Other.
pub fn split_by_language(text: &str) -> (String, String) {
    let mut arabic = String::new();
    let mut other = String::new();

    for line in text.split('\n') {
        let bucket = match LanguageBucket::of_line(line) {
            LanguageBucket::Arabic => &mut arabic,
            LanguageBucket::Other => &mut other,
        };
        bucket.push_str(line);
        bucket.push('\n');
    }

    (arabic.trim().to_string(), other.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_english_goes_to_other() {
        let text = "  Cells divide.\nDNA replicates.\n\n";
        let (ar, other) = split_by_language(text);
        assert_eq!(ar, "");
        assert_eq!(other, text.trim());
    }

    #[test]
    fn mixed_lines_keep_their_order() {
        let text = "First point\nالنقطة الأولى\nSecond point\nالنقطة الثانية";
        let (ar, other) = split_by_language(text);
        assert_eq!(ar, "النقطة الأولى\nالنقطة الثانية");
        assert_eq!(other, "First point\nSecond point");
    }

    #[test]
    fn one_arabic_letter_is_enough() {
        assert_eq!(LanguageBucket::of_line("Chapter ب"), LanguageBucket::Arabic);
        assert_eq!(LanguageBucket::of_line("Chapter 2"), LanguageBucket::Other);
    }

    #[test]
    fn arabic_digits_and_punctuation_are_not_letters() {
        // Arabic-Indic digits (U+0660..) and the Arabic comma (U+060C) sit
        // outside the letter range.
        assert_eq!(LanguageBucket::of_line("١٢٣ ، ؟"), LanguageBucket::Other);
    }

    #[test]
    fn empty_lines_are_other() {
        assert_eq!(LanguageBucket::of_line(""), LanguageBucket::Other);
        let (ar, other) = split_by_language("مرحبا\n\nhello");
        assert_eq!(ar, "مرحبا");
        assert_eq!(other, "hello");
    }

    #[test]
    fn empty_input_gives_two_empty_buckets() {
        assert_eq!(split_by_language(""), (String::new(), String::new()));
    }
}
