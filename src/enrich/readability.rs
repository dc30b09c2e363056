// src/enrich/readability.rs

use once_cell::sync::Lazy;
use regex::Regex;

use super::{words, Scorer};

/// Reading ease of text with no words: both ratios are taken as zero.
pub const EMPTY_TEXT_SCORE: f64 = 206.835;

static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("sentence pattern is valid"));

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

/// Vowel-group syllable estimate for one lowercase word, at least one.
pub fn syllables(word: &str) -> usize {
    let chars: Vec<char> = word.chars().filter(|c| c.is_ascii_alphabetic()).collect();
    if chars.is_empty() {
        return 0;
    }

    let mut count = 0;
    let mut prev_vowel = false;
    for &c in &chars {
        let v = is_vowel(c);
        if v && !prev_vowel {
            count += 1;
        }
        prev_vowel = v;
    }

    // silent trailing e, except consonant + "le" ("bottle", "table")
    let n = chars.len();
    if n > 2 && chars[n - 1] == 'e' && count > 1 {
        let consonant_le = chars[n - 2] == 'l' && !is_vowel(chars[n - 3]);
        if !consonant_le {
            count -= 1;
        }
    }

    count.max(1)
}

/// Sentences are runs of text ending at `.`, `!` or `?`; a trailing run
/// without a terminator still counts if it contains a word.
fn sentences(text: &str) -> usize {
    SENTENCE_END
        .split(text)
        .filter(|s| words(s).next().is_some())
        .count()
}

/// Flesch reading ease:
/// `206.835 - 1.015 * (words / sentences) - 84.6 * (syllables / words)`.
/// Higher is easier. Unbounded in both directions.
pub fn flesch_reading_ease(text: &str) -> f64 {
    let tokens: Vec<String> = words(text).collect();
    if tokens.is_empty() {
        return EMPTY_TEXT_SCORE;
    }

    let n_words = tokens.len() as f64;
    let n_sentences = sentences(text).max(1) as f64;
    let n_syllables: usize = tokens.iter().map(|w| syllables(w)).sum();

    206.835 - 1.015 * (n_words / n_sentences) - 84.6 * (n_syllables as f64 / n_words)
}

/// Flesch reading-ease scorer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Readability;

impl Scorer for Readability {
    fn score(&self, text: &str) -> f64 {
        flesch_reading_ease(text)
    }
}
