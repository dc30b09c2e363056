// src/enrich/sentiment.rs

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::{words, Scorer};

/// Lexicon entries: word → (polarity, subjectivity).
///
/// General-purpose adjectives plus the vocabulary reviewers use for
/// appearance, aroma, palate and taste.
const LEXICON_ENTRIES: &[(&str, f64, f64)] = &[
    // general
    ("good", 0.7, 0.6),
    ("great", 0.8, 0.75),
    ("excellent", 1.0, 1.0),
    ("amazing", 0.6, 0.9),
    ("awesome", 1.0, 1.0),
    ("fantastic", 0.4, 0.9),
    ("wonderful", 1.0, 1.0),
    ("outstanding", 0.5, 0.8),
    ("superb", 1.0, 1.0),
    ("perfect", 1.0, 1.0),
    ("best", 1.0, 0.3),
    ("better", 0.5, 0.5),
    ("nice", 0.6, 1.0),
    ("fine", 0.4167, 0.5),
    ("decent", 0.1667, 0.6667),
    ("solid", 0.2, 0.4),
    ("enjoyable", 0.5, 0.6),
    ("pleasant", 0.7333, 0.9667),
    ("lovely", 0.5, 0.75),
    ("beautiful", 0.85, 1.0),
    ("love", 0.5, 0.6),
    ("like", 0.1, 0.3),
    ("impressive", 1.0, 1.0),
    ("interesting", 0.5, 0.5),
    ("favorite", 0.5, 1.0),
    ("recommend", 0.3, 0.4),
    ("bad", -0.7, 0.6667),
    ("worse", -0.4, 0.6),
    ("worst", -1.0, 1.0),
    ("terrible", -1.0, 1.0),
    ("awful", -1.0, 1.0),
    ("horrible", -1.0, 1.0),
    ("poor", -0.4, 0.6),
    ("disappointing", -0.6, 0.7),
    ("disappointed", -0.75, 0.75),
    ("mediocre", -0.5, 0.75),
    ("boring", -1.0, 1.0),
    ("weird", -0.5, 1.0),
    ("strange", -0.05, 0.15),
    ("unpleasant", -0.7, 0.9),
    ("hate", -0.8, 0.9),
    ("nasty", -1.0, 1.0),
    ("gross", -0.8, 0.9),
    ("disgusting", -1.0, 1.0),
    ("average", -0.15, 0.3917),
    ("ok", 0.5, 0.5),
    ("okay", 0.5, 0.5),
    // appearance
    ("clear", 0.1, 0.3833),
    ("bright", 0.7, 0.75),
    ("cloudy", -0.1, 0.3),
    ("murky", -0.3, 0.5),
    ("dark", -0.15, 0.4),
    ("thick", -0.1, 0.3),
    ("thin", -0.4, 0.4),
    ("compact", 0.1, 0.3),
    ("creamy", 0.4, 0.6),
    ("rich", 0.375, 0.625),
    ("light", 0.4, 0.7),
    ("golden", 0.3, 0.5),
    // aroma / taste
    ("fresh", 0.3, 0.5),
    ("delicious", 1.0, 1.0),
    ("tasty", 0.7, 0.8),
    ("flavorful", 0.6, 0.7),
    ("fruity", 0.3, 0.5),
    ("sweet", 0.35, 0.65),
    ("bitter", -0.1, 0.4),
    ("sour", -0.3, 0.5),
    ("tart", 0.1, 0.4),
    ("complex", -0.1, 0.4),
    ("balanced", 0.5, 0.6),
    ("smooth", 0.4, 0.6),
    ("crisp", 0.5, 0.6),
    ("refreshing", 0.5, 0.6),
    ("clean", 0.3667, 0.6833),
    ("bland", -0.5, 0.7),
    ("watery", -0.6, 0.7),
    ("weak", -0.375, 0.625),
    ("flat", -0.4, 0.5),
    ("stale", -0.6, 0.6),
    ("skunky", -0.7, 0.8),
    ("metallic", -0.4, 0.5),
    ("harsh", -0.5, 0.6),
    ("off", -0.2, 0.3),
    ("cloying", -0.6, 0.8),
    ("syrupy", -0.4, 0.6),
    ("astringent", -0.4, 0.6),
    ("medicinal", -0.5, 0.6),
    ("funky", 0.1, 0.6),
    ("drinkable", 0.4, 0.5),
    // palate
    ("full", 0.35, 0.55),
    ("lively", 0.1364, 0.5),
    ("dry", -0.0667, 0.3667),
    ("sticky", -0.2, 0.5),
    ("oily", -0.2, 0.4),
];

/// Scale factors for words that strengthen or soften the next sentiment word.
const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.3),
    ("extremely", 1.5),
    ("incredibly", 1.5),
    ("super", 1.4),
    ("so", 1.2),
    ("too", 1.2),
    ("quite", 1.1),
    ("fairly", 0.8),
    ("somewhat", 0.6),
    ("slightly", 0.5),
    ("kinda", 0.6),
];

const NEGATORS: &[&str] = &[
    "not", "no", "never", "neither", "nor", "hardly", "barely", "without", "nothing",
];

/// How far back a negator can sit and still flip a sentiment word.
const NEGATION_WINDOW: usize = 3;

static LEXICON: Lazy<HashMap<&'static str, (f64, f64)>> = Lazy::new(|| {
    LEXICON_ENTRIES
        .iter()
        .map(|&(w, p, s)| (w, (p, s)))
        .collect()
});

static INTENSITY: Lazy<HashMap<&'static str, f64>> =
    Lazy::new(|| INTENSIFIERS.iter().copied().collect());

fn is_negator(word: &str) -> bool {
    NEGATORS.contains(&word) || word.ends_with("n't")
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sentiment {
    /// Signed, in [-1, 1].
    pub polarity: f64,
    /// In [0, 1].
    pub subjectivity: f64,
}

/// Lexicon sentiment of `text`.
///
/// Each lexicon word contributes its polarity, scaled by an adjacent
/// intensifier and flipped-and-halved when a negator appears within
/// `NEGATION_WINDOW` words before it (stopping at the previous sentiment
/// word). The result is the mean contribution. Text with no lexicon words
/// is neutral.
pub fn analyze(text: &str) -> Sentiment {
    let tokens: Vec<String> = words(text).collect();

    let mut polarity_sum = 0.0;
    let mut subjectivity_sum = 0.0;
    let mut matched = 0usize;

    for (i, token) in tokens.iter().enumerate() {
        let Some(&(base_polarity, base_subjectivity)) = LEXICON.get(token.as_str()) else {
            continue;
        };

        let mut scale = 1.0;
        let mut negated = false;
        for back in 1..=NEGATION_WINDOW.min(i) {
            let prev = tokens[i - back].as_str();
            if LEXICON.contains_key(prev) {
                break;
            }
            if back == 1 {
                if let Some(&m) = INTENSITY.get(prev) {
                    scale = m;
                    continue;
                }
            }
            if is_negator(prev) {
                negated = true;
                break;
            }
        }

        let mut polarity = (base_polarity * scale).clamp(-1.0, 1.0);
        if negated {
            polarity *= -0.5;
        }
        polarity_sum += polarity;
        subjectivity_sum += (base_subjectivity * scale).clamp(0.0, 1.0);
        matched += 1;
    }

    if matched == 0 {
        return Sentiment::default();
    }
    let n = matched as f64;
    Sentiment {
        polarity: (polarity_sum / n).clamp(-1.0, 1.0),
        subjectivity: (subjectivity_sum / n).clamp(0.0, 1.0),
    }
}

/// Sentiment polarity scorer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Polarity;

impl Scorer for Polarity {
    fn score(&self, text: &str) -> f64 {
        analyze(text).polarity
    }
}

/// Sentiment subjectivity scorer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Subjectivity;

impl Scorer for Subjectivity {
    fn score(&self, text: &str) -> f64 {
        analyze(text).subjectivity
    }
}
