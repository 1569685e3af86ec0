//! Free-text polarity behind a single-method capability.

/// Scores free text on a polarity scale of `[-1, 1]`.
pub trait SentimentScorer: Send + Sync {
    fn score(&self, text: &str) -> f64;
}

/// Five-step bucket used by burnout risk: strongly positive text maps to 1,
/// strongly negative text to 5.
pub fn sentiment_bucket(polarity: f64) -> f64 {
    if polarity > 0.4 {
        1.0
    } else if polarity > 0.1 {
        2.0
    } else if polarity > -0.1 {
        3.0
    } else if polarity > -0.4 {
        4.0
    } else {
        5.0
    }
}

/// Returns the same polarity for every input.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FixedSentiment(pub f64);

impl SentimentScorer for FixedSentiment {
    fn score(&self, _text: &str) -> f64 {
        self.0.clamp(-1.0, 1.0)
    }
}

const LEXICON: &[(&str, f64)] = &[
    ("outstanding", 0.5),
    ("excellent", 1.0),
    ("exceptional", 0.67),
    ("exemplary", 0.8),
    ("remarkable", 0.75),
    ("great", 0.8),
    ("good", 0.7),
    ("strong", 0.43),
    ("solid", 0.3),
    ("reliable", 0.4),
    ("dependable", 0.4),
    ("consistent", 0.25),
    ("helpful", 0.5),
    ("proactive", 0.4),
    ("appreciated", 0.5),
    ("innovative", 0.5),
    ("clear", 0.1),
    ("adequate", 0.0),
    ("satisfactory", 0.1),
    ("average", -0.15),
    ("inconsistent", -0.3),
    ("lacking", -0.35),
    ("weak", -0.38),
    ("poor", -0.4),
    ("subpar", -0.5),
    ("bad", -0.7),
    ("terrible", -1.0),
    ("awful", -1.0),
    ("concern", -0.3),
    ("concerns", -0.3),
    ("late", -0.3),
    ("missed", -0.35),
    ("struggles", -0.4),
    ("rude", -0.6),
    ("unreliable", -0.5),
    ("disengaged", -0.5),
    ("exhausted", -0.5),
    ("overworked", -0.5),
];

const NEGATIONS: &[&str] = &["not", "never", "no", "hardly", "isn't", "wasn't", "doesn't", "don't"];
const INTENSIFIERS: &[&str] = &["very", "extremely", "really", "highly", "consistently"];

/// Small word-list scorer: averages the polarity of known words, flipping and
/// damping after a negation and boosting after an intensifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconSentiment;

impl LexiconSentiment {
    fn lookup(word: &str) -> Option<f64> {
        LEXICON
            .iter()
            .find(|(entry, _)| *entry == word)
            .map(|(_, polarity)| *polarity)
    }
}

impl SentimentScorer for LexiconSentiment {
    fn score(&self, text: &str) -> f64 {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| !(c.is_alphabetic() || c == '\''))
            .filter(|token| !token.is_empty())
            .collect();

        let mut matched = 0usize;
        let mut total = 0.0;
        for (index, token) in tokens.iter().enumerate() {
            let Some(mut polarity) = Self::lookup(token) else {
                continue;
            };
            let previous = index.checked_sub(1).map(|prior| tokens[prior]);
            if let Some(previous) = previous {
                if INTENSIFIERS.contains(&previous) {
                    polarity = (polarity * 1.3).clamp(-1.0, 1.0);
                }
            }
            let negated = tokens[index.saturating_sub(2)..index]
                .iter()
                .any(|word| NEGATIONS.contains(word));
            if negated {
                polarity *= -0.5;
            }
            total += polarity;
            matched += 1;
        }

        if matched == 0 {
            return 0.0;
        }
        (total / matched as f64).clamp(-1.0, 1.0)
    }
}
