//! Lexicon sentiment scoring, emotion buckets and urgency detection.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    VeryPositive,
    Positive,
    Neutral,
    Negative,
    VeryNegative,
}

impl Emotion {
    /// Buckets are half-open `[lo, hi)`; the top bucket also takes 1.0.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.5 {
            Emotion::VeryPositive
        } else if score >= 0.1 {
            Emotion::Positive
        } else if score >= -0.1 {
            Emotion::Neutral
        } else if score >= -0.5 {
            Emotion::Negative
        } else {
            Emotion::VeryNegative
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::VeryPositive => "very_positive",
            Emotion::Positive => "positive",
            Emotion::Neutral => "neutral",
            Emotion::Negative => "negative",
            Emotion::VeryNegative => "very_negative",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sentiment {
    /// Polarity in [-1, 1], rounded to 4 places.
    pub score: f64,
    pub emotion: Emotion,
    pub is_urgent: bool,
}

const LEXICON: &[(&str, f64)] = &[
    // positive
    ("good", 0.7),
    ("great", 0.8),
    ("excellent", 1.0),
    ("amazing", 0.6),
    ("awesome", 1.0),
    ("wonderful", 1.0),
    ("fantastic", 0.4),
    ("perfect", 1.0),
    ("best", 1.0),
    ("love", 0.5),
    ("loved", 0.7),
    ("like", 0.2),
    ("nice", 0.6),
    ("happy", 0.8),
    ("glad", 0.5),
    ("pleased", 0.5),
    ("satisfied", 0.5),
    ("thanks", 0.2),
    ("thank", 0.2),
    ("helpful", 0.5),
    ("kind", 0.6),
    ("fast", 0.2),
    ("quick", 0.33),
    ("easy", 0.43),
    ("beautiful", 0.85),
    ("brilliant", 0.9),
    ("superb", 1.0),
    ("fine", 0.42),
    ("okay", 0.5),
    ("cool", 0.35),
    ("fun", 0.3),
    ("enjoy", 0.4),
    ("enjoyed", 0.4),
    ("recommend", 0.3),
    ("impressed", 0.7),
    ("friendly", 0.4),
    ("smooth", 0.4),
    ("resolved", 0.3),
    ("appreciate", 0.5),
    ("better", 0.5),
    ("positive", 0.23),
    ("delighted", 0.9),
    ("grateful", 0.7),
    ("excited", 0.6),
    ("reliable", 0.4),
    // negative
    ("bad", -0.7),
    ("terrible", -1.0),
    ("awful", -1.0),
    ("horrible", -1.0),
    ("worst", -1.0),
    ("worse", -0.4),
    ("poor", -0.4),
    ("hate", -0.8),
    ("hated", -0.9),
    ("angry", -0.5),
    ("mad", -0.62),
    ("furious", -0.9),
    ("annoyed", -0.5),
    ("annoying", -0.8),
    ("frustrated", -0.7),
    ("frustrating", -0.7),
    ("disappointed", -0.75),
    ("disappointing", -0.6),
    ("upset", -0.6),
    ("sad", -0.5),
    ("unhappy", -0.6),
    ("broken", -0.4),
    ("damaged", -0.5),
    ("wrong", -0.5),
    ("late", -0.3),
    ("slow", -0.3),
    ("useless", -0.5),
    ("stupid", -0.8),
    ("ridiculous", -0.33),
    ("unacceptable", -0.8),
    ("rude", -0.6),
    ("problem", -0.3),
    ("issue", -0.2),
    ("fail", -0.5),
    ("failed", -0.5),
    ("error", -0.3),
    ("missing", -0.2),
    ("lost", -0.3),
    ("scam", -0.8),
    ("fraud", -0.7),
    ("waste", -0.5),
    ("sick", -0.71),
    ("scared", -0.6),
    ("worried", -0.4),
    ("difficult", -0.5),
    ("confusing", -0.4),
    ("expensive", -0.3),
    ("dirty", -0.6),
    ("cancel", -0.1),
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.3),
    ("extremely", 1.5),
    ("incredibly", 1.5),
    ("absolutely", 1.4),
    ("totally", 1.3),
    ("so", 1.3),
    ("super", 1.3),
    ("too", 1.2),
    ("quite", 1.1),
    ("pretty", 1.1),
    ("somewhat", 0.7),
    ("slightly", 0.5),
    ("barely", 0.4),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nothing", "hardly", "cannot", "without", "nobody",
];

/// Tokens after a negator that still fall under its scope.
const NEGATION_WINDOW: usize = 3;

/// Urgency keywords, English plus romanised Hindi.
const URGENCY_KEYWORDS: &[&str] = &[
    "urgent", "emergency", "immediately", "asap", "critical", "help me", "right now", "dying",
    "danger", "fire", "accident", "police", "ambulance", "hospital", "threat", "deadline", "now",
    "turant", "jaldi", "madad", "bachao",
];

static LEXICON_MAP: Lazy<HashMap<&'static str, f64>> =
    Lazy::new(|| LEXICON.iter().copied().collect());

static INTENSIFIER_MAP: Lazy<HashMap<&'static str, f64>> =
    Lazy::new(|| INTENSIFIERS.iter().copied().collect());

static WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z]+(?:'[a-z]+)?").expect("built-in pattern must compile"));

static URGENCY: Lazy<Regex> = Lazy::new(|| {
    let alternation = URGENCY_KEYWORDS
        .iter()
        .map(|k| regex::escape(k).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{alternation})\b")).expect("built-in pattern must compile")
});

fn is_negation(token: &str) -> bool {
    NEGATIONS.contains(&token) || token.ends_with("n't")
}

/// Mean polarity of the sentiment-bearing words, in [-1, 1].
pub fn polarity(text: &str) -> f64 {
    let lower = text.to_lowercase();
    let tokens: Vec<&str> = WORD.find_iter(&lower).map(|m| m.as_str()).collect();

    let mut scores = Vec::new();
    let mut last_negation: Option<usize> = None;

    for (i, token) in tokens.iter().enumerate() {
        if is_negation(token) {
            last_negation = Some(i);
            continue;
        }

        let Some(&base) = LEXICON_MAP.get(token) else {
            continue;
        };

        let mut score = base;
        if let Some(&boost) = i
            .checked_sub(1)
            .and_then(|j| INTENSIFIER_MAP.get(tokens[j]))
        {
            score *= boost;
        }
        if last_negation.is_some_and(|n| i - n <= NEGATION_WINDOW) {
            score *= -0.5;
        }
        scores.push(score.clamp(-1.0, 1.0));
    }

    if scores.is_empty() {
        return 0.0;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    mean.clamp(-1.0, 1.0)
}

pub fn is_urgent(text: &str) -> bool {
    URGENCY.is_match(&text.to_lowercase())
}

/// Score, bucket and urgency flag for one message.
pub fn analyze(text: &str) -> Sentiment {
    let score = (polarity(text) * 10_000.0).round() / 10_000.0;
    let sentiment = Sentiment {
        score,
        emotion: Emotion::from_score(score),
        is_urgent: is_urgent(text),
    };
    tracing::debug!(
        score = sentiment.score,
        emotion = sentiment.emotion.as_str(),
        urgent = sentiment.is_urgent,
        "Sentiment"
    );
    sentiment
}
