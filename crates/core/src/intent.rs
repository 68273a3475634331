use regex::Regex;
use thiserror::Error;

use crate::models::{ClassificationResult, Language};

pub const MATCH_CONFIDENCE: f32 = 0.85;
pub const FALLBACK_CONFIDENCE: f32 = 0.6;
pub const FALLBACK_INTENT: &str = "general";

pub fn normalize_text(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

pub fn detect_language(explicit: Option<Language>, text: &str) -> Language {
    if let Some(language) = explicit {
        if language != Language::Unknown {
            return language;
        }
    }

    let mut devanagari_count = 0usize;
    let mut latin_count = 0usize;

    for ch in text.chars() {
        let code = ch as u32;
        if (0x0900..=0x097F).contains(&code) {
            devanagari_count += 1;
        } else if ch.is_ascii_alphabetic() {
            latin_count += 1;
        }
    }

    if devanagari_count > latin_count && devanagari_count > 0 {
        Language::Hi
    } else if latin_count > 0 {
        Language::En
    } else {
        Language::Hi
    }
}

#[derive(Debug, Error)]
pub enum RuleTableError {
    #[error("duplicate intent label in rule table: {0}")]
    DuplicateIntent(String),
    #[error("`general` is reserved for the no-match fallback")]
    ReservedIntent,
    #[error("invalid pattern for intent {intent}: {source}")]
    InvalidPattern {
        intent: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Clone)]
pub struct IntentRule {
    label: String,
    pattern: Regex,
}

impl IntentRule {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

/// Maps free text to a named intent by searching an ordered table of
/// patterns against the lowercased input. First registered match wins;
/// a query mentioning both rain and mandi resolves to whichever rule
/// was registered earlier, not to the "best" match.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    rules: Vec<IntentRule>,
}

impl IntentClassifier {
    pub fn new<I, S, P>(rules: I) -> Result<Self, RuleTableError>
    where
        I: IntoIterator<Item = (S, P)>,
        S: Into<String>,
        P: AsRef<str>,
    {
        let mut table = Vec::new();

        for (label, pattern) in rules {
            let label = label.into();
            if label == FALLBACK_INTENT {
                return Err(RuleTableError::ReservedIntent);
            }
            if table.iter().any(|rule: &IntentRule| rule.label == label) {
                return Err(RuleTableError::DuplicateIntent(label));
            }

            let pattern =
                Regex::new(pattern.as_ref()).map_err(|source| RuleTableError::InvalidPattern {
                    intent: label.clone(),
                    source,
                })?;

            table.push(IntentRule { label, pattern });
        }

        Ok(Self { rules: table })
    }

    pub fn with_default_rules() -> Self {
        Self::new([
            ("weather", "barish|rain|mausam|weather|paani|water"),
            ("market", "mandi|price|rate|bhav|market|sell|bechna"),
            ("fertilizer", "khad|fertilizer|urvarak|nutrients"),
            ("pest", "keeda|pest|insect|disease|bimari"),
            ("scheme", "yojana|scheme|subsidy|government|sarkar"),
        ])
        .expect("default rule table is valid")
    }

    pub fn rules(&self) -> &[IntentRule] {
        &self.rules
    }

    pub fn classify(&self, text: &str) -> ClassificationResult {
        let lower = text.to_lowercase();

        for rule in &self.rules {
            if rule.pattern.is_match(&lower) {
                return ClassificationResult {
                    intent: rule.label.clone(),
                    confidence: MATCH_CONFIDENCE,
                };
            }
        }

        ClassificationResult {
            intent: FALLBACK_INTENT.to_string(),
            confidence: FALLBACK_CONFIDENCE,
        }
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::with_default_rules()
    }
}
