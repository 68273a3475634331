use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::Response;

pub const RESPONSE_CONFIDENCE: f32 = 0.85;

const DEFAULT_SOURCES: [&str; 2] = ["Agricultural Database", "Weather API"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropFacts {
    pub fertilizer: String,
    pub season: String,
}

/// Builds the templated advisory response. The crop table is held for
/// future per-crop lookups; the compose path does not read it yet.
#[derive(Debug, Clone)]
pub struct ResponseComposer {
    crop_facts: Vec<(String, CropFacts)>,
}

impl ResponseComposer {
    pub fn new(crop_facts: Vec<(String, CropFacts)>) -> Self {
        Self { crop_facts }
    }

    pub fn with_default_facts() -> Self {
        Self::new(vec![
            (
                "wheat".to_string(),
                CropFacts {
                    fertilizer: "NPK 120:60:40 kg/hectare".to_string(),
                    season: "Rabi".to_string(),
                },
            ),
            (
                "rice".to_string(),
                CropFacts {
                    fertilizer: "NPK 100:50:50 kg/hectare".to_string(),
                    season: "Kharif".to_string(),
                },
            ),
        ])
    }

    pub fn crop_facts(&self, crop: &str) -> Option<&CropFacts> {
        let key = crop.trim().to_lowercase();
        self.crop_facts
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, facts)| facts)
    }

    /// Total over all inputs: any intent label is accepted (the composer
    /// does not validate against the classifier's rule set), the query is
    /// embedded verbatim, and the context map is reserved for enrichment.
    pub fn compose(&self, intent: &str, query: &str, _context: &Map<String, Value>) -> Response {
        Response {
            advice: format!("Based on {intent} analysis: {query}"),
            confidence: RESPONSE_CONFIDENCE,
            sources: default_sources(),
        }
    }
}

impl Default for ResponseComposer {
    fn default() -> Self {
        Self::with_default_facts()
    }
}

pub fn default_sources() -> Vec<String> {
    DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect()
}
