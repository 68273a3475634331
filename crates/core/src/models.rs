use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Hi,
    En,
    Pa,
    Bn,
    Te,
    Mr,
    Gu,
    Ta,
    Unknown,
}

impl Language {
    pub fn from_optional_str(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()) {
            Some(v) if v == "hi" || v == "hi-in" || v == "hindi" => Self::Hi,
            Some(v) if v == "en" || v == "en-in" || v == "english" => Self::En,
            Some(v) if v == "pa" || v == "punjabi" => Self::Pa,
            Some(v) if v == "bn" || v == "bengali" => Self::Bn,
            Some(v) if v == "te" || v == "telugu" => Self::Te,
            Some(v) if v == "mr" || v == "marathi" => Self::Mr,
            Some(v) if v == "gu" || v == "gujarati" => Self::Gu,
            Some(v) if v == "ta" || v == "tamil" => Self::Ta,
            _ => Self::Unknown,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::Hi => "hi",
            Self::En => "en",
            Self::Pa => "pa",
            Self::Bn => "bn",
            Self::Te => "te",
            Self::Mr => "mr",
            Self::Gu => "gu",
            Self::Ta => "ta",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub intent: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryEntities {
    pub crop: Option<String>,
    pub location: Option<String>,
    pub quantity: Option<u32>,
    pub unit: Option<String>,
}

impl QueryEntities {
    pub fn is_empty(&self) -> bool {
        self.crop.is_none()
            && self.location.is_none()
            && self.quantity.is_none()
            && self.unit.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub advice: String,
    pub confidence: f32,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryInput {
    pub text: String,
    pub language: Option<String>,
    #[serde(default)]
    pub conditions: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisoryReply {
    pub advice: String,
    pub facts: Vec<String>,
    pub action_items: Vec<String>,
    pub warnings: Vec<String>,
    pub confidence: f32,
    pub intent: String,
    pub intent_confidence: f32,
    pub sources: Vec<String>,
    pub language: Language,
    pub entities: QueryEntities,
    pub generated_at: DateTime<Utc>,
}
