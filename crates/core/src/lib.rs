pub mod compose;
pub mod entities;
pub mod intent;
pub mod models;

pub use compose::{CropFacts, ResponseComposer, RESPONSE_CONFIDENCE};
pub use entities::extract_entities;
pub use intent::{
    detect_language, normalize_text, IntentClassifier, IntentRule, RuleTableError,
    FALLBACK_CONFIDENCE, FALLBACK_INTENT, MATCH_CONFIDENCE,
};
pub use models::*;
