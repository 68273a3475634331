use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::QueryEntities;

static CROP_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    vec![
        ("wheat", pattern("gehun|wheat|गेहूं")),
        ("rice", pattern("chawal|rice|धान|चावल")),
        ("cotton", pattern("kapas|cotton|कपास")),
        ("sugarcane", pattern("ganna|sugarcane|गन्ना")),
        ("potato", pattern("aloo|potato|आलू")),
        ("tomato", pattern("tamatar|tomato|टमाटर")),
        ("onion", pattern("pyaz|onion|प्याज")),
    ]
});

static LOCATION_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    vec![
        ("delhi", pattern("delhi|दिल्ली")),
        ("punjab", pattern("punjab|पंजाब")),
        ("haryana", pattern("haryana|हरियाणा")),
        ("uttar pradesh", pattern("uttar pradesh|उत्तर प्रदेश")),
        ("bihar", pattern("bihar|बिहार")),
        ("maharashtra", pattern("maharashtra|महाराष्ट्र")),
    ]
});

static QUANTITY_PATTERN: Lazy<Regex> =
    Lazy::new(|| pattern(r"(\d+)\s*(kg|quintal|ton|acre|hectare)"));

fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("valid entity pattern")
}

/// Pulls crop, location, and quantity mentions out of a query. First
/// match per category wins, mirroring the intent tie-break policy.
pub fn extract_entities(text: &str) -> QueryEntities {
    let lower = text.to_lowercase();
    let mut entities = QueryEntities::default();

    for (crop, pattern) in CROP_PATTERNS.iter() {
        if pattern.is_match(&lower) {
            entities.crop = Some((*crop).to_string());
            break;
        }
    }

    for (location, pattern) in LOCATION_PATTERNS.iter() {
        if pattern.is_match(&lower) {
            entities.location = Some((*location).to_string());
            break;
        }
    }

    if let Some(captures) = QUANTITY_PATTERN.captures(&lower) {
        entities.quantity = captures.get(1).and_then(|m| m.as_str().parse().ok());
        entities.unit = captures.get(2).map(|m| m.as_str().to_string());
    }

    entities
}
