use krishi_advisor::AdvisoryEngine;
use krishi_core::{
    IntentClassifier, QueryInput, ResponseComposer, FALLBACK_CONFIDENCE, MATCH_CONFIDENCE,
};
use krishi_observability::AppMetrics;
use serde_json::{json, Map};

fn engine() -> AdvisoryEngine {
    AdvisoryEngine::with_defaults(AppMetrics::shared())
}

fn query(text: &str) -> QueryInput {
    QueryInput {
        text: text.to_string(),
        language: None,
        conditions: Map::new(),
    }
}

#[test]
fn classifier_scenarios_match_contract() {
    let classifier = IntentClassifier::with_default_rules();

    let fertilizer = classifier.classify("Mujhe khad ke baare mein batao");
    assert_eq!(fertilizer.intent, "fertilizer");
    assert_eq!(fertilizer.confidence, MATCH_CONFIDENCE);

    for text in ["Hello, how are you?", ""] {
        let general = classifier.classify(text);
        assert_eq!(general.intent, "general");
        assert_eq!(general.confidence, FALLBACK_CONFIDENCE);
    }
}

#[test]
fn registration_order_breaks_ties() {
    let classifier = IntentClassifier::with_default_rules();

    // "paani" (weather) and "bechna" (market) both occur; weather is
    // registered first so it wins regardless of position in the text.
    let result = classifier.classify("bechna hai lekin pehle paani chahiye");
    assert_eq!(result.intent, "weather");
}

#[test]
fn composer_contract_is_fixed() {
    let composer = ResponseComposer::with_default_facts();
    let response = composer.compose("weather", "Kal barish hoga?", &Map::new());

    assert_eq!(response.advice, "Based on weather analysis: Kal barish hoga?");
    assert_eq!(response.confidence, 0.85);
    assert_eq!(response.sources, vec!["Agricultural Database", "Weather API"]);
}

#[test]
fn end_to_end_market_query_with_conditions() {
    let mut input = query("Punjab mandi mein 50 quintal gehun bechna hai");
    input.conditions = json!({ "price": 2250, "change": "+2.5%" })
        .as_object()
        .cloned()
        .unwrap();

    let reply = engine().advise(input);

    assert_eq!(reply.intent, "market");
    assert_eq!(reply.entities.crop.as_deref(), Some("wheat"));
    assert_eq!(reply.entities.location.as_deref(), Some("punjab"));
    assert_eq!(reply.entities.quantity, Some(50));
    assert!(reply.advice.contains("Good time to sell"));
    assert!(reply.sources.contains(&"Market Intelligence".to_string()));
}

#[test]
fn end_to_end_devanagari_query_detects_hindi() {
    let reply = engine().advise(query("गेहूं की फसल के लिए khad बताओ"));

    assert_eq!(reply.language.as_code(), "hi");
    assert_eq!(reply.intent, "fertilizer");
    assert!(reply.facts.iter().any(|fact| fact.contains("Sowing season")));
}

#[test]
fn explicit_language_code_overrides_detection() {
    let mut input = query("fertilizer advice for rice");
    input.language = Some("ta".to_string());

    let reply = engine().advise(input);
    assert_eq!(reply.language.as_code(), "ta");
}

#[test]
fn pest_reply_carries_safety_warnings_and_spray_guidance() {
    let reply = engine().advise(query("Tamatar mein keeda lag gaya hai"));

    assert_eq!(reply.intent, "pest");
    assert_eq!(reply.entities.crop.as_deref(), Some("tomato"));
    assert!(!reply.warnings.is_empty());
    assert!(reply
        .sources
        .contains(&"Spray Advisory Guidelines".to_string()));
}

#[test]
fn custom_rule_table_changes_priority() {
    let classifier = IntentClassifier::new([
        ("market", "mandi|price|rate|bhav|market|sell|bechna"),
        ("weather", "barish|rain|mausam|weather|paani|water"),
    ])
    .expect("custom table is valid");

    let metrics = AppMetrics::shared();
    let engine = AdvisoryEngine::new(
        classifier,
        ResponseComposer::with_default_facts(),
        std::sync::Arc::new(krishi_knowledge::KnowledgeBase::builtin()),
        metrics,
    );

    // Same overlapping query now resolves to market because the table
    // order was flipped.
    let result = engine.classify("bechna hai lekin pehle paani chahiye");
    assert_eq!(result.intent, "market");
}

#[test]
fn reply_serializes_to_stable_json_shape() {
    let reply = engine().advise(query("sarkari yojana batao"));
    let value = serde_json::to_value(&reply).expect("reply serializes");

    assert_eq!(value["intent"], "scheme");
    assert!(value["advice"].is_string());
    assert!(value["sources"].is_array());
    assert!(value["generated_at"].is_string());
}
