mod generate;

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use krishi_core::{
    compose::default_sources, detect_language, extract_entities, normalize_text, AdvisoryReply,
    ClassificationResult, IntentClassifier, Language, QueryInput, ResponseComposer,
};
use krishi_knowledge::KnowledgeBase;
use krishi_observability::AppMetrics;
use tracing::{info, instrument};

pub use generate::GeneratedAdvice;

/// Query-in, reply-out advisory pipeline: normalize, resolve language,
/// classify intent, extract entities, retrieve knowledge context, then
/// generate intent-specific advice (falling back to the templated
/// composer). Stateless per call; safe to share behind `Arc`.
#[derive(Clone)]
pub struct AdvisoryEngine {
    classifier: IntentClassifier,
    composer: ResponseComposer,
    knowledge: Arc<KnowledgeBase>,
    metrics: Arc<AppMetrics>,
}

impl AdvisoryEngine {
    pub fn new(
        classifier: IntentClassifier,
        composer: ResponseComposer,
        knowledge: Arc<KnowledgeBase>,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        Self {
            classifier,
            composer,
            knowledge,
            metrics,
        }
    }

    pub fn with_defaults(metrics: Arc<AppMetrics>) -> Self {
        Self::new(
            IntentClassifier::with_default_rules(),
            ResponseComposer::with_default_facts(),
            Arc::new(KnowledgeBase::builtin()),
            metrics,
        )
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn classify(&self, text: &str) -> ClassificationResult {
        self.classifier.classify(&normalize_text(text))
    }

    #[instrument(skip(self, input))]
    pub fn advise(&self, input: QueryInput) -> AdvisoryReply {
        let started = Instant::now();
        self.metrics.inc_query();

        let normalized = normalize_text(&input.text);
        let explicit = Language::from_optional_str(input.language.as_deref());
        let language = detect_language(Some(explicit), &normalized);

        let classification = self.classifier.classify(&normalized);
        let entities = extract_entities(&normalized);

        let context = self
            .knowledge
            .retrieve_context(&classification.intent, &entities);
        self.metrics
            .add_knowledge_hits(context.facts.len() + context.recommendations.len());

        let generated = generate::intent_advice(
            &classification.intent,
            &entities,
            &input.conditions,
            &self.knowledge,
        );

        let reply = match generated {
            Some(advice) => {
                let mut action_items = advice.action_items;
                action_items.extend(context.recommendations);

                let sources = if context.sources.is_empty() {
                    default_sources()
                } else {
                    context.sources
                };

                AdvisoryReply {
                    advice: advice.advice,
                    facts: context.facts,
                    action_items,
                    warnings: advice.warnings,
                    confidence: advice.confidence,
                    intent: classification.intent,
                    intent_confidence: classification.confidence,
                    sources,
                    language,
                    entities,
                    generated_at: Utc::now(),
                }
            }
            None => {
                self.metrics.inc_fallback();
                let response =
                    self.composer
                        .compose(&classification.intent, &normalized, &input.conditions);

                AdvisoryReply {
                    advice: response.advice,
                    facts: context.facts,
                    action_items: context.recommendations,
                    warnings: Vec::new(),
                    confidence: response.confidence,
                    intent: classification.intent,
                    intent_confidence: classification.confidence,
                    sources: response.sources,
                    language,
                    entities,
                    generated_at: Utc::now(),
                }
            }
        };

        self.metrics.observe_latency(started.elapsed());
        info!(
            intent = %reply.intent,
            language = %reply.language.as_code(),
            facts = reply.facts.len(),
            "query handled"
        );

        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn engine() -> AdvisoryEngine {
        AdvisoryEngine::with_defaults(AppMetrics::shared())
    }

    fn input(text: &str) -> QueryInput {
        QueryInput {
            text: text.to_string(),
            language: None,
            conditions: Default::default(),
        }
    }

    #[test]
    fn fertilizer_query_pulls_crop_knowledge() {
        let reply = engine().advise(input("Gehun ke liye khad batao"));
        assert_eq!(reply.intent, "fertilizer");
        assert_eq!(reply.entities.crop.as_deref(), Some("wheat"));
        assert!(reply.advice.contains("NPK 120:60:40"));
        assert!(reply
            .sources
            .contains(&"Crop Database - Wheat".to_string()));
    }

    #[test]
    fn small_talk_falls_back_to_template() {
        let reply = engine().advise(input("Hello, how are you?"));
        assert_eq!(reply.intent, "general");
        assert_eq!(reply.intent_confidence, 0.6);
        assert_eq!(reply.advice, "Based on general analysis: Hello, how are you?");
        assert_eq!(reply.sources, vec!["Agricultural Database", "Weather API"]);
    }

    #[test]
    fn weather_reply_uses_supplied_conditions() {
        let mut query = input("Kal barish hogi kya?");
        query.conditions = json!({ "temperature": 31, "humidity": 85 })
            .as_object()
            .cloned()
            .unwrap();

        let reply = engine().advise(query);
        assert_eq!(reply.intent, "weather");
        assert_eq!(reply.confidence, 0.9);
        assert!(reply.advice.contains("85"));
        assert!(reply
            .action_items
            .iter()
            .any(|item| item.contains("Skip irrigation")));
    }

    #[test]
    fn metrics_track_queries_and_fallbacks() {
        let metrics = AppMetrics::shared();
        let engine = AdvisoryEngine::with_defaults(metrics.clone());

        engine.advise(input("mandi bhav"));
        engine.advise(input("namaste"));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.queries_total, 2);
        assert_eq!(snapshot.fallback_total, 1);
    }
}
