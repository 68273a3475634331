use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use krishi_core::QueryEntities;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRecord {
    pub sowing_season: String,
    pub harvesting: String,
    pub water_requirement: String,
    pub fertilizer: String,
    pub varieties: Vec<String>,
    pub diseases: Vec<String>,
    pub ideal_temp: String,
    pub soil_ph: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherGuidelines {
    pub irrigation: Vec<String>,
    pub spraying: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketInsights {
    pub price_factors: Vec<String>,
    pub selling_tips: Vec<String>,
}

/// Partial knowledge file. Crop entries are merged over the builtin set;
/// guideline and insight blocks replace it wholesale when present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KnowledgeFragment {
    #[serde(default)]
    pub crops: BTreeMap<String, CropRecord>,
    pub weather_guidelines: Option<WeatherGuidelines>,
    pub market_insights: Option<MarketInsights>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievedContext {
    pub facts: Vec<String>,
    pub recommendations: Vec<String>,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct KnowledgeStats {
    pub crops_loaded: usize,
    pub fragments_merged: usize,
}

#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    crops: BTreeMap<String, CropRecord>,
    weather_guidelines: WeatherGuidelines,
    market_insights: MarketInsights,
    fragments_merged: usize,
}

impl KnowledgeBase {
    pub fn builtin() -> Self {
        let mut crops = BTreeMap::new();
        crops.insert(
            "wheat".to_string(),
            CropRecord {
                sowing_season: "Rabi (October-December)".to_string(),
                harvesting: "April-May".to_string(),
                water_requirement: "Medium (4-6 irrigations)".to_string(),
                fertilizer: "NPK 120:60:40 kg/hectare".to_string(),
                varieties: vec![
                    "HD-2967".to_string(),
                    "PBW-343".to_string(),
                    "DBW-17".to_string(),
                ],
                diseases: vec![
                    "Rust".to_string(),
                    "Bunt".to_string(),
                    "Leaf blight".to_string(),
                ],
                ideal_temp: "15-25°C".to_string(),
                soil_ph: "6.0-7.5".to_string(),
            },
        );
        crops.insert(
            "rice".to_string(),
            CropRecord {
                sowing_season: "Kharif (May-July)".to_string(),
                harvesting: "October-December".to_string(),
                water_requirement: "High (standing water)".to_string(),
                fertilizer: "NPK 100:50:50 kg/hectare".to_string(),
                varieties: vec![
                    "Pusa-44".to_string(),
                    "IR-64".to_string(),
                    "Swarna".to_string(),
                ],
                diseases: vec![
                    "Blast".to_string(),
                    "Sheath blight".to_string(),
                    "Brown spot".to_string(),
                ],
                ideal_temp: "20-35°C".to_string(),
                soil_ph: "5.5-7.0".to_string(),
            },
        );

        Self {
            crops,
            weather_guidelines: WeatherGuidelines {
                irrigation: vec![
                    "Delay irrigation if humidity >80%".to_string(),
                    "Skip irrigation if rain expected within 24 hours".to_string(),
                    "Best irrigation time: early morning or evening".to_string(),
                ],
                spraying: vec![
                    "Avoid spraying if wind speed >10 km/h".to_string(),
                    "Spray when temperature <30°C".to_string(),
                    "Best humidity range: 60-80%".to_string(),
                ],
            },
            market_insights: MarketInsights {
                price_factors: vec![
                    "Seasonal demand".to_string(),
                    "Weather conditions".to_string(),
                    "Government procurement".to_string(),
                    "Export policies".to_string(),
                    "Storage capacity".to_string(),
                ],
                selling_tips: vec![
                    "Monitor MSP announcements".to_string(),
                    "Check multiple mandis".to_string(),
                    "Consider storage costs".to_string(),
                    "Track festival seasons".to_string(),
                ],
            },
            fragments_merged: 0,
        }
    }

    /// Builtin data extended by every `*.json` fragment found under `root`.
    pub fn from_dir(root: impl AsRef<Path>) -> Result<Self> {
        let mut kb = Self::builtin();

        for entry in WalkDir::new(root.as_ref())
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry.path().extension().and_then(|ext| ext.to_str()) == Some("json")
            })
        {
            let path = entry.path();
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed reading knowledge fragment: {}", path.display()))?;
            let fragment: KnowledgeFragment = serde_json::from_str(&raw)
                .with_context(|| format!("failed parsing knowledge fragment: {}", path.display()))?;

            kb.merge(fragment);
        }

        Ok(kb)
    }

    pub fn merge(&mut self, fragment: KnowledgeFragment) {
        for (name, record) in fragment.crops {
            self.crops.insert(name.trim().to_lowercase(), record);
        }
        if let Some(guidelines) = fragment.weather_guidelines {
            self.weather_guidelines = guidelines;
        }
        if let Some(insights) = fragment.market_insights {
            self.market_insights = insights;
        }
        self.fragments_merged += 1;
    }

    pub fn stats(&self) -> KnowledgeStats {
        KnowledgeStats {
            crops_loaded: self.crops.len(),
            fragments_merged: self.fragments_merged,
        }
    }

    pub fn crop(&self, name: &str) -> Option<&CropRecord> {
        self.crops.get(&name.trim().to_lowercase())
    }

    pub fn crop_names(&self) -> impl Iterator<Item = &str> {
        self.crops.keys().map(String::as_str)
    }

    pub fn weather_guidelines(&self) -> &WeatherGuidelines {
        &self.weather_guidelines
    }

    pub fn market_insights(&self) -> &MarketInsights {
        &self.market_insights
    }

    /// Collects crop facts and intent-specific guidance for a query.
    pub fn retrieve_context(&self, intent: &str, entities: &QueryEntities) -> RetrievedContext {
        let mut context = RetrievedContext::default();

        if let Some(crop) = entities.crop.as_deref() {
            if let Some(record) = self.crop(crop) {
                context.facts.push(format!("Sowing season: {}", record.sowing_season));
                context
                    .facts
                    .push(format!("Water requirement: {}", record.water_requirement));
                context
                    .facts
                    .push(format!("Recommended fertilizer: {}", record.fertilizer));
                context
                    .sources
                    .push(format!("Crop Database - {}", title_case(crop)));
            }
        }

        match intent {
            "weather" | "irrigation" => {
                context
                    .recommendations
                    .extend(self.weather_guidelines.irrigation.iter().cloned());
                context.sources.push("Irrigation Best Practices".to_string());
            }
            "market" => {
                context
                    .facts
                    .extend(self.market_insights.selling_tips.iter().cloned());
                context.sources.push("Market Intelligence".to_string());
            }
            "pest" => {
                context
                    .recommendations
                    .extend(self.weather_guidelines.spraying.iter().cloned());
                context.sources.push("Spray Advisory Guidelines".to_string());
            }
            _ => {}
        }

        context
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::builtin()
    }
}

fn title_case(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_seeds_wheat_and_rice() {
        let kb = KnowledgeBase::builtin();
        assert!(kb.crop("wheat").is_some());
        assert!(kb.crop("RICE").is_some());
        assert_eq!(kb.stats().crops_loaded, 2);
    }

    #[test]
    fn crop_context_includes_fertilizer_fact() {
        let kb = KnowledgeBase::builtin();
        let entities = QueryEntities {
            crop: Some("wheat".to_string()),
            ..Default::default()
        };
        let context = kb.retrieve_context("fertilizer", &entities);
        assert!(context
            .facts
            .iter()
            .any(|fact| fact.contains("NPK 120:60:40")));
        assert!(context.sources.contains(&"Crop Database - Wheat".to_string()));
    }

    #[test]
    fn market_intent_pulls_selling_tips() {
        let kb = KnowledgeBase::builtin();
        let context = kb.retrieve_context("market", &QueryEntities::default());
        assert!(context.facts.iter().any(|fact| fact.contains("MSP")));
        assert_eq!(context.sources, vec!["Market Intelligence".to_string()]);
    }

    #[test]
    fn unknown_intent_without_crop_yields_empty_context() {
        let kb = KnowledgeBase::builtin();
        let context = kb.retrieve_context("general", &QueryEntities::default());
        assert_eq!(context, RetrievedContext::default());
    }

    #[test]
    fn fragment_merge_overrides_crop_entries() {
        let mut kb = KnowledgeBase::builtin();
        let fragment: KnowledgeFragment = serde_json::from_value(serde_json::json!({
            "crops": {
                "Cotton": {
                    "sowing_season": "Kharif (April-May)",
                    "harvesting": "October-January",
                    "water_requirement": "Medium",
                    "fertilizer": "NPK 80:40:40 kg/hectare",
                    "varieties": ["Bt-1"],
                    "diseases": ["Bollworm damage"],
                    "ideal_temp": "21-30°C",
                    "soil_ph": "6.0-8.0"
                }
            }
        }))
        .expect("fragment parses");

        kb.merge(fragment);
        assert!(kb.crop("cotton").is_some());
        assert_eq!(kb.stats().crops_loaded, 3);
        assert_eq!(kb.stats().fragments_merged, 1);
    }
}
