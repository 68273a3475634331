use krishi_core::QueryEntities;
use krishi_knowledge::KnowledgeBase;
use serde_json::{Map, Value};

#[derive(Debug, Clone)]
pub struct GeneratedAdvice {
    pub advice: String,
    pub action_items: Vec<String>,
    pub warnings: Vec<String>,
    pub confidence: f32,
}

/// Intent-specific advice built from field conditions and the knowledge
/// base. Returns `None` for intents without a dedicated generator, in
/// which case the caller falls back to the templated composer.
pub fn intent_advice(
    intent: &str,
    entities: &QueryEntities,
    conditions: &Map<String, Value>,
    knowledge: &KnowledgeBase,
) -> Option<GeneratedAdvice> {
    match intent {
        "weather" | "irrigation" => Some(weather_advice(conditions)),
        "market" => Some(market_advice(entities, conditions)),
        "fertilizer" => Some(fertilizer_advice(entities, conditions, knowledge)),
        "pest" => Some(pest_advice(entities, conditions)),
        "scheme" => Some(scheme_advice()),
        _ => None,
    }
}

fn weather_advice(conditions: &Map<String, Value>) -> GeneratedAdvice {
    let temperature = number(conditions, "temperature", 25.0);
    let humidity = number(conditions, "humidity", 60.0);

    let mut advice = format!("Current conditions: {temperature}°C, {humidity}% humidity. ");

    let action_items = if humidity > 80.0 {
        advice.push_str("High humidity detected. Delay irrigation and avoid fungicide spray.");
        vec![
            "Skip irrigation today".to_string(),
            "Monitor for fungal diseases".to_string(),
        ]
    } else if humidity < 40.0 {
        advice.push_str("Low humidity. Increase irrigation frequency.");
        vec![
            "Provide extra watering".to_string(),
            "Mulch around plants".to_string(),
        ]
    } else {
        advice.push_str("Good conditions for normal farming activities.");
        vec![
            "Continue regular irrigation".to_string(),
            "Good time for field operations".to_string(),
        ]
    };

    GeneratedAdvice {
        advice,
        action_items,
        warnings: Vec::new(),
        confidence: 0.9,
    }
}

fn market_advice(entities: &QueryEntities, conditions: &Map<String, Value>) -> GeneratedAdvice {
    let crop = entities.crop.as_deref().unwrap_or("your crop");
    let price = number(conditions, "price", 0.0);
    let change = conditions
        .get("change")
        .and_then(Value::as_str)
        .unwrap_or("N/A");

    let mut advice = format!("Current {crop} price: ₹{price}/quintal ({change}). ");

    let action_items = if change.contains('+') {
        advice.push_str("Prices are rising. Good time to sell.");
        vec![
            "Sell immediately if ready".to_string(),
            "Check nearby mandis for best rates".to_string(),
        ]
    } else {
        advice.push_str("Prices declining. Consider waiting if possible.");
        vec![
            "Store safely if possible".to_string(),
            "Monitor price trends for 1 week".to_string(),
        ]
    };

    GeneratedAdvice {
        advice,
        action_items,
        warnings: Vec::new(),
        confidence: 0.8,
    }
}

fn fertilizer_advice(
    entities: &QueryEntities,
    conditions: &Map<String, Value>,
    knowledge: &KnowledgeBase,
) -> GeneratedAdvice {
    let crop = entities.crop.as_deref().unwrap_or("wheat");

    let (advice, action_items) = match knowledge.crop(crop) {
        Some(record) => {
            let mut advice = format!("For {crop}: Apply {}. ", record.fertilizer);
            let temperature = number(conditions, "temperature", 25.0);

            let actions = if temperature > 30.0 {
                advice.push_str("High temperature - apply in evening.");
                vec![
                    "Apply after 5 PM".to_string(),
                    "Water lightly after application".to_string(),
                ]
            } else {
                advice.push_str("Good conditions for fertilizer application.");
                vec![
                    "Apply in morning hours".to_string(),
                    "Incorporate into soil".to_string(),
                ]
            };

            (advice, actions)
        }
        None => (
            "General fertilizer recommendation: NPK 120:60:60 kg/hectare".to_string(),
            vec![
                "Soil test recommended".to_string(),
                "Split application advised".to_string(),
            ],
        ),
    };

    GeneratedAdvice {
        advice,
        action_items,
        warnings: Vec::new(),
        confidence: 0.85,
    }
}

fn pest_advice(entities: &QueryEntities, conditions: &Map<String, Value>) -> GeneratedAdvice {
    let crop = entities.crop.as_deref().unwrap_or("crop");
    let humidity = number(conditions, "humidity", 60.0);

    let mut advice = format!("For {crop} pest management: Regular monitoring essential. ");

    let action_items = if humidity > 75.0 {
        advice.push_str("High humidity increases fungal disease risk.");
        vec![
            "Spray preventive fungicide".to_string(),
            "Improve air circulation".to_string(),
        ]
    } else {
        advice.push_str("Current conditions moderate for pest activity.");
        vec![
            "Weekly field monitoring".to_string(),
            "Use pheromone traps".to_string(),
        ]
    };

    GeneratedAdvice {
        advice,
        action_items,
        warnings: vec![
            "Always read pesticide labels".to_string(),
            "Use protective equipment while spraying".to_string(),
        ],
        confidence: 0.85,
    }
}

fn scheme_advice() -> GeneratedAdvice {
    GeneratedAdvice {
        advice: "Key schemes: PM-KISAN gives ₹6000/year direct support, KCC provides crop \
                 loans at subsidised interest, and PMFBY covers crop insurance. "
            .to_string()
            + "Registration needs Aadhaar and land records.",
        action_items: vec![
            "Visit the nearest Common Service Centre with Aadhaar and land records".to_string(),
            "Check PM-KISAN registration status online".to_string(),
        ],
        warnings: Vec::new(),
        confidence: 0.85,
    }
}

fn number(conditions: &Map<String, Value>, key: &str, default: f64) -> f64 {
    conditions.get(key).and_then(Value::as_f64).unwrap_or(default)
}
