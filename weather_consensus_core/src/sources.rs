use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------
// Source configuration and auto-population of sources from the host's
// entity list.
// ---------------------------------------------------------------------

/// Entity id prefix of weather entities.
pub const WEATHER_DOMAIN_PREFIX: &str = "weather.";

/// At most this many sources are created by auto-detection.
pub const AUTO_DETECT_LIMIT: usize = 5;

/// Weight for sources added without a better hint.
pub const DEFAULT_SOURCE_WEIGHT: u32 = 20;

/// Upper bound of the weight slider.
pub const MAX_SOURCE_WEIGHT: u32 = 100;

fn default_weight() -> u32 {
    DEFAULT_SOURCE_WEIGHT
}

fn default_enabled() -> bool {
    true
}

/// Weight from a loose config value: any finite number or numeric string,
/// rounded half-up and clamped to `0..=MAX_SOURCE_WEIGHT`. Anything else
/// falls back to `DEFAULT_SOURCE_WEIGHT`.
pub fn weight_from_value(v: &Value) -> u32 {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match n {
        Some(n) if n.is_finite() => (n + 0.5).floor().clamp(0.0, f64::from(MAX_SOURCE_WEIGHT)) as u32,
        _ => DEFAULT_SOURCE_WEIGHT,
    }
}

fn lenient_weight<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(weight_from_value(&raw))
}

/// One configured input to the consensus.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub entity: String,
    /// Relative importance. Weights are not required to sum to 100.
    #[serde(default = "default_weight", deserialize_with = "lenient_weight")]
    pub weight: u32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl SourceConfig {
    pub fn new(entity: impl Into<String>, weight: u32) -> Self {
        Self {
            entity: entity.into(),
            weight,
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Integration display name -> suggested weight.
pub type SuggestedWeights = HashMap<String, u32>;

/// Built-in weight hints for well-known weather integrations.
/// These are relative hints, not absolutes.
pub fn default_suggested_weights() -> SuggestedWeights {
    let mut m = SuggestedWeights::new();

    m.insert("met.no".to_string(), 35);
    m.insert("OpenWeatherMap".to_string(), 30);
    m.insert("Buienradar".to_string(), 25);
    m.insert("AccuWeather".to_string(), 20);
    m.insert("WeatherAPI".to_string(), 15);

    m
}

/// Display name of the integration behind an entity id.
///
/// Known object ids map to their canonical names; anything else has
/// underscores turned into spaces and each word capitalized.
pub fn integration_name(entity_id: &str) -> String {
    let object_id = entity_id.split('.').nth(1).unwrap_or("");

    match object_id {
        "met_no" => "met.no".to_string(),
        "openweathermap" => "OpenWeatherMap".to_string(),
        "buienradar" => "Buienradar".to_string(),
        "accuweather" => "AccuWeather".to_string(),
        "weatherapi" => "WeatherAPI".to_string(),
        other => title_case(&other.replace('_', " ")),
    }
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for ch in s.chars() {
        if ch.is_alphanumeric() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.push(ch);
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

pub fn suggested_weight(integration: &str, table: &SuggestedWeights) -> u32 {
    table.get(integration).copied().unwrap_or(DEFAULT_SOURCE_WEIGHT)
}

/// Build sources from the host's entity ids: the first `AUTO_DETECT_LIMIT`
/// weather entities, weighted by integration name, all enabled.
pub fn auto_detect_sources<'a, I>(entity_ids: I) -> Vec<SourceConfig>
where
    I: IntoIterator<Item = &'a str>,
{
    let table = default_suggested_weights();
    entity_ids
        .into_iter()
        .filter(|id| id.starts_with(WEATHER_DOMAIN_PREFIX))
        .take(AUTO_DETECT_LIMIT)
        .map(|id| SourceConfig::new(id, suggested_weight(&integration_name(id), &table)))
        .collect()
}
