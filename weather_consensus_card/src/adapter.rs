//! Host adapter layer: convert the host's entity state snapshot into
//! `weather_consensus_core::Reading`s.
//!
//! This module is intentionally small and policy-light:
//! - No IO
//! - No async
//! - No consensus rules (those live in core)
//!
//! Attribute values arrive as loose JSON. Anything that does not parse is
//! treated as absent rather than rejected, so one malformed entity never
//! poisons the whole snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use weather_consensus_core::{Auxiliary, ForecastDay, Reading, ReadingResolver, WEATHER_DOMAIN_PREFIX};

/// Attribute keys read from a weather entity.
pub mod keys {
    pub const TEMPERATURE: &str = "temperature";
    pub const HUMIDITY: &str = "humidity";
    pub const PRESSURE: &str = "pressure";
    pub const WIND_SPEED: &str = "wind_speed";
    pub const WIND_BEARING: &str = "wind_bearing";
    pub const VISIBILITY: &str = "visibility";
    pub const FORECAST: &str = "forecast";
    pub const FRIENDLY_NAME: &str = "friendly_name";
}

/// Parse a JSON number, or a string starting with one (`"21 °C"` is 21).
/// Non-finite values are rejected.
pub fn parse_number(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_number(s),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

// Longest numeric prefix after leading whitespace.
fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
        .map_or(s.len(), |(i, _)| i);
    (1..=end).rev().find_map(|i| s[..i].parse::<f64>().ok())
}

/// One entity as published by the host.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    /// For weather entities this is the condition label ("sunny", "rainy", ...).
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
}

impl EntityState {
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Set an attribute value.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.attributes.get(key).and_then(parse_number)
    }

    pub fn friendly_name(&self) -> Option<&str> {
        self.attributes.get(keys::FRIENDLY_NAME).and_then(Value::as_str)
    }

    /// Well-formed forecast entries. Malformed days are skipped one by one;
    /// `None` when nothing usable is left.
    pub fn forecast(&self) -> Option<Vec<ForecastDay>> {
        let days: Vec<ForecastDay> = self
            .attributes
            .get(keys::FORECAST)?
            .as_array()?
            .iter()
            .filter_map(|d| serde_json::from_value(d.clone()).ok())
            .collect();
        (!days.is_empty()).then_some(days)
    }

    pub fn to_reading(&self) -> Reading {
        let aux = Auxiliary {
            humidity: self.number(keys::HUMIDITY),
            pressure: self.number(keys::PRESSURE),
            wind_speed: self.number(keys::WIND_SPEED),
            wind_bearing: self.number(keys::WIND_BEARING),
            visibility: self.number(keys::VISIBILITY),
            forecast: self.forecast(),
        };

        Reading {
            temperature: self.number(keys::TEMPERATURE),
            condition: self.state.clone(),
            friendly_name: self.friendly_name().map(str::to_string),
            aux,
        }
    }
}

/// Snapshot of every entity the host knows about, keyed by entity id.
///
/// Entity ids iterate in identifier order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostState {
    entities: BTreeMap<String, EntityState>,
}

impl HostState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_entity(mut self, entity_id: impl Into<String>, state: EntityState) -> Self {
        self.entities.insert(entity_id.into(), state);
        self
    }

    pub fn get(&self, entity_id: &str) -> Option<&EntityState> {
        self.entities.get(entity_id)
    }

    pub fn entity_ids(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn weather_entity_ids(&self) -> impl Iterator<Item = &str> {
        self.entity_ids().filter(|id| id.starts_with(WEATHER_DOMAIN_PREFIX))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl ReadingResolver for HostState {
    fn resolve(&self, entity: &str) -> Option<Reading> {
        self.entities.get(entity).map(EntityState::to_reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_from_strings_and_numbers() {
        assert_eq!(parse_number(&json!(21.5)), Some(21.5));
        assert_eq!(parse_number(&json!(" 7 ")), Some(7.0));
        assert_eq!(parse_number(&json!("warm")), None);
        assert_eq!(parse_number(&json!("21 °C")), Some(21.0));
        assert_eq!(parse_number(&json!("-3.5abc")), Some(-3.5));
        assert_eq!(parse_number(&json!("1-2")), Some(1.0));
        assert_eq!(parse_number(&json!(".")), None);
        assert_eq!(parse_number(&json!("")), None);
        assert_eq!(parse_number(&json!("NaN")), None);
        assert_eq!(parse_number(&json!(null)), None);
        assert_eq!(parse_number(&json!(true)), None);
    }

    #[test]
    fn malformed_forecast_is_absent() {
        let e = EntityState::new("sunny").with_attr(keys::FORECAST, json!("soon"));
        assert!(e.forecast().is_none());
        assert!(e.to_reading().aux.forecast.is_none());
    }

    #[test]
    fn bad_forecast_days_are_skipped() {
        let e = EntityState::new("sunny").with_attr(
            keys::FORECAST,
            json!([
                {"datetime": "2024-05-01T00:00:00+00:00", "condition": "rainy", "temperature": 14, "precipitation": 0.3},
                {"datetime": "2024-05-02T00:00:00+00:00", "condition": "sunny", "temperature": null},
                {"condition": "cloudy", "temperature": 12},
                "tomorrow",
                {"datetime": "2024-05-05T00:00:00+00:00", "condition": "fog", "temperature": 9.5}
            ]),
        );
        let days = e.forecast().unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].precipitation, Some(0.3));
        assert_eq!(days[1].condition, "fog");

        let none_usable = EntityState::new("sunny")
            .with_attr(keys::FORECAST, json!([{"condition": "cloudy", "temperature": null}]));
        assert!(none_usable.forecast().is_none());
    }

    #[test]
    fn reading_from_entity() {
        let e = EntityState::new("rainy")
            .with_attr(keys::TEMPERATURE, "12.5")
            .with_attr(keys::HUMIDITY, 81)
            .with_attr(keys::FRIENDLY_NAME, "Home")
            .with_attr(
                keys::FORECAST,
                json!([{"datetime": "2024-05-01T00:00:00+00:00", "condition": "rainy", "temperature": 14}]),
            );
        let r = e.to_reading();
        assert_eq!(r.temperature, Some(12.5));
        assert_eq!(r.condition, "rainy");
        assert_eq!(r.friendly_name.as_deref(), Some("Home"));
        assert_eq!(r.aux.humidity, Some(81.0));
        assert_eq!(r.aux.forecast.unwrap()[0].temperature, 14.0);
    }
}
