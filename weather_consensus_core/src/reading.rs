use serde::{Deserialize, Serialize};

/// One forecast entry as published by a weather entity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub datetime: String,
    #[serde(default)]
    pub condition: String,
    pub temperature: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templow: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation: Option<f64>,
}

/// Non-aggregated attributes. They are taken verbatim from the primary source.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Auxiliary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_bearing: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast: Option<Vec<ForecastDay>>,
}

/// What a resolver knows about one entity right now.
///
/// `temperature` is already parsed: `None` means the entity exists but its
/// temperature is missing or not a number.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reading {
    pub temperature: Option<f64>,
    pub condition: String,
    pub friendly_name: Option<String>,
    pub aux: Auxiliary,
}

impl Reading {
    pub fn new(temperature: Option<f64>, condition: impl Into<String>) -> Self {
        Reading {
            temperature,
            condition: condition.into(),
            friendly_name: None,
            aux: Auxiliary::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = Some(name.into());
        self
    }

    pub fn with_aux(mut self, aux: Auxiliary) -> Self {
        self.aux = aux;
        self
    }
}

/// Looks up the current reading of an entity. `None` = unknown entity.
pub trait ReadingResolver {
    fn resolve(&self, entity: &str) -> Option<Reading>;
}

impl<F> ReadingResolver for F
where
    F: Fn(&str) -> Option<Reading>,
{
    fn resolve(&self, entity: &str) -> Option<Reading> {
        self(entity)
    }
}

/// A source that contributed a numeric temperature to the consensus.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceReading {
    pub entity: String,
    /// `friendly_name` of the entity, or the entity id.
    pub name: String,
    pub weight: u32,
    pub temperature: f64,
    pub condition: String,
}
