//! Render model of the card.
//!
//! The host turns this into markup; nothing here knows about HTML. Every
//! layout decision branches on `CardMode` / `Background` here, once.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use weather_consensus_core::{round_half_up, Background, CardConfig, CardMode, ConsensusResult, ForecastDay};

pub const DEFAULT_ICON: &str = "🌤️";

/// Forecast strip length.
pub const FORECAST_DAYS: usize = 5;

/// The original card shows "feels like" as consensus + 2.
const FEELS_LIKE_OFFSET: i64 = 2;

pub fn condition_icon(condition: &str) -> &'static str {
    match condition {
        "clear-night" => "🌙",
        "cloudy" => "☁️",
        "fog" => "🌫️",
        "hail" => "🧊",
        "lightning" | "lightning-rainy" => "⛈️",
        "partlycloudy" => "⛅",
        "pouring" => "🌧️",
        "rainy" => "🌦️",
        "snowy" | "snowy-rainy" => "🌨️",
        "sunny" => "☀️",
        "windy" | "windy-variant" => "💨",
        "exceptional" => "❗",
        _ => DEFAULT_ICON,
    }
}

/// "lightning-rainy" -> "lightning rainy"
pub fn condition_label(condition: &str) -> String {
    condition.replace('-', " ")
}

/// "Today" for the first entry, then the short weekday of `datetime`.
/// Unparseable dates are shown as given.
pub fn forecast_label(index: usize, datetime: &str) -> String {
    if index == 0 {
        return "Today".to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(datetime) {
        return dt.format("%a").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(datetime, "%Y-%m-%dT%H:%M:%S") {
        return dt.format("%a").to_string();
    }
    if let Ok(d) = NaiveDate::parse_from_str(datetime, "%Y-%m-%d") {
        return d.format("%a").to_string();
    }
    datetime.to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardView {
    /// The host has not pushed any state yet.
    Unavailable,
    /// State is there but no source produced a usable reading.
    NoData,
    Ready(ConsensusView),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WeatherDetails {
    /// First forecast day's precipitation x 100, 0 when unknown.
    pub rain_percent: i64,
    pub wind_kmh: i64,
    pub humidity: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForecastTile {
    pub label: String,
    pub icon: &'static str,
    pub temperature: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templow: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BreakdownRow {
    pub name: String,
    pub temperature: f64,
    pub weight: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConsensusView {
    pub title: String,
    /// e.g. "weather-card compact gradient"
    pub card_class: String,
    pub card_mode: CardMode,
    pub background: Background,
    pub border_radius: u32,
    pub icon: &'static str,
    pub condition: String,
    pub temperature: i64,
    pub feels_like: i64,
    pub confidence: u8,
    pub confidence_threshold: u32,
    /// Drives both the warning banner and the badge colour.
    pub low_confidence: bool,
    pub sources_active: usize,
    pub sources_configured: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<WeatherDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast: Option<Vec<ForecastTile>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<Vec<BreakdownRow>>,
}

impl ConsensusView {
    pub fn build(config: &CardConfig, result: &ConsensusResult) -> Self {
        let compact = config.card_mode == CardMode::Compact;
        let threshold = config.consensus.confidence_threshold;

        let details = (!compact).then(|| WeatherDetails {
            rain_percent: result
                .aux
                .forecast
                .as_ref()
                .and_then(|f| f.first())
                .and_then(|d| d.precipitation)
                .map(|p| round_half_up(p * 100.0))
                .unwrap_or(0),
            wind_kmh: round_half_up(result.aux.wind_speed.unwrap_or(0.0)),
            humidity: result.aux.humidity.unwrap_or(0.0),
        });

        let forecast = match (&result.aux.forecast, config.display.show_forecast && !compact) {
            (Some(days), true) => Some(forecast_tiles(days)),
            _ => None,
        };

        let breakdown = config.display.show_source_breakdown.then(|| {
            result
                .sources
                .iter()
                .map(|s| BreakdownRow {
                    name: s.name.clone(),
                    temperature: s.temperature,
                    weight: s.weight,
                })
                .collect()
        });

        ConsensusView {
            title: config.title.clone(),
            card_class: format!(
                "weather-card {} {}",
                config.card_mode.as_str(),
                config.display.background.as_str()
            ),
            card_mode: config.card_mode,
            background: config.display.background,
            border_radius: config.display.border_radius,
            icon: condition_icon(&result.condition),
            condition: condition_label(&result.condition),
            temperature: result.temperature,
            feels_like: result.temperature + FEELS_LIKE_OFFSET,
            confidence: result.confidence,
            confidence_threshold: threshold,
            low_confidence: u32::from(result.confidence) < threshold,
            sources_active: result.sources_active(),
            sources_configured: config.sources.len(),
            details,
            forecast,
            breakdown,
        }
    }
}

fn forecast_tiles(days: &[ForecastDay]) -> Vec<ForecastTile> {
    days.iter()
        .take(FORECAST_DAYS)
        .enumerate()
        .map(|(i, day)| ForecastTile {
            label: forecast_label(i, &day.datetime),
            icon: condition_icon(&day.condition),
            temperature: round_half_up(day.temperature),
            templow: day.templow.map(round_half_up),
        })
        .collect()
}
