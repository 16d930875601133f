use serde_json::json;
use weather_consensus_core::*;

fn full_config() -> CardConfig {
    let p = PartialCardConfig::from_value(&json!({
        "type": "custom:multi-source-weather-card",
        "title": "Roof",
        "card_mode": "detailed",
        "sources": [
            {"entity": "weather.met_no", "weight": 35, "enabled": true},
            {"entity": "weather.openweathermap", "weight": 30, "enabled": false}
        ],
        "display": {"background": "plain", "border_radius": 0, "show_source_breakdown": true, "show_forecast": false},
        "consensus": {"confidence_threshold": 60, "disagreement_threshold": 10},
        "view_layout": {"position": "sidebar"}
    }))
    .unwrap();
    p.resolve()
}

#[test]
fn merge_with_self_is_identity() {
    let c = full_config();
    let again = c.merge(&c.clone().into());
    assert_eq!(again, c);

    let d = CardConfig::default();
    assert_eq!(d.merge(&d.clone().into()), d);
}

#[test]
fn sub_objects_merge_independently() {
    let base = full_config();
    let edit = PartialCardConfig::from_value(&json!({
        "display": {"show_forecast": true}
    }))
    .unwrap();

    let merged = base.merge(&edit);
    assert!(merged.display.show_forecast);
    // untouched siblings keep their values
    assert_eq!(merged.display.background, Background::Plain);
    assert_eq!(merged.display.border_radius, 0);
    assert!(merged.display.show_source_breakdown);
    assert_eq!(merged.consensus.confidence_threshold, 60);
    assert_eq!(merged.title, "Roof");
    assert_eq!(merged.sources.len(), 2);
}

#[test]
fn falsy_values_override_defaults() {
    let c = PartialCardConfig::from_value(&json!({
        "title": "",
        "display": {"border_radius": 0, "show_forecast": false},
        "consensus": {"confidence_threshold": 0}
    }))
    .unwrap()
    .resolve();

    assert_eq!(c.title, "");
    assert_eq!(c.display.border_radius, 0);
    assert!(!c.display.show_forecast);
    assert_eq!(c.consensus.confidence_threshold, 0);
    // absent keys fall back
    assert_eq!(c.consensus.disagreement_threshold, 25);
    assert_eq!(c.display.background, Background::Gradient);
}

#[test]
fn sources_are_replaced_wholesale() {
    let base = full_config();
    let edit = PartialCardConfig {
        sources: Some(vec![SourceConfig::new("weather.home", 5)]),
        ..PartialCardConfig::default()
    };
    let merged = base.merge(&edit);
    assert_eq!(merged.sources, vec![SourceConfig::new("weather.home", 5)]);
}

#[test]
fn overlay_prefers_edit() {
    let stored = PartialCardConfig::from_value(&json!({"title": "Stored", "card_mode": "compact"})).unwrap();
    let live = PartialCardConfig::from_value(&json!({"title": "Live"})).unwrap();
    let c = stored.overlay(live).resolve();
    assert_eq!(c.title, "Live");
    assert_eq!(c.card_mode, CardMode::Compact);
}

#[test]
fn json_round_trip_keeps_extra_keys() {
    let c = full_config();
    let text = c.to_json().unwrap();
    let back = PartialCardConfig::from_json(&text).unwrap().resolve();
    assert_eq!(back, c);
    assert_eq!(back.extra["view_layout"], json!({"position": "sidebar"}));
}

#[test]
fn yaml_round_trip() {
    let c = full_config();
    let text = c.to_yaml().unwrap();
    let back: CardConfig = serde_yaml::from_str(&text).unwrap();
    assert_eq!(back, c);
}

#[test]
fn deserialize_applies_defaults() {
    let c: CardConfig = serde_json::from_str(r#"{"title": "Only title"}"#).unwrap();
    assert_eq!(c.title, "Only title");
    assert_eq!(c.display, DisplayOptions::default());
    assert_eq!(c.consensus, ConsensusOptions::default());
    assert!(c.sources.is_empty());
}

#[test]
fn serialized_shape() {
    let v = CardConfig::default().to_value().unwrap();
    assert_eq!(
        v,
        json!({
            "title": "Weather Consensus",
            "card_mode": "default",
            "sources": [],
            "display": {
                "background": "gradient",
                "border_radius": 8,
                "show_source_breakdown": false,
                "show_forecast": true
            },
            "consensus": {"confidence_threshold": 75, "disagreement_threshold": 25}
        })
    );
}

#[test]
fn auto_detect_caps_and_weights() {
    let ids = [
        "sensor.outdoor",
        "weather.met_no",
        "weather.openweathermap",
        "weather.home_station",
        "weather.buienradar",
        "weather.accuweather",
        "weather.weatherapi",
    ];
    let sources = auto_detect_sources(ids.iter().copied());
    assert_eq!(sources.len(), AUTO_DETECT_LIMIT);
    let weights: Vec<u32> = sources.iter().map(|s| s.weight).collect();
    assert_eq!(weights, vec![35, 30, 20, 25, 20]);
    assert!(sources.iter().all(|s| s.enabled));
    assert_eq!(sources[2].entity, "weather.home_station");
}

#[test]
fn integration_names() {
    assert_eq!(integration_name("weather.met_no"), "met.no");
    assert_eq!(integration_name("weather.openweathermap"), "OpenWeatherMap");
    assert_eq!(integration_name("weather.home_station_2"), "Home Station 2");
    assert_eq!(integration_name("weather"), "");
    assert_eq!(suggested_weight("WeatherAPI", &default_suggested_weights()), 15);
    assert_eq!(suggested_weight("Home", &default_suggested_weights()), DEFAULT_SOURCE_WEIGHT);
}

#[test]
fn loose_source_weights_are_coerced() {
    let config = PartialCardConfig::from_value(&json!({
        "sources": [
            {"entity": "weather.a", "weight": 30.0},
            {"entity": "weather.b", "weight": "30"},
            {"entity": "weather.c", "weight": -5},
            {"entity": "weather.d", "weight": 12.5},
            {"entity": "weather.e", "weight": 250},
            {"entity": "weather.f", "weight": "heavy"},
            {"entity": "weather.g", "weight": null}
        ]
    }))
    .unwrap()
    .resolve();

    let weights: Vec<u32> = config.sources.iter().map(|s| s.weight).collect();
    assert_eq!(
        weights,
        vec![30, 30, 0, 13, MAX_SOURCE_WEIGHT, DEFAULT_SOURCE_WEIGHT, DEFAULT_SOURCE_WEIGHT]
    );
    assert!(config.sources.iter().all(|s| s.enabled));
}
