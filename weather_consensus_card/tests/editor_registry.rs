use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;

use weather_consensus_card::*;
use weather_consensus_core::{Background, CardConfig, CardMode, SourceConfig};

fn host() -> HostState {
    HostState::new()
        .with_entity(
            "weather.buienradar",
            EntityState::new("rainy").with_attr("friendly_name", "Buienradar"),
        )
        .with_entity("weather.met_no", EntityState::new("cloudy"))
        .with_entity("sensor.humidity", EntityState::new("40"))
}

fn recording(editor: &mut CardEditor) -> Rc<RefCell<Vec<CardConfig>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    editor.subscribe(move |c: &CardConfig| sink.borrow_mut().push(c.clone()));
    seen
}

#[test]
fn editor_defaults_carry_card_type() {
    let mut editor = CardEditor::new();
    editor.set_config(&json!({"title": "Deck"})).unwrap();
    assert_eq!(editor.config().card_type.as_deref(), Some(CUSTOM_CARD_TYPE));
    assert_eq!(editor.config().title, "Deck");

    assert!(matches!(editor.set_config(&json!(null)), Err(EditorError::Config(_))));
}

#[test]
fn edits_notify_in_order() {
    let mut editor = CardEditor::new();
    editor
        .set_config(&json!({"sources": [{"entity": "weather.met_no", "weight": 35, "enabled": true}]}))
        .unwrap();
    let seen = recording(&mut editor);

    editor.set_title("Balcony");
    editor.set_card_mode(CardMode::Detailed);
    editor.set_background(Background::Plain);
    editor.set_border_radius(0);
    editor.set_show_source_breakdown(true);
    editor.set_show_forecast(false);
    editor.set_confidence_threshold(50);
    editor.set_disagreement_threshold(5);
    editor.set_source_weight(0, 250).unwrap();
    editor.set_source_enabled(0, false).unwrap();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 10);
    assert_eq!(seen[0].title, "Balcony");
    assert_eq!(seen[0].card_mode, CardMode::Default);
    assert_eq!(seen[1].card_mode, CardMode::Detailed);
    assert_eq!(seen[3].display.border_radius, 0);
    assert!(!seen[5].display.show_forecast);
    assert_eq!(seen[8].sources[0].weight, 100);
    assert!(seen[8].sources[0].enabled);

    let last = seen.last().unwrap();
    assert_eq!(last, editor.config());
    assert!(!last.sources[0].enabled);
    assert_eq!(last.display.background, Background::Plain);
    assert_eq!(last.consensus.confidence_threshold, 50);
    assert_eq!(last.consensus.disagreement_threshold, 5);
}

#[test]
fn bad_source_index_does_not_notify() {
    let mut editor = CardEditor::new();
    let seen = recording(&mut editor);

    let err = editor.set_source_entity(3, "weather.x").unwrap_err();
    assert!(matches!(err, EditorError::SourceIndex { index: 3, len: 0 }));
    assert!(editor.remove_source(0).is_err());
    assert!(seen.borrow().is_empty());
}

#[test]
fn add_and_remove_sources() {
    let mut editor = CardEditor::new();
    assert_eq!(editor.add_source(), None);

    editor.set_hass(host());
    let seen = recording(&mut editor);

    assert_eq!(editor.add_source().as_deref(), Some("weather.buienradar"));
    assert_eq!(editor.add_source().as_deref(), Some("weather.met_no"));
    assert_eq!(editor.add_source(), None);
    assert_eq!(
        editor.config().sources,
        vec![
            SourceConfig::new("weather.buienradar", 20),
            SourceConfig::new("weather.met_no", 20)
        ]
    );

    editor.set_source_entity(1, "weather.other").unwrap();
    let removed = editor.remove_source(0).unwrap();
    assert_eq!(removed.entity, "weather.buienradar");
    assert_eq!(editor.config().sources.len(), 1);
    assert_eq!(editor.config().sources[0].entity, "weather.other");
    assert_eq!(seen.borrow().len(), 4);
}

#[test]
fn editor_auto_detects_and_notifies() {
    let mut editor = CardEditor::new();
    editor.set_hass(host());
    let seen = recording(&mut editor);

    editor.set_config(&json!({})).unwrap();
    assert_eq!(seen.borrow().len(), 1);
    let weights: Vec<u32> = editor.config().sources.iter().map(|s| s.weight).collect();
    assert_eq!(weights, vec![25, 35]);

    // an explicit list is left alone and nothing is emitted
    editor
        .set_config(&json!({"sources": [{"entity": "weather.met_no", "weight": 1, "enabled": true}]}))
        .unwrap();
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn available_entities_use_friendly_names() {
    let mut editor = CardEditor::new();
    assert!(editor.available_entities().is_empty());
    editor.set_hass(host());
    assert_eq!(
        editor.available_entities(),
        vec![
            ("weather.buienradar".to_string(), "Buienradar".to_string()),
            ("weather.met_no".to_string(), "weather.met_no".to_string()),
        ]
    );
}

#[test]
fn registry_is_idempotent() {
    let mut registry = CardRegistry::with_builtin();
    assert!(!registry.register(CardInfo::consensus_card()));
    assert_eq!(registry.cards().len(), 1);

    assert!(registry.is_registered(CARD_TYPE));
    assert!(registry.is_registered(CUSTOM_CARD_TYPE));
    assert!(!registry.is_registered("custom:other-card"));

    let card = registry.create_card(CUSTOM_CARD_TYPE).unwrap();
    assert!(card.config().is_none());
    let editor = registry.create_editor(CARD_TYPE).unwrap();
    assert_eq!(editor.config().card_type.as_deref(), Some(CUSTOM_CARD_TYPE));
    assert!(registry.create_editor("other").is_none());
}

#[test]
fn picker_entry_shape() {
    let v = serde_json::to_value(CardInfo::consensus_card()).unwrap();
    assert_eq!(v["type"], "multi-source-weather-card");
    assert_eq!(v["preview"], false);
    assert!(v.get("card").is_none());
}
