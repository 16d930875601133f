//! Settings editor for the consensus card.
//!
//! Pure form-state reflection: no computation. Every edit builds a new
//! configuration, swaps it in, then notifies observers synchronously, in
//! the order the edits happened.

use log::debug;
use serde_json::Value;

use weather_consensus_core::{
    auto_detect_sources, Background, CardConfig, CardMode, ConfigError, PartialCardConfig,
    SourceConfig, DEFAULT_SOURCE_WEIGHT, MAX_SOURCE_WEIGHT,
};

use crate::adapter::HostState;
use crate::card::CUSTOM_CARD_TYPE;

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Source index {index} out of range ({len} sources)")]
    SourceIndex { index: usize, len: usize },
}

/// Receives every configuration the editor produces.
pub trait ConfigObserver {
    fn on_config_changed(&mut self, config: &CardConfig);
}

impl<F> ConfigObserver for F
where
    F: FnMut(&CardConfig),
{
    fn on_config_changed(&mut self, config: &CardConfig) {
        self(config)
    }
}

pub struct CardEditor {
    config: CardConfig,
    hass: Option<HostState>,
    observers: Vec<Box<dyn ConfigObserver>>,
}

impl Default for CardEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CardEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardEditor")
            .field("config", &self.config)
            .field("hass", &self.hass.as_ref().map(HostState::len))
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl CardEditor {
    pub fn new() -> Self {
        Self {
            config: Self::base_config().resolve(),
            hass: None,
            observers: Vec::new(),
        }
    }

    fn base_config() -> PartialCardConfig {
        PartialCardConfig {
            card_type: Some(CUSTOM_CARD_TYPE.to_string()),
            ..PartialCardConfig::default()
        }
    }

    pub fn subscribe(&mut self, observer: impl ConfigObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    pub fn set_hass(&mut self, hass: HostState) {
        self.hass = Some(hass);
    }

    /// Load a configuration into the form. Does not notify, except when
    /// sources were auto-detected into an empty list.
    pub fn set_config(&mut self, raw: &Value) -> Result<(), EditorError> {
        let partial = PartialCardConfig::from_value(raw)?;
        self.config = Self::base_config().overlay(partial).resolve();

        if self.config.sources.is_empty() {
            let detected = self
                .hass
                .as_ref()
                .map(|h| auto_detect_sources(h.entity_ids()))
                .unwrap_or_default();
            if !detected.is_empty() {
                debug!("editor auto-detected {} sources", detected.len());
                self.update(|c| c.sources = detected);
            }
        }
        Ok(())
    }

    /// `(entity id, label)` for every weather entity the host knows.
    pub fn available_entities(&self) -> Vec<(String, String)> {
        let Some(hass) = &self.hass else {
            return Vec::new();
        };
        hass.weather_entity_ids()
            .map(|id| {
                let label = hass
                    .get(id)
                    .and_then(|e| e.friendly_name())
                    .unwrap_or(id)
                    .to_string();
                (id.to_string(), label)
            })
            .collect()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        self.update(|c| c.title = title);
    }

    pub fn set_card_mode(&mut self, mode: CardMode) {
        self.update(|c| c.card_mode = mode);
    }

    pub fn set_background(&mut self, background: Background) {
        self.update(|c| c.display.background = background);
    }

    pub fn set_border_radius(&mut self, radius: u32) {
        self.update(|c| c.display.border_radius = radius);
    }

    pub fn set_show_source_breakdown(&mut self, show: bool) {
        self.update(|c| c.display.show_source_breakdown = show);
    }

    pub fn set_show_forecast(&mut self, show: bool) {
        self.update(|c| c.display.show_forecast = show);
    }

    pub fn set_confidence_threshold(&mut self, threshold: u32) {
        self.update(|c| c.consensus.confidence_threshold = threshold);
    }

    pub fn set_disagreement_threshold(&mut self, threshold: u32) {
        self.update(|c| c.consensus.disagreement_threshold = threshold);
    }

    pub fn set_source_enabled(&mut self, index: usize, enabled: bool) -> Result<(), EditorError> {
        self.update_source(index, |s| s.enabled = enabled)
    }

    /// Weight is clamped to the slider range.
    pub fn set_source_weight(&mut self, index: usize, weight: u32) -> Result<(), EditorError> {
        let weight = weight.min(MAX_SOURCE_WEIGHT);
        self.update_source(index, |s| s.weight = weight)
    }

    pub fn set_source_entity(
        &mut self,
        index: usize,
        entity: impl Into<String>,
    ) -> Result<(), EditorError> {
        let entity = entity.into();
        self.update_source(index, |s| s.entity = entity)
    }

    pub fn remove_source(&mut self, index: usize) -> Result<SourceConfig, EditorError> {
        self.check_index(index)?;
        let removed = self.config.sources[index].clone();
        self.update(|c| {
            c.sources.remove(index);
        });
        Ok(removed)
    }

    /// Append the first weather entity that is not configured yet.
    /// Returns its id, or `None` when there is nothing left to add.
    pub fn add_source(&mut self) -> Option<String> {
        let hass = self.hass.as_ref()?;
        let entity = hass
            .weather_entity_ids()
            .find(|id| !self.config.sources.iter().any(|s| s.entity == *id))?
            .to_string();

        let source = SourceConfig::new(entity.clone(), DEFAULT_SOURCE_WEIGHT);
        self.update(|c| c.sources.push(source));
        Some(entity)
    }

    fn check_index(&self, index: usize) -> Result<(), EditorError> {
        let len = self.config.sources.len();
        if index >= len {
            return Err(EditorError::SourceIndex { index, len });
        }
        Ok(())
    }

    fn update_source(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut SourceConfig),
    ) -> Result<(), EditorError> {
        self.check_index(index)?;
        self.update(|c| f(&mut c.sources[index]));
        Ok(())
    }

    /// Build the next configuration from a copy, swap it in, notify.
    fn update(&mut self, f: impl FnOnce(&mut CardConfig)) {
        let mut next = self.config.clone();
        f(&mut next);
        self.config = next;
        self.notify();
    }

    fn notify(&mut self) {
        let config = &self.config;
        for observer in self.observers.iter_mut() {
            observer.on_config_changed(config);
        }
    }
}
