//! The consensus card.
//!
//! Owns the current configuration and the latest host snapshot. Every push of
//! either one recomputes the consensus; the newest result replaces the old.

use log::{debug, warn};
use serde_json::Value;

use weather_consensus_core::{
    auto_detect_sources, compute_consensus, CardConfig, CardMode, ConfigError, ConsensusResult,
    PartialCardConfig,
};

use crate::adapter::HostState;
use crate::editor::CardEditor;
use crate::view::{CardView, ConsensusView};

/// Element name of the card.
pub const CARD_TYPE: &str = "multi-source-weather-card";

/// Value of the `type` key in dashboard configuration.
pub const CUSTOM_CARD_TYPE: &str = "custom:multi-source-weather-card";

/// Grid rows requested from the host layout engine.
pub const CARD_SIZE: u32 = 3;
pub const COMPACT_CARD_SIZE: u32 = 2;

#[derive(Debug, thiserror::Error)]
pub enum CardError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid state snapshot: {0}")]
    State(#[from] serde_json::Error),
}

#[derive(Debug, Default)]
pub struct ConsensusCard {
    config: Option<CardConfig>,
    hass: Option<HostState>,
    consensus: Option<ConsensusResult>,
}

impl ConsensusCard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration offered by the card picker for a freshly added card.
    pub fn stub_config() -> CardConfig {
        CardConfig::default()
    }

    /// Settings editor matching this card.
    pub fn config_element() -> CardEditor {
        CardEditor::new()
    }

    /// Apply a configuration from the host.
    ///
    /// A missing or non-object configuration is fatal for this card; the
    /// host is expected to show its own error card. Omitted fields fall back
    /// to defaults. With no sources configured and a snapshot at hand, the
    /// sources are auto-detected.
    pub fn set_config(&mut self, raw: &Value) -> Result<(), CardError> {
        let partial = PartialCardConfig::from_value(raw).map_err(|e| {
            warn!("rejecting card configuration: {e}");
            e
        })?;
        let mut config = partial.resolve();

        if config.sources.is_empty() {
            if let Some(hass) = &self.hass {
                config.sources = auto_detect_sources(hass.entity_ids());
                debug!("auto-detected {} weather sources", config.sources.len());
            }
        }

        self.config = Some(config);
        self.recompute();
        Ok(())
    }

    /// Store a new host snapshot and recompute.
    pub fn set_hass(&mut self, hass: HostState) {
        self.hass = Some(hass);
        self.recompute();
    }

    pub fn set_hass_json(&mut self, json: &str) -> Result<(), CardError> {
        let hass = HostState::from_json(json)?;
        self.set_hass(hass);
        Ok(())
    }

    pub fn config(&self) -> Option<&CardConfig> {
        self.config.as_ref()
    }

    pub fn hass(&self) -> Option<&HostState> {
        self.hass.as_ref()
    }

    pub fn consensus(&self) -> Option<&ConsensusResult> {
        self.consensus.as_ref()
    }

    /// Size hint for the host layout engine; known without rendering.
    pub fn card_size(&self) -> u32 {
        match self.config.as_ref().map(|c| c.card_mode) {
            Some(CardMode::Compact) => COMPACT_CARD_SIZE,
            _ => CARD_SIZE,
        }
    }

    pub fn view(&self) -> CardView {
        if self.hass.is_none() {
            return CardView::Unavailable;
        }
        match (&self.config, &self.consensus) {
            (Some(config), Some(result)) => CardView::Ready(ConsensusView::build(config, result)),
            _ => CardView::NoData,
        }
    }

    fn recompute(&mut self) {
        self.consensus = match (&self.config, &self.hass) {
            (Some(config), Some(hass)) => compute_consensus(&config.sources, hass),
            _ => None,
        };

        match &self.consensus {
            Some(c) => debug!(
                "consensus {}° {} ({}% confidence, {}/{} sources)",
                c.temperature,
                c.condition,
                c.confidence,
                c.sources_active(),
                self.config.as_ref().map_or(0, |cfg| cfg.sources.len()),
            ),
            None => debug!("no consensus available"),
        }
    }
}
