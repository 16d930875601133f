use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sources::SourceConfig;

pub const DEFAULT_TITLE: &str = "Weather Consensus";

/// Layout variant of the card.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardMode {
    #[default]
    Default,
    Compact,
    Detailed,
}

impl CardMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardMode::Default => "default",
            CardMode::Compact => "compact",
            CardMode::Detailed => "detailed",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Background {
    #[default]
    Gradient,
    Plain,
}

impl Background {
    pub fn as_str(&self) -> &'static str {
        match self {
            Background::Gradient => "gradient",
            Background::Plain => "plain",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayOptions {
    pub background: Background,
    pub border_radius: u32,
    pub show_source_breakdown: bool,
    pub show_forecast: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            background: Background::Gradient,
            border_radius: 8,
            show_source_breakdown: false,
            show_forecast: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusOptions {
    /// Below this confidence the card shows a low-consensus warning.
    pub confidence_threshold: u32,
    /// Carried for hosts that read it; the engine does not evaluate it.
    pub disagreement_threshold: u32,
}

impl Default for ConsensusOptions {
    fn default() -> Self {
        Self {
            confidence_threshold: 75,
            disagreement_threshold: 25,
        }
    }
}

/// Fully populated card configuration.
///
/// Deserialization goes through [`PartialCardConfig`], so omitted fields
/// always pick up their defaults. Unknown top-level keys are kept in
/// `extra` and written back unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "PartialCardConfig")]
pub struct CardConfig {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
    pub title: String,
    pub card_mode: CardMode,
    pub sources: Vec<SourceConfig>,
    pub display: DisplayOptions,
    pub consensus: ConsensusOptions,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            card_type: None,
            title: DEFAULT_TITLE.to_string(),
            card_mode: CardMode::Default,
            sources: Vec::new(),
            display: DisplayOptions::default(),
            consensus: ConsensusOptions::default(),
            extra: BTreeMap::new(),
        }
    }
}

impl CardConfig {
    /// Overlay a partial edit on top of this configuration.
    pub fn merge(&self, edit: &PartialCardConfig) -> CardConfig {
        PartialCardConfig::from(self.clone())
            .overlay(edit.clone())
            .resolve()
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_value(&self) -> Result<Value, ConfigError> {
        Ok(serde_json::to_value(self)?)
    }
}

// ---------------------------------------------------------------------
// Partial configuration: every field optional. Absent means "fall back",
// present (including false / 0 / "") means "override".
// ---------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialDisplayOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Background>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_source_breakdown: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_forecast: Option<bool>,
}

impl PartialDisplayOptions {
    pub fn overlay(self, edit: PartialDisplayOptions) -> PartialDisplayOptions {
        PartialDisplayOptions {
            background: edit.background.or(self.background),
            border_radius: edit.border_radius.or(self.border_radius),
            show_source_breakdown: edit.show_source_breakdown.or(self.show_source_breakdown),
            show_forecast: edit.show_forecast.or(self.show_forecast),
        }
    }

    pub fn resolve(self) -> DisplayOptions {
        let d = DisplayOptions::default();
        DisplayOptions {
            background: self.background.unwrap_or(d.background),
            border_radius: self.border_radius.unwrap_or(d.border_radius),
            show_source_breakdown: self.show_source_breakdown.unwrap_or(d.show_source_breakdown),
            show_forecast: self.show_forecast.unwrap_or(d.show_forecast),
        }
    }
}

impl From<DisplayOptions> for PartialDisplayOptions {
    fn from(d: DisplayOptions) -> Self {
        Self {
            background: Some(d.background),
            border_radius: Some(d.border_radius),
            show_source_breakdown: Some(d.show_source_breakdown),
            show_forecast: Some(d.show_forecast),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialConsensusOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_threshold: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disagreement_threshold: Option<u32>,
}

impl PartialConsensusOptions {
    pub fn overlay(self, edit: PartialConsensusOptions) -> PartialConsensusOptions {
        PartialConsensusOptions {
            confidence_threshold: edit.confidence_threshold.or(self.confidence_threshold),
            disagreement_threshold: edit.disagreement_threshold.or(self.disagreement_threshold),
        }
    }

    pub fn resolve(self) -> ConsensusOptions {
        let d = ConsensusOptions::default();
        ConsensusOptions {
            confidence_threshold: self.confidence_threshold.unwrap_or(d.confidence_threshold),
            disagreement_threshold: self.disagreement_threshold.unwrap_or(d.disagreement_threshold),
        }
    }
}

impl From<ConsensusOptions> for PartialConsensusOptions {
    fn from(c: ConsensusOptions) -> Self {
        Self {
            confidence_threshold: Some(c.confidence_threshold),
            disagreement_threshold: Some(c.disagreement_threshold),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialCardConfig {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_mode: Option<CardMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SourceConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<PartialDisplayOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consensus: Option<PartialConsensusOptions>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn overlay_opt<T>(base: Option<T>, edit: Option<T>, f: impl FnOnce(T, T) -> T) -> Option<T> {
    match (base, edit) {
        (Some(b), Some(e)) => Some(f(b, e)),
        (b, None) => b,
        (None, e) => e,
    }
}

impl PartialCardConfig {
    /// Parse a host-supplied configuration value. Anything but an object
    /// (including `null`) is rejected.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        if !value.is_object() {
            return Err(ConfigError::Invalid(
                "configuration must be an object".to_string(),
            ));
        }
        Ok(serde_json::from_value(value.clone())?)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Parse configuration from a YAML string (the dashboard's native format).
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_yaml::from_str(yaml)?;
        Self::from_value(&value)
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&contents)
    }

    /// Presence-based shallow merge. `display` and `consensus` merge field by
    /// field on their own; `sources` is replaced as a whole.
    pub fn overlay(self, edit: PartialCardConfig) -> PartialCardConfig {
        let mut extra = self.extra;
        extra.extend(edit.extra);

        PartialCardConfig {
            card_type: edit.card_type.or(self.card_type),
            title: edit.title.or(self.title),
            card_mode: edit.card_mode.or(self.card_mode),
            sources: edit.sources.or(self.sources),
            display: overlay_opt(self.display, edit.display, PartialDisplayOptions::overlay),
            consensus: overlay_opt(self.consensus, edit.consensus, PartialConsensusOptions::overlay),
            extra,
        }
    }

    /// Apply defaults to every absent field.
    pub fn resolve(self) -> CardConfig {
        CardConfig {
            card_type: self.card_type,
            title: self.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            card_mode: self.card_mode.unwrap_or_default(),
            sources: self.sources.unwrap_or_default(),
            display: self.display.unwrap_or_default().resolve(),
            consensus: self.consensus.unwrap_or_default().resolve(),
            extra: self.extra,
        }
    }
}

impl From<CardConfig> for PartialCardConfig {
    fn from(c: CardConfig) -> Self {
        Self {
            card_type: c.card_type,
            title: Some(c.title),
            card_mode: Some(c.card_mode),
            sources: Some(c.sources),
            display: Some(c.display.into()),
            consensus: Some(c.consensus.into()),
            extra: c.extra,
        }
    }
}

impl From<PartialCardConfig> for CardConfig {
    fn from(p: PartialCardConfig) -> Self {
        p.resolve()
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
