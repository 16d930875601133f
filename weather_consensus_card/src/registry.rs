//! Explicit card registry owned by the hosting application.
//!
//! Registration is idempotent: registering a type twice keeps the first entry.

use log::{debug, info};
use serde::Serialize;

use crate::card::{ConsensusCard, CARD_TYPE};
use crate::editor::CardEditor;

/// Prefix the dashboard puts in front of custom card types.
pub const CUSTOM_PREFIX: &str = "custom:";

/// Card picker entry plus the factories the host uses to build instances.
#[derive(Clone, Debug, Serialize)]
pub struct CardInfo {
    #[serde(rename = "type")]
    pub card_type: String,
    pub name: String,
    pub description: String,
    pub preview: bool,
    #[serde(rename = "documentationURL", skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,
    #[serde(skip)]
    pub card: fn() -> ConsensusCard,
    #[serde(skip)]
    pub editor: fn() -> CardEditor,
}

impl CardInfo {
    /// Picker entry of the multi-source consensus card.
    pub fn consensus_card() -> Self {
        Self {
            card_type: CARD_TYPE.to_string(),
            name: "Multi-Source Weather Consensus Card".to_string(),
            description: "A card that combines multiple weather sources with intelligent consensus algorithms"
                .to_string(),
            preview: false,
            documentation_url: Some("https://github.com/bedar89/multi-source-weather-card".to_string()),
            card: ConsensusCard::new,
            editor: ConsensusCard::config_element,
        }
    }
}

fn normalize(card_type: &str) -> &str {
    card_type.strip_prefix(CUSTOM_PREFIX).unwrap_or(card_type)
}

#[derive(Debug, Default)]
pub struct CardRegistry {
    // insertion order is the picker order
    cards: Vec<CardInfo>,
}

impl CardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the consensus card already registered.
    pub fn with_builtin() -> Self {
        let mut r = Self::new();
        r.register(CardInfo::consensus_card());
        r
    }

    /// Returns `false` when the type was already registered.
    pub fn register(&mut self, info: CardInfo) -> bool {
        if self.is_registered(&info.card_type) {
            debug!("card type {} already registered", info.card_type);
            return false;
        }
        info!("registered card type {}", info.card_type);
        self.cards.push(info);
        true
    }

    /// Accepts both `name` and `custom:name`.
    pub fn get(&self, card_type: &str) -> Option<&CardInfo> {
        let wanted = normalize(card_type);
        self.cards.iter().find(|c| normalize(&c.card_type) == wanted)
    }

    pub fn is_registered(&self, card_type: &str) -> bool {
        self.get(card_type).is_some()
    }

    pub fn create_card(&self, card_type: &str) -> Option<ConsensusCard> {
        self.get(card_type).map(|c| (c.card)())
    }

    pub fn create_editor(&self, card_type: &str) -> Option<CardEditor> {
        self.get(card_type).map(|c| (c.editor)())
    }

    pub fn cards(&self) -> &[CardInfo] {
        &self.cards
    }
}
