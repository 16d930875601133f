//! weather_consensus_card
//!
//! Host-facing layer around `weather_consensus_core`.
//!
//! Responsibilities:
//! - adapt the host's entity snapshot into core readings
//! - own the card's configuration and latest consensus
//! - reflect edits in the settings editor and notify observers
//! - keep an explicit registry of card types
//!
//! Non-goals:
//! - no IO
//! - no async
//! - no markup (the view model is handed to the host)

pub mod adapter;
pub mod card;
pub mod editor;
pub mod registry;
pub mod view;

pub use adapter::{parse_number, EntityState, HostState};

pub use card::{
    CardError, ConsensusCard, CARD_SIZE, CARD_TYPE, COMPACT_CARD_SIZE, CUSTOM_CARD_TYPE,
};
pub use editor::{CardEditor, ConfigObserver, EditorError};
pub use registry::{CardInfo, CardRegistry, CUSTOM_PREFIX};
pub use view::{
    condition_icon, condition_label, forecast_label, BreakdownRow, CardView, ConsensusView,
    ForecastTile, WeatherDetails,
};
