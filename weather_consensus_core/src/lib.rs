pub mod reading;
pub mod sources;

pub mod cfg;
pub mod consensus;

pub use reading::{Auxiliary, ForecastDay, Reading, ReadingResolver, SourceReading};
pub use sources::{
    auto_detect_sources, default_suggested_weights, integration_name, suggested_weight,
    weight_from_value, SourceConfig, SuggestedWeights, AUTO_DETECT_LIMIT, DEFAULT_SOURCE_WEIGHT,
    MAX_SOURCE_WEIGHT, WEATHER_DOMAIN_PREFIX,
};

pub use cfg::{
    Background, CardConfig, CardMode, ConfigError, ConsensusOptions, DisplayOptions,
    PartialCardConfig, PartialConsensusOptions, PartialDisplayOptions, DEFAULT_TITLE,
};
pub use consensus::{
    compute_consensus, confidence_from_spread, majority_condition, round_half_up,
    ConsensusResult, SPREAD_PENALTY,
};
