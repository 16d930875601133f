//weather_consensus_core/consensus.rs

use serde::Serialize;

use crate::reading::{Auxiliary, Reading, ReadingResolver, SourceReading};
use crate::sources::SourceConfig;

/// Confidence points lost per degree of spread between sources.
pub const SPREAD_PENALTY: f64 = 8.0;

/// Aggregated reading over all contributing sources.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConsensusResult {
    pub temperature: i64,
    pub condition: String,
    /// 0..=100
    pub confidence: u8,
    /// max - min over contributing temperatures.
    pub spread: f64,
    pub sources: Vec<SourceReading>,
    pub primary: SourceReading,
    #[serde(flatten)]
    pub aux: Auxiliary,
}

impl ConsensusResult {
    pub fn sources_active(&self) -> usize {
        self.sources.len()
    }
}

/// Half-up rounding: `2.5 -> 3`, `-2.5 -> -2`.
#[inline]
pub fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

/// Linear disagreement penalty, clamped to [0, 100].
pub fn confidence_from_spread(spread: f64) -> u8 {
    if !spread.is_finite() {
        return 0;
    }
    let raw = (100.0 - spread * SPREAD_PENALTY).clamp(0.0, 100.0);
    round_half_up(raw) as u8
}

/// Majority vote over condition labels. Ties go to the label seen first.
pub fn majority_condition<I, S>(labels: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    // insertion-ordered tally; the label count per card is tiny
    let mut tally: Vec<(String, usize)> = Vec::new();
    for label in labels {
        let label = label.as_ref();
        match tally.iter_mut().find(|(l, _)| l == label) {
            Some((_, n)) => *n += 1,
            None => tally.push((label.to_string(), 1)),
        }
    }

    let mut best: Option<(String, usize)> = None;
    for (label, n) in tally {
        match &best {
            Some((_, m)) if n <= *m => {}
            _ => best = Some((label, n)),
        }
    }
    best.map(|(label, _)| label)
}

/// Combine the configured sources into one reading.
///
/// Only enabled sources whose entity resolves take part. Their summed weight
/// is the denominator even when some of them have no numeric temperature:
/// such sources add nothing to the numerator, so they pull the result toward
/// zero instead of being renormalized out.
///
/// Returns `None` when nothing usable is available (no active source, zero
/// total weight, or no numeric temperature). Missing data is a steady state,
/// not an error.
pub fn compute_consensus<R>(sources: &[SourceConfig], resolver: &R) -> Option<ConsensusResult>
where
    R: ReadingResolver + ?Sized,
{
    let active: Vec<(&SourceConfig, Reading)> = sources
        .iter()
        .filter(|s| s.enabled)
        .filter_map(|s| resolver.resolve(&s.entity).map(|r| (s, r)))
        .collect();

    if active.is_empty() {
        return None;
    }

    let total_weight: u64 = active.iter().map(|(s, _)| u64::from(s.weight)).sum();
    if total_weight == 0 {
        return None;
    }

    let mut weighted = 0.0_f64;
    let mut min_t = f64::INFINITY;
    let mut max_t = f64::NEG_INFINITY;
    let mut contributing: Vec<(SourceReading, &Reading)> = Vec::with_capacity(active.len());

    for (src, reading) in &active {
        let temp = match reading.temperature {
            Some(t) if t.is_finite() => t,
            _ => continue,
        };
        weighted += temp * f64::from(src.weight);
        min_t = min_t.min(temp);
        max_t = max_t.max(temp);

        contributing.push((
            SourceReading {
                entity: src.entity.clone(),
                name: reading
                    .friendly_name
                    .clone()
                    .unwrap_or_else(|| src.entity.clone()),
                weight: src.weight,
                temperature: temp,
                condition: reading.condition.clone(),
            },
            reading,
        ));
    }

    if contributing.is_empty() {
        return None;
    }

    let temperature = round_half_up(weighted / total_weight as f64);
    let spread = max_t - min_t;
    let confidence = confidence_from_spread(spread);
    let condition = majority_condition(contributing.iter().map(|(sr, _)| sr.condition.as_str()))?;

    // first source reaching the maximum weight wins
    let mut primary_idx = 0usize;
    for (i, (sr, _)) in contributing.iter().enumerate() {
        if sr.weight > contributing[primary_idx].0.weight {
            primary_idx = i;
        }
    }
    let primary = contributing[primary_idx].0.clone();
    let aux = contributing[primary_idx].1.aux.clone();

    Some(ConsensusResult {
        temperature,
        condition,
        confidence,
        spread,
        sources: contributing.into_iter().map(|(sr, _)| sr).collect(),
        primary,
        aux,
    })
}
