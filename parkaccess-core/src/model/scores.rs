//! Accessibility scores produced by the aggregation stages

use serde::{Serialize, Serializer};

/// Accessibility score in percent of residential land covered.
///
/// `NotApplicable` marks entities without residential land or without any
/// scorable constituents, such entities are left out of every aggregate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    Value(f64),
    NotApplicable,
}

impl Score {
    /// Builds a score from a coverage percentage, clamping overlay noise into [0, 100]
    pub fn clamped(percent: f64) -> Self {
        if percent.is_nan() {
            return Score::NotApplicable;
        }
        Score::Value(percent.clamp(0.0, 100.0))
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Score::Value(v) => Some(*v),
            Score::NotApplicable => None,
        }
    }

    pub fn is_applicable(&self) -> bool {
        matches!(self, Score::Value(_))
    }

    /// Score rounded to two decimals, `None` when not applicable
    pub fn rounded(&self) -> Option<f64> {
        self.value().map(round2)
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rounded().serialize(serializer)
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Score of a single tract
#[derive(Debug, Clone)]
pub struct TractScore {
    pub tract_id: String,
    pub score: Score,
    /// Residential land area used as weight by the neighborhood aggregation
    pub residential_area: f64,
    /// Residential land area inside the union of park isochrones
    pub covered_area: f64,
}

/// Score of a neighborhood with its resolved constituents
#[derive(Debug, Clone)]
pub struct NeighborhoodScore {
    pub neighborhood_id: String,
    pub score: Score,
    pub is_underserved: bool,
    /// Scored, yet not a single square metre of residential land reaches a park
    pub is_underserved_strict: bool,
    pub tract_ids: Vec<String>,
    /// Residential land area of the constituents that have a defined score
    pub residential_area: f64,
    /// Part of `residential_area` outside every park isochrone
    pub uncovered_residential_area: f64,
}

impl NeighborhoodScore {
    /// Share of residential land without a park within the time budget
    pub fn pct_without_access(&self) -> Option<f64> {
        self.score.value().map(|s| round2(100.0 - s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_overlay_noise() {
        assert_eq!(Score::clamped(100.000_000_1), Score::Value(100.0));
        assert_eq!(Score::clamped(-1e-9), Score::Value(0.0));
        assert_eq!(Score::clamped(f64::NAN), Score::NotApplicable);
    }

    #[test]
    fn not_applicable_serializes_as_null() {
        assert_eq!(serde_json::to_string(&Score::NotApplicable).unwrap(), "null");
        assert_eq!(serde_json::to_string(&Score::Value(33.333)).unwrap(), "33.33");
    }
}
