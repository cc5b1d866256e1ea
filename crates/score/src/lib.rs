//! Deterministic visibility and condition-confidence classes for parsed records.

pub mod rules;
pub mod scorer;

pub use rules::{FEATURE_HINTS, ScoringConfig, ScoringRules};
pub use scorer::{Assessment, ConditionConfidence, DetailScore, QualityScorer, Visibility};
