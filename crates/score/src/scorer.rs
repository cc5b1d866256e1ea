use std::collections::BTreeSet;
use std::sync::Arc;

use extract::{CanonicalField, ParsedFields};
use serde::Serialize;

use crate::rules::ScoringRules;

/// Measurements beyond this many distinct tokens add nothing to the score.
pub const MEASUREMENT_CAP: usize = 5;

/// Scores at or above this are considered informative.
pub const INFORMATIVE_THRESHOLD: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u8")]
pub enum Visibility {
    NotVisible,
    Unknown,
    Visible,
}

impl Visibility {
    pub fn code(self) -> u8 {
        match self {
            Visibility::NotVisible => 0,
            Visibility::Unknown => 1,
            Visibility::Visible => 2,
        }
    }
}

impl From<Visibility> for u8 {
    fn from(v: Visibility) -> u8 {
        v.code()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u8")]
pub enum ConditionConfidence {
    /// Empty or disclaimed description.
    Unreliable,
    Baseline,
    Informative,
}

impl ConditionConfidence {
    pub fn code(self) -> u8 {
        match self {
            ConditionConfidence::Unreliable => 0,
            ConditionConfidence::Baseline => 1,
            ConditionConfidence::Informative => 2,
        }
    }
}

impl From<ConditionConfidence> for u8 {
    fn from(c: ConditionConfidence) -> u8 {
        c.code()
    }
}

/// Components of the richness score of one description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetailScore {
    /// Distinct measurement tokens, in order of first appearance.
    pub measurements: Vec<String>,
    /// Matched hints, in vocabulary order.
    pub feature_hints: Vec<String>,
}

impl DetailScore {
    pub fn total(&self) -> usize {
        self.measurements.len().min(MEASUREMENT_CAP) + self.feature_hints.len()
    }
}

/// Everything the scorer derives for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub visibility: Visibility,
    pub condition: ConditionConfidence,
    pub disclaimer_present: bool,
    pub detail: DetailScore,
}

#[derive(Debug, Clone)]
pub struct QualityScorer {
    rules: Arc<ScoringRules>,
}

impl QualityScorer {
    pub fn new(rules: Arc<ScoringRules>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    /// "Not visible" patterns win over "visible" ones.
    pub fn visibility(&self, placement: &str) -> Visibility {
        if self.rules.not_visible.iter().any(|p| p.is_match(placement)) {
            return Visibility::NotVisible;
        }
        if self.rules.visible.iter().any(|p| p.is_match(placement)) {
            return Visibility::Visible;
        }
        Visibility::Unknown
    }

    pub fn disclaimer_present(&self, raw_text: &str, fields: &ParsedFields) -> bool {
        let disclaimers = &self.rules.disclaimers;
        disclaimers.is_present(raw_text)
            || disclaimers.is_present(fields.text(CanonicalField::DescriptionSv))
    }

    pub fn detail_score(&self, description: &str) -> DetailScore {
        if description.trim().is_empty() {
            return DetailScore::default();
        }

        let mut seen = BTreeSet::new();
        let measurements = self
            .rules
            .measurement
            .find_iter(description)
            .map(|m| m.as_str().to_string())
            .filter(|m| seen.insert(m.clone()))
            .collect();

        let lowered = description.to_lowercase();
        let feature_hints = self
            .rules
            .feature_hints
            .iter()
            .filter(|hint| lowered.contains(hint.as_str()))
            .cloned()
            .collect();

        DetailScore {
            measurements,
            feature_hints,
        }
    }

    pub fn condition(&self, raw_text: &str, fields: &ParsedFields) -> ConditionConfidence {
        self.assess(raw_text, fields).condition
    }

    pub fn assess(&self, raw_text: &str, fields: &ParsedFields) -> Assessment {
        let description = fields.text(CanonicalField::DescriptionSv);
        let disclaimer_present = self.disclaimer_present(raw_text, fields);
        let detail = self.detail_score(description);

        // the sparse and middle ranges share one class
        let condition = if description.trim().is_empty() || disclaimer_present {
            ConditionConfidence::Unreliable
        } else if detail.total() >= INFORMATIVE_THRESHOLD {
            ConditionConfidence::Informative
        } else {
            ConditionConfidence::Baseline
        };

        Assessment {
            visibility: self.visibility(fields.text(CanonicalField::Placement)),
            condition,
            disclaimer_present,
            detail,
        }
    }
}

impl Default for QualityScorer {
    fn default() -> Self {
        Self::new(Arc::new(ScoringRules::default()))
    }
}
