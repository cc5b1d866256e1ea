use extract::{DisclaimerSet, STANDARD_DISCLAIMERS};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

pub const NOT_VISIBLE_PATTERNS: [&str; 4] = [
    r"\bEj synlig\b",
    r"\bundermark\b",
    r"\bunder mark\b",
    r"\bövertäckt\b",
];

pub const VISIBLE_PATTERNS: [&str; 2] = [r"\bSynlig ovan mark\b", r"\bTydligt synlig\b"];

/// A number followed by a length unit, e.g. `5 m` or `0,5 m`.
pub const MEASUREMENT_PATTERN: &str = r"\b\d+(?:[\.,]\d+)?\s*(?:m|meter|cm|mm)\b";

/// Structural and archaeological terms that indicate a detailed description.
pub const FEATURE_HINTS: [&str; 15] = [
    "kantkedja",
    "rest sten",
    "stenkista",
    "mittgrop",
    "kerb",
    "cist",
    "skyttevärn",
    "häll",
    "hällrist",
    "älvkvarn",
    "kantställd",
    "vall",
    "röse",
    "stensättning",
    "tomtning",
];

/// Serializable form of [`ScoringRules`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub not_visible: Vec<String>,
    pub visible: Vec<String>,
    pub measurement: String,
    pub feature_hints: Vec<String>,
    pub disclaimers: Vec<String>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        fn owned(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }

        Self {
            not_visible: owned(&NOT_VISIBLE_PATTERNS),
            visible: owned(&VISIBLE_PATTERNS),
            measurement: MEASUREMENT_PATTERN.to_string(),
            feature_hints: owned(&FEATURE_HINTS),
            disclaimers: owned(&STANDARD_DISCLAIMERS),
        }
    }
}

/// Compiled pattern sets. Built once and shared by every scoring call.
#[derive(Debug, Clone)]
pub struct ScoringRules {
    pub(crate) not_visible: Vec<Regex>,
    pub(crate) visible: Vec<Regex>,
    pub(crate) measurement: Regex,
    pub(crate) feature_hints: Vec<String>,
    pub(crate) disclaimers: DisclaimerSet,
}

impl ScoringRules {
    pub fn from_config(config: &ScoringConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            not_visible: compile_all(&config.not_visible)?,
            visible: compile_all(&config.visible)?,
            measurement: compile(&config.measurement)?,
            feature_hints: config
                .feature_hints
                .iter()
                .map(|h| h.to_lowercase())
                .collect(),
            disclaimers: DisclaimerSet::new(config.disclaimers.as_slice())?,
        })
    }

    pub fn disclaimers(&self) -> &DisclaimerSet {
        &self.disclaimers
    }
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self::from_config(&ScoringConfig::default()).expect("built-in scoring patterns")
    }
}

fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

fn compile_all(patterns: &[String]) -> Result<Vec<Regex>, regex::Error> {
    patterns.iter().map(|p| compile(p)).collect()
}
