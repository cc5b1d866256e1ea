use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One site as read from the store. Never modified by enrichment.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct RawRecord {
    pub id: String,
    /// Registry key (a UUID) used when the text has to be fetched.
    pub external_ref: Option<String>,
    /// Section-labeled description, absent until first resolved.
    #[sqlx(rename = "description")]
    pub raw_text: Option<String>,
}

impl RawRecord {
    pub fn text(&self) -> Option<&str> {
        self.raw_text.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// Every output column written for one record in a single update.
///
/// `description`, `item_title` and `item_keywords` are only written when
/// present; a record enriched from already-stored text keeps its earlier values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct EnrichmentRow {
    pub id: String,
    pub description: Option<String>,
    pub item_title: Option<String>,
    /// JSON array of keywords.
    pub item_keywords: Option<String>,
    pub generated_description: String,
    pub visibility: i64,
    pub condition_known: i64,
    pub class: Option<String>,
    pub placement: Option<String>,
    pub province: Option<String>,
    pub county: Option<String>,
    pub municipality: Option<String>,
    pub parish: Option<String>,
    /// JSON object with sorted keys.
    pub qc_signals: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LengthStats {
    pub min: i64,
    pub max: i64,
    pub avg: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct SiteSample {
    pub id: String,
    pub item_title: Option<String>,
    pub description_length: i64,
}

/// How much of the table carries enrichment output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageReport {
    pub total: i64,
    /// Non-null count per output column, in column order.
    pub populated: Vec<(String, i64)>,
    pub description_lengths: Option<LengthStats>,
    /// The sites with the longest stored descriptions.
    pub longest: Vec<SiteSample>,
}

impl CoverageReport {
    pub fn populated(&self, column: &str) -> Option<i64> {
        self.populated
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, count)| *count)
    }
}
