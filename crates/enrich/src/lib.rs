//! Record enrichment: fetch, resolve, parse, score and persist heritage-site
//! records, one at a time, with per-record failure isolation.
//!
//! A record is either fully enriched and written in one update or not written
//! at all. Re-running over an unchanged store rewrites identical rows.

pub mod cache;
pub mod config;
pub mod enricher;
pub mod error;
pub mod stats;

pub use cache::{CacheStats, CachingSummarizer};
pub use config::{AppConfig, CacheConfig};
pub use enricher::{Enricher, MISSING, MissingReason, QcSignals, RecordOutcome};
pub use error::{ConfigError, EnrichError, RecordError};
pub use stats::RunStatistics;
