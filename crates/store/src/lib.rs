//! SQLite-backed record store.
//!
//! One table keyed by site id holds the raw description and every
//! enrichment output column. Enrichment only reads rows and updates
//! existing rows by key; it never inserts rows or alters columns.

pub mod error;
pub mod model;

pub use error::StoreError;
pub use model::{CoverageReport, EnrichmentRow, LengthStats, RawRecord, SiteSample};

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

const IN_MEMORY: &str = ":memory:";

/// Output columns reported by [`RecordStore::coverage`].
pub const OUTPUT_COLUMNS: [&str; 13] = [
    "description",
    "item_title",
    "item_keywords",
    "generated_description",
    "visibility",
    "condition_known",
    "class",
    "placement",
    "province",
    "county",
    "municipality",
    "parish",
    "qc_signals",
];

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS sites (
    id TEXT PRIMARY KEY NOT NULL,
    external_ref TEXT,
    description TEXT,
    item_title TEXT,
    item_keywords TEXT,
    generated_description TEXT,
    visibility INTEGER,
    condition_known INTEGER,
    class TEXT,
    placement TEXT,
    province TEXT,
    county TEXT,
    municipality TEXT,
    parish TEXT,
    qc_signals TEXT
)
"#;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite file, or `:memory:`.
    pub path: PathBuf,
    pub max_connections: u32,
    /// Records per run; `None` processes every row.
    pub batch_limit: Option<u32>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("heritage_sites.sqlite"),
            max_connections: 4,
            batch_limit: None,
        }
    }
}

impl StoreConfig {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// In-memory database; a single connection so every query sees the same data.
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::from(IN_MEMORY),
            max_connections: 1,
            batch_limit: None,
        }
    }

    fn is_in_memory(&self) -> bool {
        self.path.as_os_str() == IN_MEMORY
    }
}

#[derive(Debug, Clone)]
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    pub async fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let open_error = |source: sqlx::Error| StoreError::Open {
            path: config.path.display().to_string(),
            source,
        };

        let (options, max_connections) = if config.is_in_memory() {
            (
                SqliteConnectOptions::from_str("sqlite::memory:").map_err(open_error)?,
                1,
            )
        } else {
            (
                SqliteConnectOptions::new()
                    .filename(&config.path)
                    .create_if_missing(true),
                config.max_connections.max(1),
            )
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(open_error)?;

        info!(path = %config.path.display(), "record store opened");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the sites table if it does not exist. Existing tables are left as they are.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        info!("record store schema ready");
        Ok(())
    }

    /// Up to `limit` records ordered by id.
    pub async fn load_batch(&self, limit: Option<u32>) -> Result<Vec<RawRecord>, StoreError> {
        let records: Vec<RawRecord> = sqlx::query_as(
            r#"
            SELECT id, external_ref, description
            FROM sites
            ORDER BY id
            LIMIT ?
            "#,
        )
        .bind(limit.map(i64::from).unwrap_or(-1))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = records.len(), "loaded record batch");
        Ok(records)
    }

    /// Write one record's outputs in a single transaction.
    pub async fn save(&self, row: &EnrichmentRow) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE sites SET
                description = COALESCE(?, description),
                item_title = COALESCE(?, item_title),
                item_keywords = COALESCE(?, item_keywords),
                generated_description = ?,
                visibility = ?,
                condition_known = ?,
                class = ?,
                placement = ?,
                province = ?,
                county = ?,
                municipality = ?,
                parish = ?,
                qc_signals = ?
            WHERE id = ?
            "#,
        )
        .bind(&row.description)
        .bind(&row.item_title)
        .bind(&row.item_keywords)
        .bind(&row.generated_description)
        .bind(row.visibility)
        .bind(row.condition_known)
        .bind(&row.class)
        .bind(&row.placement)
        .bind(&row.province)
        .bind(&row.county)
        .bind(&row.municipality)
        .bind(&row.parish)
        .bind(&row.qc_signals)
        .bind(&row.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(StoreError::RecordMissing(row.id.clone()));
        }

        tx.commit().await?;
        debug!(record_id = %row.id, "enrichment saved");
        Ok(())
    }

    /// The stored outputs of one record, if it has been enriched.
    pub async fn load_result(&self, id: &str) -> Result<Option<EnrichmentRow>, StoreError> {
        let row = sqlx::query_as(
            r#"
            SELECT id, description, item_title, item_keywords, generated_description,
                   visibility, condition_known, class, placement,
                   province, county, municipality, parish, qc_signals
            FROM sites
            WHERE id = ? AND generated_description IS NOT NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn coverage(&self) -> Result<CoverageReport, StoreError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sites")
            .fetch_one(&self.pool)
            .await?;

        let mut populated = Vec::with_capacity(OUTPUT_COLUMNS.len());
        for column in OUTPUT_COLUMNS {
            let (count,): (i64,) =
                sqlx::query_as(&format!("SELECT COUNT(*) FROM sites WHERE {column} IS NOT NULL"))
                    .fetch_one(&self.pool)
                    .await?;
            populated.push((column.to_string(), count));
        }

        let (min, max, avg): (Option<i64>, Option<i64>, Option<f64>) = sqlx::query_as(
            r#"
            SELECT MIN(LENGTH(description)), MAX(LENGTH(description)), AVG(LENGTH(description))
            FROM sites
            WHERE description IS NOT NULL
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let description_lengths = match (min, max, avg) {
            (Some(min), Some(max), Some(avg)) => Some(LengthStats { min, max, avg }),
            _ => None,
        };

        let longest: Vec<SiteSample> = sqlx::query_as(
            r#"
            SELECT id, item_title, LENGTH(description) AS description_length
            FROM sites
            WHERE description IS NOT NULL
            ORDER BY LENGTH(description) DESC, id
            LIMIT 5
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(CoverageReport {
            total,
            populated,
            description_lengths,
            longest,
        })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
