use std::sync::Arc;

use extract::{
    CanonicalField, ClassLabels, FieldParser, FieldVocabulary, GraphResolver, OllamaSummarizer,
    ParsedFields, Resolution, ResolveError, Summarizer, build_description_input,
    build_summary_prompt,
};
use registry::{FetchError, ThrottledClient};
use score::{QualityScorer, ScoringRules};
use serde::Serialize;
use store::{EnrichmentRow, RawRecord, RecordStore};
use tracing::{debug, info, warn};

use crate::cache::CachingSummarizer;
use crate::config::AppConfig;
use crate::error::{EnrichError, RecordError};
use crate::stats::RunStatistics;

/// Stored in place of a generated description when none could be produced.
pub const MISSING: &str = "missing";

const PROGRESS_EVERY: usize = 10;
const PREVIEWED_SUCCESSES: usize = 5;
const PREVIEW_CHARS: usize = 200;

/// Why a record was written without a generated description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingReason {
    NoUsableDescription,
    NoGraph,
    NotFound,
}

impl MissingReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingReason::NoUsableDescription => "no_usable_description",
            MissingReason::NoGraph => "no_graph",
            MissingReason::NotFound => "not_found",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The row as written.
    Enriched(Box<EnrichmentRow>),
    Missing(MissingReason),
    /// No stored text and fetching is disabled; nothing written.
    Skipped,
}

/// Diagnostic signals persisted with each written record. Field order is
/// alphabetical so the serialized form is stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QcSignals {
    Scored {
        detail_score: usize,
        disclaimer_present: bool,
        feature_hints: Vec<String>,
        measurements: usize,
        placement: String,
    },
    Skipped {
        reason: &'static str,
    },
}

/// Runs fetch, resolve, parse, score and persist over a batch of records,
/// one record at a time.
pub struct Enricher {
    store: RecordStore,
    client: Option<ThrottledClient>,
    resolver: GraphResolver,
    parser: FieldParser,
    scorer: QualityScorer,
    class_labels: Arc<ClassLabels>,
    summarizer: Option<Arc<dyn Summarizer>>,
    summary_cache: Option<Arc<CachingSummarizer>>,
}

impl Enricher {
    pub fn new(store: RecordStore) -> Self {
        Self {
            store,
            client: None,
            resolver: GraphResolver::default(),
            parser: FieldParser::default(),
            scorer: QualityScorer::default(),
            class_labels: Arc::new(ClassLabels::default()),
            summarizer: None,
            summary_cache: None,
        }
    }

    pub fn from_config(config: &AppConfig, store: RecordStore) -> Result<Self, EnrichError> {
        let rules = ScoringRules::from_config(&config.scoring)?;
        let mut enricher = Self::new(store)
            .with_resolver(GraphResolver::new(config.resolver.clone()))
            .with_parser(FieldParser::new(Arc::new(FieldVocabulary::default())))
            .with_scorer(QualityScorer::new(Arc::new(rules)));

        if config.fetch_missing {
            enricher = enricher.with_client(ThrottledClient::new(
                config.registry.clone(),
                &config.requests,
            )?);
        }

        if config.summarizer.enabled {
            let ollama: Arc<dyn Summarizer> = Arc::new(OllamaSummarizer::new(&config.summarizer)?);
            enricher = if config.cache.enabled {
                enricher.with_cached_summarizer(Arc::new(CachingSummarizer::new(
                    ollama,
                    config.cache.max_entries,
                )))
            } else {
                enricher.with_summarizer(ollama)
            };
        }

        Ok(enricher)
    }

    pub fn with_client(mut self, client: ThrottledClient) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_resolver(mut self, resolver: GraphResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_parser(mut self, parser: FieldParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_scorer(mut self, scorer: QualityScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_class_labels(mut self, class_labels: ClassLabels) -> Self {
        self.class_labels = Arc::new(class_labels);
        self
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self.summary_cache = None;
        self
    }

    pub fn with_cached_summarizer(mut self, cache: Arc<CachingSummarizer>) -> Self {
        let summarizer: Arc<dyn Summarizer> = cache.clone();
        self.summarizer = Some(summarizer);
        self.summary_cache = Some(cache);
        self
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Process up to `limit` records. Only a failure to load the batch is
    /// returned as an error; record failures are counted in the statistics.
    pub async fn run(&self, limit: Option<u32>) -> Result<RunStatistics, EnrichError> {
        let records = self.store.load_batch(limit).await?;
        let total = records.len();
        let mut stats = RunStatistics::new(total);
        let mut previewed = 0;

        info!(total, fetch = self.client.is_some(), "starting enrichment run");

        for (i, record) in records.iter().enumerate() {
            match self.process(record, &mut stats).await {
                Ok(RecordOutcome::Enriched(row)) => {
                    stats.record_enriched();
                    if previewed < PREVIEWED_SUCCESSES {
                        previewed += 1;
                        preview(record, &row);
                    }
                }
                Ok(RecordOutcome::Missing(reason)) => {
                    debug!(record_id = %record.id, reason = reason.as_str(), "no description generated");
                    stats.record_missing();
                }
                Ok(RecordOutcome::Skipped) => {
                    debug!(record_id = %record.id, "no stored text, fetching disabled");
                    stats.record_skipped();
                }
                Err(e) => {
                    warn!(record_id = %record.id, error = %e, "record failed");
                    stats.record_failure(&record.id, &e);
                }
            }

            let done = i + 1;
            if done % PROGRESS_EVERY == 0 {
                info!(
                    processed = done,
                    total,
                    percent = %format!("{:.1}", done as f64 / total as f64 * 100.0),
                    written = stats.records_written(),
                    failed = stats.records_failed,
                    "progress"
                );
            }
        }

        if let Some(cache) = &self.summary_cache {
            let cache_stats = cache.stats();
            info!(
                entries = cache_stats.entries,
                hits = cache_stats.hits,
                misses = cache_stats.misses,
                "summary cache"
            );
        }

        stats.finish();
        Ok(stats)
    }

    /// Enrich and persist one record. Nothing is written unless every step succeeds.
    pub async fn process(
        &self,
        record: &RawRecord,
        stats: &mut RunStatistics,
    ) -> Result<RecordOutcome, RecordError> {
        let (text, resolution) = match record.text() {
            Some(text) => (text.to_string(), None),
            None => {
                let Some(client) = &self.client else {
                    return Ok(RecordOutcome::Skipped);
                };
                match self.fetch_and_resolve(client, record, stats).await? {
                    Ok(resolution) => (resolution.description.clone(), Some(resolution)),
                    Err(reason) => {
                        let row = no_data_row(record, reason)?;
                        self.store.save(&row).await?;
                        return Ok(RecordOutcome::Missing(reason));
                    }
                }
            }
        };

        let fields = self.parser.parse(&text);
        let input = build_description_input(
            &fields,
            &self.class_labels,
            self.scorer.rules().disclaimers(),
        );

        let mut row = fields_row(record, &fields, resolution.as_ref())?;

        let Some(input) = input else {
            row.qc_signals = encode(&QcSignals::Skipped {
                reason: MissingReason::NoUsableDescription.as_str(),
            })?;
            self.store.save(&row).await?;
            return Ok(RecordOutcome::Missing(MissingReason::NoUsableDescription));
        };

        if let Some(summarizer) = &self.summarizer {
            row.generated_description = summarizer.summarize(&build_summary_prompt(&input)).await?;
        }

        let assessment = self.scorer.assess(&text, &fields);
        row.visibility = i64::from(assessment.visibility.code());
        row.condition_known = i64::from(assessment.condition.code());
        row.qc_signals = encode(&QcSignals::Scored {
            detail_score: assessment.detail.total(),
            disclaimer_present: assessment.disclaimer_present,
            feature_hints: assessment.detail.feature_hints,
            measurements: assessment.detail.measurements.len(),
            placement: fields.text(CanonicalField::Placement).to_string(),
        })?;

        self.store.save(&row).await?;
        debug!(record_id = %record.id, visibility = row.visibility, condition = row.condition_known, "record enriched");
        Ok(RecordOutcome::Enriched(Box::new(row)))
    }

    /// The inner `Err` is a "no data" outcome that is still persisted.
    async fn fetch_and_resolve(
        &self,
        client: &ThrottledClient,
        record: &RawRecord,
        stats: &mut RunStatistics,
    ) -> Result<Result<Resolution, MissingReason>, RecordError> {
        let reference = record
            .external_ref
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| RecordError::MissingReference(record.id.clone()))?;

        let payload = match client.fetch_record(reference).await {
            Ok(payload) => {
                stats.record_request(true);
                payload
            }
            Err(e @ FetchError::InvalidReference(_)) => return Err(e.into()),
            Err(FetchError::NotFound(url)) => {
                stats.record_request(false);
                debug!(record_id = %record.id, url = %url, "registry has no document");
                return Ok(Err(MissingReason::NotFound));
            }
            Err(e) => {
                stats.record_request(false);
                return Err(e.into());
            }
        };

        match self.resolver.resolve_json(&payload) {
            Ok(resolution) => {
                stats.record_fields(&resolution.found);
                Ok(Ok(resolution))
            }
            Err(ResolveError::NoGraph) => Ok(Err(MissingReason::NoGraph)),
            Err(e) => Err(e.into()),
        }
    }

}

fn preview(record: &RawRecord, row: &EnrichmentRow) {
    let source = record
        .text()
        .or(row.description.as_deref())
        .unwrap_or_default();
    info!(
        record_id = %record.id,
        title = row.item_title.as_deref().unwrap_or("No title"),
        description = %truncate(&row.generated_description, PREVIEW_CHARS),
        source_chars = source.chars().count(),
        "enriched"
    );
}

/// Row for a record whose text was parsed, before summarizing and scoring.
fn fields_row(
    record: &RawRecord,
    fields: &ParsedFields,
    resolution: Option<&Resolution>,
) -> Result<EnrichmentRow, RecordError> {
    let keywords = match resolution {
        Some(r) if !r.keywords.is_empty() => Some(serde_json::to_string(&r.keywords)?),
        _ => None,
    };
    let field = |f: CanonicalField| fields.get(f).map(str::to_string);

    Ok(EnrichmentRow {
        id: record.id.clone(),
        description: resolution.map(|r| r.description.clone()),
        item_title: resolution.and_then(|r| r.title.clone()),
        item_keywords: keywords,
        generated_description: MISSING.to_string(),
        visibility: 0,
        condition_known: 0,
        class: field(CanonicalField::Class),
        placement: field(CanonicalField::Placement),
        province: field(CanonicalField::Province),
        county: field(CanonicalField::County),
        municipality: field(CanonicalField::Municipality),
        parish: field(CanonicalField::Parish),
        qc_signals: String::new(),
    })
}

fn no_data_row(record: &RawRecord, reason: MissingReason) -> Result<EnrichmentRow, RecordError> {
    let mut row = fields_row(record, &ParsedFields::new(), None)?;
    row.qc_signals = encode(&QcSignals::Skipped {
        reason: reason.as_str(),
    })?;
    Ok(row)
}

fn encode(signals: &QcSignals) -> Result<String, RecordError> {
    Ok(serde_json::to_string(signals)?)
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
