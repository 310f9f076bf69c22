use std::time::{Duration, Instant};

use serde::Serialize;

use crate::annotation::{AnnotationAggregator, AnnotationStats};
use crate::classifier::{ClassificationStats, KeywordClassifier};
use crate::config::ResolvedConfig;
use crate::error::KiraError;
use crate::finalize::TableFinalizer;
use crate::overview::{OverviewNormalizer, OverviewStats};
use crate::store::Store;
use crate::tables::{self, TableLayout};
use crate::taxonomy::{TaxonomyResolver, TaxonomyStats};

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub generated_at: String,
    pub output_path: String,
    pub rows_written: usize,
    pub annotations_enabled: bool,
    pub taxonomy: TaxonomyStats,
    pub overview: OverviewStats,
    pub annotation: Option<AnnotationStats>,
    pub classification: ClassificationStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub overview_file: String,
    pub taxonomy_file: String,
    pub interpro_file: Option<String>,
    pub protein_id_prefix: String,
    pub default_threshold: f64,
    pub labelled_threshold: f64,
    pub unlabelled_threshold: f64,
    pub categories: Vec<CategorySummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub name: String,
    pub label: String,
}

impl From<&ResolvedConfig> for ConfigSummary {
    fn from(config: &ResolvedConfig) -> Self {
        Self {
            overview_file: config.inputs.overview.to_string(),
            taxonomy_file: config.inputs.taxonomy.to_string(),
            interpro_file: config.inputs.annotations.as_ref().map(|path| path.to_string()),
            protein_id_prefix: config.protein_id_prefix.clone(),
            default_threshold: config.thresholds.default,
            labelled_threshold: config.thresholds.labelled,
            unlabelled_threshold: config.thresholds.unlabelled,
            categories: config
                .categories
                .iter()
                .map(|category| CategorySummary {
                    name: category.name().to_string(),
                    label: category.label().to_string(),
                })
                .collect(),
        }
    }
}

/// Taxonomy -> Overview -> (Annotation) -> Classification -> Finalization.
/// Only the final stage touches `table_library_complete.csv`.
pub struct Pipeline {
    config: ResolvedConfig,
    store: Store,
}

impl Pipeline {
    pub fn new(config: ResolvedConfig, store: Store) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn run(&self, sink: &dyn ProgressSink) -> Result<RunReport, KiraError> {
        self.config.check_inputs()?;
        self.store.ensure_output_root()?;
        let inputs = &self.config.inputs;

        let started = Instant::now();
        let taxonomy_rows = tables::read_taxonomy(inputs.taxonomy.as_std_path())?;
        let taxonomy = TaxonomyResolver::resolve(taxonomy_rows, inputs.taxonomy.as_std_path())?;
        let taxonomy_stats = taxonomy.stats();
        sink.event(ProgressEvent {
            message: format!(
                "phase=Taxonomy; {} records, {} kept, {} without tax id",
                taxonomy_stats.records, taxonomy_stats.kept, taxonomy_stats.missing_tax_id
            ),
            elapsed: Some(started.elapsed()),
        });

        let started = Instant::now();
        let overview_rows = tables::read_overview(inputs.overview.as_std_path())?;
        let normalizer = OverviewNormalizer::new(
            &self.config.protein_id_prefix,
            self.config.thresholds.default,
        );
        let normalized = normalizer.normalize(overview_rows, &taxonomy);
        tables::write_library_table(
            &self.store.formatted_table_path(),
            &normalized.records,
            TableLayout::Base,
        )?;
        sink.event(ProgressEvent {
            message: format!(
                "phase=Overview; {} rows, {} kept, {} dropped at taxonomy join",
                normalized.stats.overview_rows,
                normalized.stats.kept,
                normalized.stats.dropped()
            ),
            elapsed: Some(started.elapsed()),
        });

        let (records, annotation_stats) = match &inputs.annotations {
            Some(path) => {
                let started = Instant::now();
                let hits = tables::read_signature_hits(path.as_std_path())?;
                let summaries = AnnotationAggregator::aggregate(&hits);
                let annotated =
                    AnnotationAggregator::merge(normalized.records, summaries, hits.len());
                let stats = annotated.stats;
                sink.event(ProgressEvent {
                    message: format!(
                        "phase=Annotation; {} hits, {} proteins annotated, {} without hits",
                        stats.hits, stats.annotated, stats.without_hits
                    ),
                    elapsed: Some(started.elapsed()),
                });
                (annotated.records, Some(stats))
            }
            None => (normalized.records, None),
        };

        let started = Instant::now();
        let classified = KeywordClassifier::new(&self.config.categories).classify(records);
        sink.event(ProgressEvent {
            message: format!(
                "phase=Classification; {} labelled, {} unlabelled",
                classified.stats.labelled, classified.stats.unlabelled
            ),
            elapsed: Some(started.elapsed()),
        });

        let started = Instant::now();
        let finalizer = TableFinalizer::new(self.config.thresholds, annotation_stats.is_some());
        let records = finalizer.assign_thresholds(classified.records);
        let output_path = finalizer.persist(&self.store, &records)?;
        sink.event(ProgressEvent {
            message: format!("phase=Finalize; {} rows written to {output_path}", records.len()),
            elapsed: Some(started.elapsed()),
        });

        Ok(RunReport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            output_path: output_path.to_string(),
            rows_written: records.len(),
            annotations_enabled: annotation_stats.is_some(),
            taxonomy: taxonomy_stats,
            overview: normalized.stats,
            annotation: annotation_stats,
            classification: classified.stats,
        })
    }
}
