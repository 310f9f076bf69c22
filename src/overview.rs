use serde::Serialize;

use crate::domain::{ProteinId, ProteinRecord, SourceTag};
use crate::tables::OverviewRow;
use crate::taxonomy::TaxonomyLookup;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OverviewStats {
    pub overview_rows: usize,
    pub kept: usize,
    pub dropped_without_taxonomy: usize,
    pub dropped_null_category: usize,
}

impl OverviewStats {
    pub fn dropped(&self) -> usize {
        self.dropped_without_taxonomy + self.dropped_null_category
    }
}

#[derive(Debug, Clone)]
pub struct NormalizedOverview {
    pub records: Vec<ProteinRecord>,
    pub stats: OverviewStats,
}

pub struct OverviewNormalizer<'a> {
    prefix: &'a str,
    default_threshold: f64,
}

impl<'a> OverviewNormalizer<'a> {
    pub fn new(prefix: &'a str, default_threshold: f64) -> Self {
        Self {
            prefix,
            default_threshold,
        }
    }

    /// Inner-joins the overview against the taxonomy lookup and assigns
    /// `proteinID`s in join order. Descriptions stay raw; the `;` separator is
    /// substituted when the table is written.
    pub fn normalize(
        &self,
        rows: Vec<OverviewRow>,
        taxonomy: &TaxonomyLookup,
    ) -> NormalizedOverview {
        let mut stats = OverviewStats {
            overview_rows: rows.len(),
            ..OverviewStats::default()
        };
        let mut records = Vec::with_capacity(rows.len());

        for row in rows {
            let Some(entry) = taxonomy.get(&row.accession) else {
                stats.dropped_without_taxonomy += 1;
                continue;
            };
            let Some(category) = entry.category.clone() else {
                stats.dropped_null_category += 1;
                continue;
            };
            records.push(ProteinRecord {
                protein_id: ProteinId::new(self.prefix, records.len()),
                source: SourceTag::from_source_id(&row.source_id),
                sequence: row.sequence,
                source_id: row.source_id,
                organism: row.organism,
                accession: row.accession,
                original_annotation: row.description,
                category,
                taxid: entry.tax_id.clone(),
                labels: None,
                threshold: self.default_threshold,
                annotation: None,
                merged_description: None,
            });
        }

        stats.kept = records.len();
        if stats.dropped() > 0 {
            tracing::warn!(
                without_taxonomy = stats.dropped_without_taxonomy,
                null_category = stats.dropped_null_category,
                "overview rows dropped at taxonomy join"
            );
        }
        tracing::info!(rows = stats.overview_rows, kept = stats.kept, "overview normalized");
        NormalizedOverview { records, stats }
    }
}
