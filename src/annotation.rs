use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::domain::{AnnotationSummary, ProteinRecord};
use crate::tables::SignatureHit;

pub const MERGED_DESCRIPTION_LABEL: &str = "Interproscan";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnnotationStats {
    pub hits: usize,
    pub proteins_with_hits: usize,
    pub annotated: usize,
    pub without_hits: usize,
    pub unmatched_hit_proteins: usize,
}

#[derive(Debug, Clone)]
pub struct AnnotatedTable {
    pub records: Vec<ProteinRecord>,
    pub stats: AnnotationStats,
}

#[derive(Default)]
struct HitGroup {
    analysis_dbs: BTreeSet<String>,
    signature_accessions: BTreeSet<String>,
    signature_descriptions: BTreeSet<String>,
    interpro_accessions: BTreeMap<String, usize>,
    interpro_descriptions: BTreeMap<String, usize>,
}

impl HitGroup {
    fn add(&mut self, hit: &SignatureHit) {
        if let Some(value) = &hit.analysis_db {
            self.analysis_dbs.insert(value.clone());
        }
        if let Some(value) = &hit.signature_accession {
            self.signature_accessions.insert(value.clone());
        }
        if let Some(value) = &hit.signature_description {
            self.signature_descriptions.insert(value.clone());
        }
        if let Some(value) = &hit.interpro_accession {
            *self.interpro_accessions.entry(value.clone()).or_default() += 1;
        }
        if let Some(value) = &hit.interpro_description {
            *self.interpro_descriptions.entry(value.clone()).or_default() += 1;
        }
    }

    fn summarize(self) -> AnnotationSummary {
        AnnotationSummary {
            representative_accession: most_frequent(&self.interpro_accessions),
            representative_description: most_frequent(&self.interpro_descriptions),
            analysis_dbs: self.analysis_dbs.into_iter().collect(),
            signature_accessions: self.signature_accessions.into_iter().collect(),
            signature_descriptions: self.signature_descriptions.into_iter().collect(),
            interpro_accessions: self.interpro_accessions.into_keys().collect(),
            interpro_descriptions: self.interpro_descriptions.into_keys().collect(),
        }
    }
}

pub struct AnnotationAggregator;

impl AnnotationAggregator {
    pub fn aggregate(hits: &[SignatureHit]) -> BTreeMap<String, AnnotationSummary> {
        let mut groups: BTreeMap<String, HitGroup> = BTreeMap::new();
        for hit in hits {
            groups
                .entry(hit.protein_accession.clone())
                .or_default()
                .add(hit);
        }
        groups
            .into_iter()
            .map(|(accession, group)| (accession, group.summarize()))
            .collect()
    }

    pub fn merge(
        records: Vec<ProteinRecord>,
        mut summaries: BTreeMap<String, AnnotationSummary>,
        hits: usize,
    ) -> AnnotatedTable {
        let mut stats = AnnotationStats {
            hits,
            proteins_with_hits: summaries.len(),
            ..AnnotationStats::default()
        };

        let records: Vec<ProteinRecord> = records
            .into_iter()
            .map(|mut record| {
                let summary = summaries
                    .remove(record.protein_id.as_str())
                    .filter(|summary| !summary.is_empty());
                match &summary {
                    Some(_) => stats.annotated += 1,
                    None => stats.without_hits += 1,
                }
                let representative = summary
                    .as_ref()
                    .and_then(|summary| summary.representative_description.as_deref());
                record.merged_description =
                    Some(merge_descriptions(&record.original_annotation, representative));
                record.annotation = summary;
                record
            })
            .collect();

        stats.unmatched_hit_proteins = summaries.len();
        if stats.unmatched_hit_proteins > 0 {
            tracing::warn!(
                unmatched = stats.unmatched_hit_proteins,
                "signature hits reference proteins absent from the table"
            );
        }
        tracing::info!(
            hits = stats.hits,
            annotated = stats.annotated,
            without_hits = stats.without_hits,
            "annotations merged"
        );
        AnnotatedTable { records, stats }
    }
}

pub fn merge_descriptions(original: &str, representative: Option<&str>) -> String {
    match representative {
        Some(description) => format!("{original} | {MERGED_DESCRIPTION_LABEL}: {description}"),
        None => original.to_string(),
    }
}

/// Highest count wins; ties go to the lexicographically smallest value.
pub fn most_frequent(counts: &BTreeMap<String, usize>) -> Option<String> {
    let mut best: Option<(&String, usize)> = None;
    for (value, &count) in counts {
        if best.map(|(_, top)| count > top).unwrap_or(true) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.clone())
}
