use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

use crate::error::KiraError;
use crate::tables::TaxonomyRow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonEntry {
    pub category: Option<String>,
    pub tax_id: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaxonomyStats {
    pub records: usize,
    pub kept: usize,
    pub missing_tax_id: usize,
    pub duplicate_accessions: usize,
}

#[derive(Debug, Clone, Default)]
pub struct TaxonomyLookup {
    entries: HashMap<String, TaxonEntry>,
    stats: TaxonomyStats,
}

impl TaxonomyLookup {
    pub fn get(&self, accession: &str) -> Option<&TaxonEntry> {
        self.entries.get(accession)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> TaxonomyStats {
        self.stats
    }
}

pub struct TaxonomyResolver;

impl TaxonomyResolver {
    // Repeated accessions keep the first record with a category, so the
    // overview join never sees more than one entry per accession.
    pub fn resolve(
        rows: Vec<TaxonomyRow>,
        source: &Path,
    ) -> Result<TaxonomyLookup, KiraError> {
        let mut stats = TaxonomyStats {
            records: rows.len(),
            ..TaxonomyStats::default()
        };
        let mut entries: HashMap<String, TaxonEntry> = HashMap::with_capacity(rows.len());

        for row in rows {
            let Some(raw_tax_id) = row.tax_id else {
                stats.missing_tax_id += 1;
                continue;
            };
            let tax_id = normalize_tax_id(&raw_tax_id).ok_or_else(|| {
                KiraError::MalformedRecord {
                    file: source.to_path_buf(),
                    line: row.line,
                    message: format!(
                        "accession {}: invalid tax_id {raw_tax_id:?}",
                        row.accession
                    ),
                }
            })?;
            let category = row.domain.or(row.acellular_root);
            match entries.get_mut(&row.accession) {
                Some(entry) if entry.category.is_none() && category.is_some() => {
                    stats.duplicate_accessions += 1;
                    *entry = TaxonEntry { category, tax_id };
                }
                Some(_) => stats.duplicate_accessions += 1,
                None => {
                    entries.insert(row.accession, TaxonEntry { category, tax_id });
                }
            }
        }

        stats.kept = entries.len();
        tracing::info!(
            records = stats.records,
            kept = stats.kept,
            missing_tax_id = stats.missing_tax_id,
            duplicates = stats.duplicate_accessions,
            "taxonomy resolved"
        );
        Ok(TaxonomyLookup { entries, stats })
    }
}

pub fn normalize_tax_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<u64>() {
        return Some(value.to_string());
    }
    let value = trimmed.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 {
        Some(format!("{value:.0}"))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tax_id_forms() {
        assert_eq!(normalize_tax_id("562").as_deref(), Some("562"));
        assert_eq!(normalize_tax_id("562.0").as_deref(), Some("562"));
        assert_eq!(normalize_tax_id(" 9606 ").as_deref(), Some("9606"));
        assert_eq!(normalize_tax_id("562.5"), None);
        assert_eq!(normalize_tax_id("abc"), None);
    }
}
