use std::collections::{BTreeMap, BTreeSet, HashMap};

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::domain::{ProteinRecord, label_name};
use crate::error::KiraError;

pub const FALSE_POSITIVE_GUARD: &str = "prepilin";
pub const LABEL_SEPARATOR: &str = ",";

#[derive(Debug, Clone)]
pub struct KeywordCategory {
    name: String,
    patterns: Vec<Regex>,
}

impl KeywordCategory {
    pub fn compile(name: &str, patterns: &[String]) -> Result<Self, KiraError> {
        let patterns = patterns
            .iter()
            .map(|pattern| pattern.trim())
            .filter(|pattern| !pattern.is_empty())
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|err| KiraError::InvalidKeywordPattern {
                        category: name.to_string(),
                        pattern: pattern.to_string(),
                        message: err.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, KiraError>>()?;
        if patterns.is_empty() {
            tracing::warn!(
                category = name,
                "keyword category has no patterns and never matches"
            );
        }
        Ok(Self {
            name: name.to_string(),
            patterns,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        label_name(&self.name)
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(text))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationStats {
    pub labelled: usize,
    pub unlabelled: usize,
    pub guarded: usize,
    pub label_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone)]
pub struct ClassifiedTable {
    pub records: Vec<ProteinRecord>,
    pub stats: ClassificationStats,
}

pub struct KeywordClassifier<'a> {
    categories: &'a [KeywordCategory],
}

impl<'a> KeywordClassifier<'a> {
    pub fn new(categories: &'a [KeywordCategory]) -> Self {
        Self { categories }
    }

    pub fn is_guarded(text: &str) -> bool {
        text.to_lowercase().contains(FALSE_POSITIVE_GUARD)
    }

    pub fn matching_labels(&self, text: &str) -> BTreeSet<&str> {
        if Self::is_guarded(text) {
            return BTreeSet::new();
        }
        self.categories
            .iter()
            .filter(|category| category.is_match(text))
            .map(|category| category.label())
            .collect()
    }

    /// A source ID matched by several categories gets one comma-joined label,
    /// attached to the rows carrying its first-seen (source ID, accession) pair.
    pub fn classify(&self, records: Vec<ProteinRecord>) -> ClassifiedTable {
        let mut stats = ClassificationStats::default();
        let mut grouped: HashMap<&str, (&str, BTreeSet<&str>)> = HashMap::new();

        for record in &records {
            let text = record.searchable_text();
            let labels = self.matching_labels(text);
            if labels.is_empty() {
                if Self::is_guarded(text) {
                    stats.guarded += 1;
                }
                continue;
            }
            grouped
                .entry(record.source_id.as_str())
                .or_insert_with(|| (record.accession.as_str(), BTreeSet::new()))
                .1
                .extend(labels);
        }

        let assigned: HashMap<(String, String), String> = grouped
            .into_iter()
            .map(|(source_id, (accession, labels))| {
                let joined = labels.into_iter().collect::<Vec<_>>().join(LABEL_SEPARATOR);
                ((source_id.to_string(), accession.to_string()), joined)
            })
            .collect();

        let records: Vec<ProteinRecord> = records
            .into_iter()
            .map(|mut record| {
                let key = (record.source_id.clone(), record.accession.clone());
                record.labels = assigned.get(&key).cloned();
                match &record.labels {
                    Some(labels) => {
                        stats.labelled += 1;
                        for label in labels.split(LABEL_SEPARATOR) {
                            *stats.label_counts.entry(label.to_string()).or_default() += 1;
                        }
                    }
                    None => stats.unlabelled += 1,
                }
                record
            })
            .collect();

        tracing::info!(
            labelled = stats.labelled,
            unlabelled = stats.unlabelled,
            guarded = stats.guarded,
            "keyword classification done"
        );
        ClassifiedTable { records, stats }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str, patterns: &[&str]) -> KeywordCategory {
        let patterns = patterns.iter().map(|p| p.to_string()).collect::<Vec<_>>();
        KeywordCategory::compile(name, &patterns).unwrap()
    }

    #[test]
    fn case_insensitive_match() {
        let kinase = category("kinase_keywords", &["kinase"]);
        assert!(kinase.is_match("Serine/threonine-protein KINASE"));
        assert_eq!(kinase.label(), "kinase");
    }

    #[test]
    fn empty_patterns_never_match() {
        let empty = category("empty_keywords", &["", "  "]);
        assert!(!empty.is_match("anything"));
    }

    #[test]
    fn invalid_pattern_is_config_error() {
        let err = KeywordCategory::compile("bad", &["(".to_string()]).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn guard_blocks_all_categories() {
        let categories = vec![category("peptidase_keywords", &["peptidase"])];
        let classifier = KeywordClassifier::new(&categories);
        assert!(classifier.matching_labels("Prepilin peptidase").is_empty());
        let labels = classifier.matching_labels("signal peptidase I");
        assert_eq!(labels.into_iter().collect::<Vec<_>>(), vec!["peptidase"]);
    }
}
