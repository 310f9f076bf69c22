use std::fmt;

use serde::Serialize;

pub const DEFAULT_PROTEIN_ID_PREFIX: &str = "cancer_";
pub const FIELD_SEPARATOR: char = ';';
pub const SEPARATOR_SUBSTITUTE: char = '-';
pub const CATEGORY_SUFFIX: &str = "_keywords";
const GENBANK_INFIX: &str = "GCA";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ProteinId(String);

impl ProteinId {
    pub fn new(prefix: &str, index: usize) -> Self {
        Self(format!("{prefix}{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProteinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SourceTag {
    GenBank,
    RefSeq,
}

impl SourceTag {
    pub fn from_source_id(id: &str) -> Self {
        if id.contains(GENBANK_INFIX) {
            SourceTag::GenBank
        } else {
            SourceTag::RefSeq
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceTag::GenBank => write!(f, "NCBI GenBank"),
            SourceTag::RefSeq => write!(f, "NCBI RefSeq"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnnotationSummary {
    pub analysis_dbs: Vec<String>,
    pub signature_accessions: Vec<String>,
    pub signature_descriptions: Vec<String>,
    pub interpro_accessions: Vec<String>,
    pub interpro_descriptions: Vec<String>,
    pub representative_accession: Option<String>,
    pub representative_description: Option<String>,
}

impl AnnotationSummary {
    pub fn is_empty(&self) -> bool {
        self.analysis_dbs.is_empty()
            && self.signature_accessions.is_empty()
            && self.signature_descriptions.is_empty()
            && self.interpro_accessions.is_empty()
            && self.interpro_descriptions.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProteinRecord {
    pub protein_id: ProteinId,
    pub sequence: String,
    pub source_id: String,
    pub organism: String,
    pub accession: String,
    pub original_annotation: String,
    pub source: SourceTag,
    pub category: String,
    pub taxid: String,
    pub labels: Option<String>,
    pub threshold: f64,
    pub annotation: Option<AnnotationSummary>,
    pub merged_description: Option<String>,
}

impl ProteinRecord {
    pub fn searchable_text(&self) -> &str {
        self.merged_description
            .as_deref()
            .unwrap_or(&self.original_annotation)
    }

    pub fn representative_accession(&self) -> Option<&str> {
        self.annotation
            .as_ref()
            .and_then(|summary| summary.representative_accession.as_deref())
    }

    pub fn representative_description(&self) -> Option<&str> {
        self.annotation
            .as_ref()
            .and_then(|summary| summary.representative_description.as_deref())
    }
}

pub fn escape_separator(text: &str) -> String {
    if text.contains(FIELD_SEPARATOR) {
        text.replace(FIELD_SEPARATOR, &SEPARATOR_SUBSTITUTE.to_string())
    } else {
        text.to_string()
    }
}

pub fn label_name(category: &str) -> &str {
    category.strip_suffix(CATEGORY_SUFFIX).unwrap_or(category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protein_id_format() {
        let id = ProteinId::new(DEFAULT_PROTEIN_ID_PREFIX, 12);
        assert_eq!(id.as_str(), "cancer_12");
    }

    #[test]
    fn source_tag_from_id() {
        assert_eq!(
            SourceTag::from_source_id("GCA_000001405.29_WP_1"),
            SourceTag::GenBank
        );
        assert_eq!(
            SourceTag::from_source_id("GCF_000005845.2_NP_1"),
            SourceTag::RefSeq
        );
    }

    #[test]
    fn escape_is_idempotent() {
        let once = escape_separator("a;b;;c");
        assert_eq!(once, "a-b--c");
        assert_eq!(escape_separator(&once), once);
    }

    #[test]
    fn label_name_strips_suffix() {
        assert_eq!(label_name("kinase_keywords"), "kinase");
        assert_eq!(label_name("transport"), "transport");
    }
}
