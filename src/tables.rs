//! Typed readers for the three input tables and the writer for the library
//! table. This is the only place that knows external column names.

use std::path::Path;

use camino::Utf8Path;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};

use crate::domain::{FIELD_SEPARATOR, ProteinRecord, escape_separator};
use crate::error::KiraError;
use crate::fs_util::open_input;
use crate::store::Store;

pub const OVERVIEW_SEQUENCE: &str = "aa_seq";
pub const OVERVIEW_ID: &str = "id";
pub const OVERVIEW_ORGANISM: &str = "species_exact";
pub const OVERVIEW_ACCESSION: &str = "Genbank/Refseq accession";
pub const OVERVIEW_DESCRIPTION: &str = "description";

pub const TAXONOMY_DOMAIN: &str = "domain";
pub const TAXONOMY_ACELLULAR_ROOT: &str = "acellular root";
pub const TAXONOMY_ACCESSION: &str = "accession";
pub const TAXONOMY_TAX_ID: &str = "tax_id";

// InterProScan TSV positions; GO annotations (13) and pathways may be absent.
const HIT_QUERY: usize = 0;
const HIT_LENGTH: usize = 2;
const HIT_ANALYSIS: usize = 3;
const HIT_SIGNATURE: usize = 4;
const HIT_SIGNATURE_DESCRIPTION: usize = 5;
const HIT_INTERPRO: usize = 11;
const HIT_INTERPRO_DESCRIPTION: usize = 12;
const HIT_MIN_FIELDS: usize = 13;
const HIT_NULL: &str = "-";

const BASE_COLUMNS: [&str; 11] = [
    "proteinID",
    "ProteinSeq",
    "accession",
    "source_organism",
    "Genbank/Refseq accession",
    "original_annotation",
    "source",
    "category",
    "source_taxid",
    "labels",
    "cdhit_threshold",
];

const ANNOTATION_COLUMNS: [&str; 3] = [
    "Interpro_annotations_accession_representative",
    "Interpro_accession_description_representative",
    "merged_descriptions",
];

#[derive(Debug, Clone, PartialEq)]
pub struct OverviewRow {
    pub sequence: String,
    pub source_id: String,
    pub organism: String,
    pub accession: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaxonomyRow {
    pub domain: Option<String>,
    pub acellular_root: Option<String>,
    pub accession: String,
    pub tax_id: Option<String>,
    pub line: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignatureHit {
    pub protein_accession: String,
    pub length: Option<u64>,
    pub analysis_db: Option<String>,
    pub signature_accession: Option<String>,
    pub signature_description: Option<String>,
    pub interpro_accession: Option<String>,
    pub interpro_description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableLayout {
    Base,
    Annotated,
}

impl TableLayout {
    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns = BASE_COLUMNS.to_vec();
        if matches!(self, TableLayout::Annotated) {
            columns.extend(ANNOTATION_COLUMNS);
        }
        columns
    }
}

pub fn read_overview(path: &Path) -> Result<Vec<OverviewRow>, KiraError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(open_input(path)?);
    let headers = read_headers(&mut reader, path)?;
    let sequence = column_index(&headers, OVERVIEW_SEQUENCE, path)?;
    let id = column_index(&headers, OVERVIEW_ID, path)?;
    let organism = column_index(&headers, OVERVIEW_ORGANISM, path)?;
    let accession = column_index(&headers, OVERVIEW_ACCESSION, path)?;
    let description = column_index(&headers, OVERVIEW_DESCRIPTION, path)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|err| malformed(path, &err))?;
        rows.push(OverviewRow {
            sequence: field(&record, sequence),
            source_id: field(&record, id),
            organism: field(&record, organism),
            accession: field(&record, accession),
            description: field(&record, description),
        });
    }
    tracing::debug!(path = %path.display(), rows = rows.len(), "overview loaded");
    Ok(rows)
}

pub fn read_taxonomy(path: &Path) -> Result<Vec<TaxonomyRow>, KiraError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .from_reader(open_input(path)?);
    let headers = read_headers(&mut reader, path)?;
    let domain = column_index(&headers, TAXONOMY_DOMAIN, path)?;
    let acellular_root = column_index(&headers, TAXONOMY_ACELLULAR_ROOT, path)?;
    let accession = column_index(&headers, TAXONOMY_ACCESSION, path)?;
    let tax_id = column_index(&headers, TAXONOMY_TAX_ID, path)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|err| malformed(path, &err))?;
        rows.push(TaxonomyRow {
            domain: nullable(&record, domain, ""),
            acellular_root: nullable(&record, acellular_root, ""),
            accession: field(&record, accession),
            tax_id: nullable(&record, tax_id, ""),
            line: record.position().map(|pos| pos.line()).unwrap_or(0),
        });
    }
    tracing::debug!(path = %path.display(), rows = rows.len(), "taxonomy loaded");
    Ok(rows)
}

pub fn read_signature_hits(path: &Path) -> Result<Vec<SignatureHit>, KiraError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(open_input(path)?);

    let mut hits = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|err| malformed(path, &err))?;
        let line = record.position().map(|pos| pos.line()).unwrap_or(0);
        if record.len() < HIT_MIN_FIELDS {
            return Err(KiraError::MalformedRecord {
                file: path.to_path_buf(),
                line,
                message: format!(
                    "expected at least {HIT_MIN_FIELDS} fields, found {}",
                    record.len()
                ),
            });
        }
        hits.push(SignatureHit {
            protein_accession: field(&record, HIT_QUERY),
            length: nullable(&record, HIT_LENGTH, HIT_NULL)
                .and_then(|value| value.parse::<u64>().ok()),
            analysis_db: nullable(&record, HIT_ANALYSIS, HIT_NULL),
            signature_accession: nullable(&record, HIT_SIGNATURE, HIT_NULL),
            signature_description: nullable(&record, HIT_SIGNATURE_DESCRIPTION, HIT_NULL),
            interpro_accession: nullable(&record, HIT_INTERPRO, HIT_NULL),
            interpro_description: nullable(&record, HIT_INTERPRO_DESCRIPTION, HIT_NULL),
        });
    }
    tracing::debug!(path = %path.display(), hits = hits.len(), "signature hits loaded");
    Ok(hits)
}

pub fn render_library_table(
    records: &[ProteinRecord],
    layout: TableLayout,
) -> csv::Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .delimiter(FIELD_SEPARATOR as u8)
        .from_writer(Vec::new());
    writer.write_record(layout.columns())?;

    for record in records {
        let mut row = vec![
            record.protein_id.to_string(),
            record.sequence.clone(),
            record.source_id.clone(),
            record.organism.clone(),
            record.accession.clone(),
            escape_separator(&record.original_annotation),
            record.source.to_string(),
            record.category.clone(),
            record.taxid.clone(),
            record.labels.clone().unwrap_or_default(),
            format_threshold(record.threshold),
        ];
        if matches!(layout, TableLayout::Annotated) {
            row.push(record.representative_accession().unwrap_or_default().to_string());
            row.push(
                record
                    .representative_description()
                    .map(escape_separator)
                    .unwrap_or_default(),
            );
            row.push(escape_separator(record.searchable_text()));
        }
        writer.write_record(&row)?;
    }

    writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))
}

pub fn write_library_table(
    path: &Utf8Path,
    records: &[ProteinRecord],
    layout: TableLayout,
) -> Result<(), KiraError> {
    let content =
        render_library_table(records, layout).map_err(|err| KiraError::OutputWrite {
            path: path.as_std_path().to_path_buf(),
            message: err.to_string(),
        })?;
    Store::write_bytes_atomic(path, &content)
}

pub fn format_threshold(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

fn read_headers<R: std::io::Read>(
    reader: &mut csv::Reader<R>,
    path: &Path,
) -> Result<StringRecord, KiraError> {
    reader
        .headers()
        .cloned()
        .map_err(|err| KiraError::InputRead {
            file: path.to_path_buf(),
            message: err.to_string(),
        })
}

fn column_index(headers: &StringRecord, name: &str, path: &Path) -> Result<usize, KiraError> {
    headers
        .iter()
        .position(|header| header.trim() == name)
        .ok_or_else(|| KiraError::MissingColumn {
            file: path.to_path_buf(),
            column: name.to_string(),
        })
}

fn field(record: &StringRecord, index: usize) -> String {
    record.get(index).unwrap_or_default().trim().to_string()
}

fn nullable(record: &StringRecord, index: usize, placeholder: &str) -> Option<String> {
    let value = record.get(index)?.trim();
    if value.is_empty() || value == placeholder {
        None
    } else {
        Some(value.to_string())
    }
}

fn malformed(path: &Path, err: &csv::Error) -> KiraError {
    KiraError::MalformedRecord {
        file: path.to_path_buf(),
        line: err.position().map(|pos| pos.line()).unwrap_or(0),
        message: err.to_string(),
    }
}
