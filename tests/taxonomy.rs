use std::fs;
use std::path::Path;

use assert_matches::assert_matches;

use kira_protein_library::error::KiraError;
use kira_protein_library::tables::{TaxonomyRow, read_taxonomy};
use kira_protein_library::taxonomy::TaxonomyResolver;

fn row(
    domain: Option<&str>,
    root: Option<&str>,
    accession: &str,
    tax_id: Option<&str>,
) -> TaxonomyRow {
    TaxonomyRow {
        domain: domain.map(str::to_string),
        acellular_root: root.map(str::to_string),
        accession: accession.to_string(),
        tax_id: tax_id.map(str::to_string),
        line: 0,
    }
}

#[test]
fn coalesces_domain_and_acellular_root() {
    let lookup = TaxonomyResolver::resolve(
        vec![
            row(Some("Bacteria"), None, "GCF_1", Some("562")),
            row(None, Some("Virus"), "GCF_2", Some("10239.0")),
            row(None, None, "GCF_3", Some("1")),
            row(Some("Archaea"), Some("Virus"), "GCF_4", Some("2157")),
        ],
        Path::new("taxonomy.csv"),
    )
    .unwrap();

    assert_eq!(lookup.get("GCF_1").unwrap().category.as_deref(), Some("Bacteria"));
    assert_eq!(lookup.get("GCF_2").unwrap().category.as_deref(), Some("Virus"));
    assert_eq!(lookup.get("GCF_2").unwrap().tax_id, "10239");
    assert_eq!(lookup.get("GCF_3").unwrap().category, None);
    assert_eq!(lookup.get("GCF_4").unwrap().category.as_deref(), Some("Archaea"));
}

#[test]
fn drops_missing_tax_id_and_duplicates() {
    let lookup = TaxonomyResolver::resolve(
        vec![
            row(Some("Bacteria"), None, "GCF_1", None),
            row(Some("Bacteria"), None, "GCF_2", Some("562")),
            row(Some("Eukaryota"), None, "GCF_2", Some("9606")),
        ],
        Path::new("taxonomy.csv"),
    )
    .unwrap();

    assert!(lookup.get("GCF_1").is_none());
    assert_eq!(lookup.get("GCF_2").unwrap().tax_id, "562");
    assert_eq!(lookup.len(), 1);
    let stats = lookup.stats();
    assert_eq!(stats.records, 3);
    assert_eq!(stats.missing_tax_id, 1);
    assert_eq!(stats.duplicate_accessions, 1);
    assert_eq!(stats.kept, 1);
}

#[test]
fn later_record_with_category_fills_a_null_one() {
    let lookup = TaxonomyResolver::resolve(
        vec![
            row(None, None, "GCF_1", Some("562")),
            row(Some("Bacteria"), None, "GCF_1", Some("562")),
            row(Some("Archaea"), None, "GCF_1", Some("2157")),
        ],
        Path::new("taxonomy.csv"),
    )
    .unwrap();

    let entry = lookup.get("GCF_1").unwrap();
    assert_eq!(entry.category.as_deref(), Some("Bacteria"));
    assert_eq!(entry.tax_id, "562");
    assert_eq!(lookup.len(), 1);
    assert_eq!(lookup.stats().duplicate_accessions, 2);
}

#[test]
fn invalid_tax_id_is_malformed() {
    let err = TaxonomyResolver::resolve(
        vec![row(Some("Bacteria"), None, "GCF_1", Some("E. coli"))],
        Path::new("taxonomy.csv"),
    )
    .unwrap_err();
    assert_matches!(err, KiraError::MalformedRecord { .. });
}

#[test]
fn reads_indexed_csv() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("taxonomic_ranking_library.csv");
    fs::write(
        &path,
        ",domain,acellular root,accession,tax_id\n\
         0,Bacteria,,GCF_000005845.2,562.0\n\
         1,,Viruses,GCA_000819615.1,\n",
    )
    .unwrap();

    let rows = read_taxonomy(&path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].domain.as_deref(), Some("Bacteria"));
    assert_eq!(rows[0].acellular_root, None);
    assert_eq!(rows[0].tax_id.as_deref(), Some("562.0"));
    assert_eq!(rows[1].acellular_root.as_deref(), Some("Viruses"));
    assert_eq!(rows[1].tax_id, None);
}

#[test]
fn missing_column_fails_at_load() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("taxonomy.csv");
    fs::write(&path, ",domain,accession,tax_id\n0,Bacteria,GCF_1,562\n").unwrap();

    let err = read_taxonomy(&path).unwrap_err();
    assert_matches!(err, KiraError::MissingColumn { ref column, .. } if column == "acellular root");
    assert!(err.is_schema());
}
