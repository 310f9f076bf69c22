use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use kira_protein_library::config::Thresholds;
use kira_protein_library::domain::{AnnotationSummary, ProteinId, ProteinRecord, SourceTag};
use kira_protein_library::error::KiraError;
use kira_protein_library::finalize::TableFinalizer;
use kira_protein_library::store::Store;
use kira_protein_library::tables::{TableLayout, render_library_table, write_library_table};

const THRESHOLDS: Thresholds = Thresholds {
    default: 0.9,
    labelled: 0.99,
    unlabelled: 0.65,
};

fn record(index: usize, labels: Option<&str>) -> ProteinRecord {
    ProteinRecord {
        protein_id: ProteinId::new("cancer_", index),
        sequence: "MKT".to_string(),
        source_id: format!("GCF_1_WP_{index}"),
        organism: "Escherichia coli".to_string(),
        accession: "GCF_1".to_string(),
        original_annotation: "ATP synthase; subunit alpha".to_string(),
        source: SourceTag::RefSeq,
        category: "Bacteria".to_string(),
        taxid: "562".to_string(),
        labels: labels.map(str::to_string),
        threshold: 0.9,
        annotation: None,
        merged_description: None,
    }
}

#[test]
fn threshold_depends_only_on_label_presence() {
    let finalizer = TableFinalizer::new(THRESHOLDS, false);
    let records = finalizer.assign_thresholds(vec![
        record(0, Some("kinase")),
        record(1, None),
        record(2, Some("kinase,transport")),
    ]);

    for record in &records {
        let expected = if record.labels.is_some() { 0.99 } else { 0.65 };
        assert_eq!(record.threshold, expected);
    }
}

#[test]
fn base_layout_rendering() {
    let content = render_library_table(&[record(0, Some("kinase,transport"))], TableLayout::Base)
        .unwrap();
    let text = String::from_utf8(content).unwrap();
    let lines = text.lines().collect::<Vec<_>>();

    assert_eq!(
        lines[0],
        "proteinID;ProteinSeq;accession;source_organism;Genbank/Refseq accession;\
         original_annotation;source;category;source_taxid;labels;cdhit_threshold"
    );
    assert_eq!(
        lines[1],
        "cancer_0;MKT;GCF_1_WP_0;Escherichia coli;GCF_1;ATP synthase- subunit alpha;\
         NCBI RefSeq;Bacteria;562;kinase,transport;0.9"
    );
}

#[test]
fn annotated_layout_rendering() {
    let mut annotated = record(0, None);
    annotated.annotation = Some(AnnotationSummary {
        interpro_accessions: vec!["IPR000719".to_string()],
        representative_accession: Some("IPR000719".to_string()),
        representative_description: Some("Kinase; catalytic".to_string()),
        ..AnnotationSummary::default()
    });
    annotated.merged_description =
        Some("ATP synthase- subunit alpha | Interproscan: Kinase; catalytic".to_string());

    let content = render_library_table(&[annotated, record(1, None)], TableLayout::Annotated)
        .unwrap();
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .from_reader(content.as_slice());
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.len(), 14);
    assert_eq!(&headers[13], "merged_descriptions");

    let rows = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(&rows[0][11], "IPR000719");
    assert_eq!(&rows[0][12], "Kinase- catalytic");
    assert_eq!(
        &rows[0][13],
        "ATP synthase- subunit alpha | Interproscan: Kinase- catalytic"
    );
    assert_eq!(&rows[1][9], "");
    assert_eq!(&rows[1][11], "");
    assert_eq!(&rows[1][13], "ATP synthase- subunit alpha");
}

#[test]
fn persists_to_fixed_name() {
    let temp = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(temp.path().join("out")).unwrap();
    let store = Store::new_with_root(root.clone());
    let finalizer = TableFinalizer::new(THRESHOLDS, false);
    let records = finalizer.assign_thresholds(vec![record(0, None)]);

    let path = finalizer.persist(&store, &records).unwrap();
    assert_eq!(path, root.join("table_library_complete.csv"));
    let text = std::fs::read_to_string(path.as_std_path()).unwrap();
    assert!(text.lines().nth(1).unwrap().ends_with(";;0.65"));
}

#[test]
fn write_failure_names_the_target_file() {
    let temp = tempfile::tempdir().unwrap();
    let blocker = temp.path().join("not_a_dir");
    std::fs::write(&blocker, "x").unwrap();
    let path = Utf8PathBuf::from_path_buf(blocker.join("table_library_complete.csv")).unwrap();

    let err = write_library_table(&path, &[record(0, None)], TableLayout::Base).unwrap_err();
    assert_matches!(
        err,
        KiraError::OutputWrite { path: ref failed, .. } if failed == path.as_std_path()
    );
}
