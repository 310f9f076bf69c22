use camino::Utf8PathBuf;

use crate::config::Thresholds;
use crate::domain::ProteinRecord;
use crate::error::KiraError;
use crate::store::Store;
use crate::tables::{TableLayout, write_library_table};

pub struct TableFinalizer {
    thresholds: Thresholds,
    layout: TableLayout,
}

impl TableFinalizer {
    pub fn new(thresholds: Thresholds, annotations_enabled: bool) -> Self {
        let layout = if annotations_enabled {
            TableLayout::Annotated
        } else {
            TableLayout::Base
        };
        Self { thresholds, layout }
    }

    pub fn layout(&self) -> TableLayout {
        self.layout
    }

    pub fn assign_thresholds(&self, records: Vec<ProteinRecord>) -> Vec<ProteinRecord> {
        records
            .into_iter()
            .map(|mut record| {
                record.threshold = self.thresholds.for_label(record.labels.as_deref());
                record
            })
            .collect()
    }

    pub fn persist(
        &self,
        store: &Store,
        records: &[ProteinRecord],
    ) -> Result<Utf8PathBuf, KiraError> {
        let path = store.library_table_path();
        write_library_table(&path, records, self.layout)?;
        tracing::info!(path = %path, rows = records.len(), "library table written");
        Ok(path)
    }
}
