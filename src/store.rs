use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::KiraError;

pub const LIBRARY_TABLE_FILE: &str = "table_library_complete.csv";
pub const FORMATTED_TABLE_FILE: &str = "table_library_formatted.csv";

#[derive(Debug, Clone)]
pub struct Store {
    output_root: Utf8PathBuf,
}

impl Store {
    pub fn new() -> Result<Self, KiraError> {
        let cwd = std::env::current_dir().map_err(|err| KiraError::Filesystem(err.to_string()))?;
        let output_root = Utf8PathBuf::from_path_buf(cwd)
            .map_err(|_| KiraError::Filesystem("invalid working directory".to_string()))?;
        Ok(Self { output_root })
    }

    pub fn new_with_root(output_root: Utf8PathBuf) -> Self {
        Self { output_root }
    }

    pub fn library_table_path(&self) -> Utf8PathBuf {
        self.output_root.join(LIBRARY_TABLE_FILE)
    }

    pub fn formatted_table_path(&self) -> Utf8PathBuf {
        self.output_root.join(FORMATTED_TABLE_FILE)
    }

    pub fn ensure_output_root(&self) -> Result<(), KiraError> {
        fs::create_dir_all(self.output_root.as_std_path())
            .map_err(|err| KiraError::Filesystem(err.to_string()))
    }

    pub fn write_bytes_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), KiraError> {
        let write_err = |message: String| KiraError::OutputWrite {
            path: path.as_std_path().to_path_buf(),
            message,
        };
        let parent = path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or(Utf8Path::new("."));
        fs::create_dir_all(parent.as_std_path()).map_err(|err| write_err(err.to_string()))?;
        let mut temp = tempfile::Builder::new()
            .prefix("kira-pl-table")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| write_err(err.to_string()))?;
        temp.write_all(content)
            .map_err(|err| write_err(err.to_string()))?;
        temp.as_file()
            .sync_all()
            .map_err(|err| write_err(err.to_string()))?;
        temp.persist(path.as_std_path())
            .map_err(|err| write_err(err.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_path_is_fixed() {
        let store = Store::new_with_root(Utf8PathBuf::from("/data/run"));
        assert_eq!(
            store.library_table_path(),
            Utf8PathBuf::from("/data/run/table_library_complete.csv")
        );
    }

    #[test]
    fn default_root_is_working_directory() {
        let store = Store::new().unwrap();
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(
            store.library_table_path().as_std_path(),
            cwd.join(LIBRARY_TABLE_FILE)
        );
        assert_ne!(store.formatted_table_path(), store.library_table_path());
    }

    #[test]
    fn atomic_write_overwrites() {
        let temp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let store = Store::new_with_root(root);
        let path = store.library_table_path();
        Store::write_bytes_atomic(&path, b"first").unwrap();
        Store::write_bytes_atomic(&path, b"second").unwrap();
        assert_eq!(fs::read_to_string(path.as_std_path()).unwrap(), "second");
    }
}
