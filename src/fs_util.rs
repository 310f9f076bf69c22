use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::KiraError;

pub fn open_input(path: &Path) -> Result<Box<dyn Read>, KiraError> {
    let file = File::open(path).map_err(|err| KiraError::InputRead {
        file: path.to_path_buf(),
        message: err.to_string(),
    })?;
    let reader = BufReader::new(file);
    if is_gzip(path) {
        Ok(Box::new(MultiGzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}

fn is_gzip(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}
