use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum KiraError {
    #[error("missing config file config.yaml in current directory")]
    #[diagnostic(help("pass --config <path> or create config.yaml"))]
    MissingConfig,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse YAML config: {0}")]
    ConfigParse(String),

    #[error("missing config key: {0}")]
    MissingConfigKey(String),

    #[error("threshold {key} must be in (0, 1], got {value}")]
    InvalidThreshold { key: String, value: f64 },

    #[error("invalid keyword pattern {pattern:?} in category {category}: {message}")]
    InvalidKeywordPattern {
        category: String,
        pattern: String,
        message: String,
    },

    #[error("{stage} input not found: {path}")]
    InputNotFound { stage: String, path: PathBuf },

    #[error("{file}: missing required column {column:?}")]
    #[diagnostic(help("check the header row of the input file"))]
    MissingColumn { file: PathBuf, column: String },

    #[error("{file}:{line}: {message}")]
    MalformedRecord {
        file: PathBuf,
        line: u64,
        message: String,
    },

    #[error("failed to read {file}: {message}")]
    InputRead { file: PathBuf, message: String },

    #[error("failed to write {path}: {message}")]
    OutputWrite { path: PathBuf, message: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

impl KiraError {
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            KiraError::MissingConfig
                | KiraError::ConfigRead(_)
                | KiraError::ConfigParse(_)
                | KiraError::MissingConfigKey(_)
                | KiraError::InvalidThreshold { .. }
                | KiraError::InvalidKeywordPattern { .. }
                | KiraError::InputNotFound { .. }
        )
    }

    pub fn is_schema(&self) -> bool {
        matches!(
            self,
            KiraError::MissingColumn { .. } | KiraError::MalformedRecord { .. }
        )
    }
}
