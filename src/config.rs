use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::classifier::KeywordCategory;
use crate::domain::DEFAULT_PROTEIN_ID_PREFIX;
use crate::error::KiraError;

pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub input_files: InputFiles,
    pub cdhit_default_thresh: f64,
    pub cdhit_labelled_thresh: f64,
    pub cdhit_unlabelled_thresh: f64,
    pub interproscan_annotations: bool,
    pub keyword_categories: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub protein_id_prefix: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputFiles {
    pub overview_file_path: String,
    pub taxonomy_file_path: String,
    #[serde(default)]
    pub interpro_file_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct InputPaths {
    pub overview: Utf8PathBuf,
    pub taxonomy: Utf8PathBuf,
    pub annotations: Option<Utf8PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub default: f64,
    pub labelled: f64,
    pub unlabelled: f64,
}

impl Thresholds {
    pub fn for_label(&self, labels: Option<&str>) -> f64 {
        match labels {
            Some(_) => self.labelled,
            None => self.unlabelled,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub inputs: InputPaths,
    pub thresholds: Thresholds,
    pub categories: Vec<KeywordCategory>,
    pub protein_id_prefix: String,
}

impl ResolvedConfig {
    pub fn annotations_enabled(&self) -> bool {
        self.inputs.annotations.is_some()
    }

    pub fn check_inputs(&self) -> Result<(), KiraError> {
        let mut inputs = vec![
            ("overview", &self.inputs.overview),
            ("taxonomy", &self.inputs.taxonomy),
        ];
        if let Some(path) = &self.inputs.annotations {
            inputs.push(("interproscan", path));
        }
        for (stage, path) in inputs {
            if !path.as_std_path().is_file() {
                return Err(KiraError::InputNotFound {
                    stage: stage.to_string(),
                    path: path.clone().into_std_path_buf(),
                });
            }
        }
        Ok(())
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, KiraError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Err(KiraError::MissingConfig);
        }

        tracing::debug!(path = %config_path.display(), "loading config");
        let content = fs::read_to_string(&config_path)
            .map_err(|_| KiraError::ConfigRead(config_path.clone()))?;
        let resolved = Self::resolve_str(&content)?;
        resolved.check_inputs()?;
        Ok(resolved)
    }

    pub fn resolve_str(content: &str) -> Result<ResolvedConfig, KiraError> {
        let config: Config =
            serde_yaml::from_str(content).map_err(|err| KiraError::ConfigParse(err.to_string()))?;
        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, KiraError> {
        let thresholds = Thresholds {
            default: check_threshold("cdhit_default_thresh", config.cdhit_default_thresh)?,
            labelled: check_threshold("cdhit_labelled_thresh", config.cdhit_labelled_thresh)?,
            unlabelled: check_threshold(
                "cdhit_unlabelled_thresh",
                config.cdhit_unlabelled_thresh,
            )?,
        };

        let annotations = if config.interproscan_annotations {
            let path = config
                .input_files
                .interpro_file_path
                .filter(|path| !path.trim().is_empty())
                .ok_or_else(|| {
                    KiraError::MissingConfigKey("input_files.interpro_file_path".to_string())
                })?;
            Some(Utf8PathBuf::from(path))
        } else {
            None
        };

        let categories = config
            .keyword_categories
            .iter()
            .map(|(name, patterns)| KeywordCategory::compile(name, patterns))
            .collect::<Result<Vec<_>, KiraError>>()?;

        Ok(ResolvedConfig {
            inputs: InputPaths {
                overview: Utf8PathBuf::from(config.input_files.overview_file_path),
                taxonomy: Utf8PathBuf::from(config.input_files.taxonomy_file_path),
                annotations,
            },
            thresholds,
            categories,
            protein_id_prefix: config
                .protein_id_prefix
                .unwrap_or_else(|| DEFAULT_PROTEIN_ID_PREFIX.to_string()),
        })
    }
}

fn check_threshold(key: &str, value: f64) -> Result<f64, KiraError> {
    if value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(KiraError::InvalidThreshold {
            key: key.to_string(),
            value,
        })
    }
}
