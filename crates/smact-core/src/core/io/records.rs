use crate::core::chemistry::composition::Composition;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("JSON error for '{path}': {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

/// One downloaded materials-database document.
///
/// Fields the database returns beyond the named ones are kept in `extra` so that
/// records round-trip without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRecord {
    pub material_id: String,
    pub formula_pretty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_above_hull: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub band_gap: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theoretical: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl MaterialRecord {
    pub fn new(material_id: &str, formula_pretty: &str) -> Self {
        Self {
            material_id: material_id.to_string(),
            formula_pretty: formula_pretty.to_string(),
            energy_above_hull: None,
            band_gap: None,
            theoretical: None,
            extra: BTreeMap::new(),
        }
    }

    /// The canonical reduced formula used to join against candidate tables.
    pub fn reduced_formula(&self) -> Option<String> {
        self.formula_pretty
            .parse::<Composition>()
            .ok()
            .map(|c| c.reduced_formula())
    }
}

/// Reads every `*.json` record in `dir`, in file-name order.
pub fn read_records_dir(dir: &Path) -> Result<Vec<MaterialRecord>, RecordError> {
    let io_error = |path: &Path, source| RecordError::Io {
        path: path.to_string_lossy().to_string(),
        source,
    };

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| io_error(dir, e))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()
        .map_err(|e| io_error(dir, e))?;
    paths.retain(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"));
    paths.sort();

    let mut records = Vec::with_capacity(paths.len());
    for path in &paths {
        let content = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        let record = serde_json::from_str(&content).map_err(|e| RecordError::Json {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        records.push(record);
    }
    debug!(dir = %dir.display(), count = records.len(), "Loaded database records.");
    Ok(records)
}

/// Writes `record` to `<dir>/<material_id>.json`, returning the path written.
pub fn write_record(dir: &Path, record: &MaterialRecord) -> Result<PathBuf, RecordError> {
    let path = dir.join(format!("{}.json", record.material_id));
    let json = serde_json::to_string_pretty(record).map_err(|e| RecordError::Json {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    fs::write(&path, json).map_err(|e| RecordError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    Ok(path)
}

/// Collects the canonical reduced formulas present in `records`.
pub fn database_formulas(records: &[MaterialRecord]) -> HashSet<String> {
    let mut formulas = HashSet::with_capacity(records.len());
    for record in records {
        match record.reduced_formula() {
            Some(formula) => {
                formulas.insert(formula);
            }
            None => warn!(
                material_id = %record.material_id,
                formula = %record.formula_pretty,
                "Skipping record with unparsable formula."
            ),
        }
    }
    formulas
}
