use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("CSV error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
}

fn csv_error(path: &Path, source: csv::Error) -> TableError {
    TableError::Csv {
        path: path.to_string_lossy().to_string(),
        source,
    }
}

/// Reads every row of a headed CSV file into `T`.
pub fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, TableError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| csv_error(path, e))?;

    let mut rows = Vec::new();
    for result in reader.deserialize::<T>() {
        rows.push(result.map_err(|e| csv_error(path, e))?);
    }
    Ok(rows)
}

/// Writes `rows` to a CSV file with a header derived from `T`'s field names.
pub fn write_table<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), TableError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
    for row in rows {
        writer.serialize(row).map_err(|e| csv_error(path, e))?;
    }
    writer
        .flush()
        .map_err(|e| csv_error(path, csv::Error::from(e)))?;
    Ok(())
}
