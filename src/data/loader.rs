//! Dataset Loader Module
//! Reads the fixed set of named CSV sources into in-memory DataFrames.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::info;
use polars::prelude::*;
use thiserror::Error;

use super::Datasets;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("missing dataset source(s): {}", .missing.join(", "))]
    SourceMissing { missing: Vec<String> },
    #[error("failed to load CSV for `{name}`: {source}")]
    CsvError { name: String, source: PolarsError },
}

/// Loads every named CSV source up front, all-or-nothing.
pub struct DatasetLoader;

impl DatasetLoader {
    /// Load all datasets in `sources`, keyed by dataset name.
    ///
    /// Every path is checked before any file is opened, so a missing source
    /// aborts the whole load with the complete list of unresolved names and
    /// nothing downstream ever sees a partial collection.
    pub fn load_all(sources: &BTreeMap<String, PathBuf>) -> Result<Datasets, LoaderError> {
        let missing: Vec<String> = sources
            .iter()
            .filter(|(_, path)| !path.is_file())
            .map(|(name, _)| name.clone())
            .collect();
        if !missing.is_empty() {
            return Err(LoaderError::SourceMissing { missing });
        }

        let mut tables = Datasets::new();
        for (name, path) in sources {
            let df = Self::load_csv(path).map_err(|source| LoaderError::CsvError {
                name: name.clone(),
                source,
            })?;
            info!(
                "loaded `{}` ({} rows) from {}",
                name,
                df.height(),
                path.display()
            );
            tables.insert(name.clone(), df);
        }
        Ok(tables)
    }

    /// Load a single CSV file using Polars.
    fn load_csv(path: &Path) -> PolarsResult<DataFrame> {
        // Lazy scan for memory efficiency, then collect
        LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()
    }
}
