use super::samples::SampleSet;
use crate::error::{Result, SymregError};
use polars::prelude::*;
use std::path::Path;

pub struct CsvConnector;

impl CsvConnector {
    /// Load a `;`-separated file into a DataFrame
    pub fn load<P: AsRef<Path>>(path: P, has_header: bool) -> Result<DataFrame> {
        let df = CsvReadOptions::default()
            .with_has_header(has_header)
            .map_parse_options(|opts| opts.with_separator(b';'))
            .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
            .finish()
            .map_err(|e| SymregError::DataLoading(format!("Failed to read CSV: {}", e)))?;

        Ok(df)
    }

    /// Every column but the last is an input, the last one is the output.
    /// Rows holding a null or non-numeric cell are skipped.
    pub fn to_samples(df: &DataFrame) -> Result<SampleSet> {
        if df.width() < 2 {
            return Err(SymregError::DataLoading(format!(
                "Expected at least one input and one output column, found {}",
                df.width()
            )));
        }

        let columns = df
            .get_columns()
            .iter()
            .map(|c| c.cast(&DataType::Float64))
            .collect::<PolarsResult<Vec<_>>>()?;
        let values = columns
            .iter()
            .map(|c| c.f64())
            .collect::<PolarsResult<Vec<_>>>()?;
        let (output, inputs) = values
            .split_last()
            .ok_or_else(|| SymregError::DataLoading("No columns".to_string()))?;

        let mut rows = Vec::with_capacity(df.height());
        let mut outputs = Vec::with_capacity(df.height());
        let mut skipped = 0usize;
        for i in 0..df.height() {
            let row: Option<Vec<f64>> = inputs.iter().map(|c| c.get(i)).collect();
            match (row, output.get(i)) {
                (Some(row), Some(y)) => {
                    rows.push(row);
                    outputs.push(y);
                }
                _ => skipped += 1,
            }
        }
        if skipped > 0 {
            log::warn!("Skipped {} incomplete rows", skipped);
        }

        SampleSet::new(rows, outputs)
    }
}

pub fn load_samples<P: AsRef<Path>>(path: P, has_header: bool) -> Result<SampleSet> {
    let df = CsvConnector::load(&path, has_header)?;
    let samples = CsvConnector::to_samples(&df)?;
    log::info!(
        "Loaded {} samples with {} inputs from {}",
        samples.len(),
        df.width() - 1,
        path.as_ref().display()
    );
    Ok(samples)
}
