//! Tabular and JSON reports of docking runs

use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Got {labels} labels for {values} values")]
    LengthMismatch { labels: usize, values: usize },
}

/// Per-ligand line of a run summary
#[derive(Debug, Clone, Serialize)]
pub struct LigandSummary {
    pub label: String,
    pub energy: f64,
}

/// Run summary written as JSON next to the tables
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub protein: String,
    pub forcefield: String,
    pub iterations: usize,
    pub workers: usize,
    pub temperature: f64,
    pub ligands: Vec<LigandSummary>,
    pub best: Option<LigandSummary>,
}

/// Write `Index,<header label>,<header value>` rows, one per value
pub fn write_values_csv<P: AsRef<Path>>(
    labels: &[String],
    values: &[f64],
    value_header: &str,
    path: P,
) -> Result<(), ReportError> {
    if labels.len() != values.len() {
        return Err(ReportError::LengthMismatch {
            labels: labels.len(),
            values: values.len(),
        });
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["Index", "Label", value_header])?;
    for (i, (label, value)) in labels.iter().zip(values).enumerate() {
        writer.write_record([i.to_string(), label.clone(), value.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the plot-index to label mapping (`Index,File Name`)
pub fn write_label_mapping<P: AsRef<Path>>(labels: &[String], path: P) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["Index", "File Name"])?;
    for (i, label) in labels.iter().enumerate() {
        writer.write_record([i.to_string(), label.clone()])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_summary_json<P: AsRef<Path>>(summary: &RunSummary, path: P) -> Result<(), ReportError> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, summary)?;
    Ok(())
}
