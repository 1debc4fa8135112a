use std::borrow::Cow;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;
use tracing::debug;

use crate::error::AnalysisError;
use crate::qc::check_file_exists;

#[derive(Debug, Clone)]
pub enum DataSource {
    Url(String),
    File(std::path::PathBuf),
}

impl DataSource {
    pub fn describe(&self) -> String {
        match self {
            DataSource::Url(url) => url.clone(),
            DataSource::File(path) => path.display().to_string(),
        }
    }
}

pub fn load_raw(source: &DataSource) -> Result<DataFrame> {
    match source {
        DataSource::Url(url) => fetch_csv(url),
        DataSource::File(path) => read_table(path),
    }
}

pub fn fetch_csv(url: &str) -> Result<DataFrame> {
    let response = ureq::get(url)
        .call()
        .map_err(|e| AnalysisError::Fetch(format!("{url}: {e}")))?;
    if response.status() != 200 {
        return Err(AnalysisError::Fetch(format!(
            "{url}: HTTP {} {}",
            response.status(),
            response.status_text()
        ))
        .into());
    }
    let mut bytes = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut bytes)
        .with_context(|| format!("read body of {url}"))?;
    debug!("fetched {} bytes from {url}", bytes.len());
    parse_csv_bytes(bytes, url)
}

pub fn read_table(path: &Path) -> Result<DataFrame> {
    check_file_exists(path, "file")?;
    let mut bytes = Vec::new();
    File::open(path)
        .with_context(|| format!("open {}", path.display()))?
        .read_to_end(&mut bytes)
        .with_context(|| format!("read {}", path.display()))?;
    parse_csv_bytes(bytes, &path.display().to_string())
}

pub fn parse_csv_bytes(bytes: Vec<u8>, source: &str) -> Result<DataFrame> {
    let delimiter = detect_delimiter(&bytes);
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(delimiter)
                .with_missing_is_null(true),
        )
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .map_err(|e| AnalysisError::Parse(format!("{source}: {e}")))?;
    debug!(
        "parsed {source}: {} rows x {} columns",
        df.height(),
        df.width()
    );
    trim_string_columns(df)
}

fn detect_delimiter(bytes: &[u8]) -> u8 {
    let first = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
    if first.contains(&b'\t') {
        b'\t'
    } else if first.contains(&b';') && !first.contains(&b',') {
        b';'
    } else {
        b','
    }
}

fn trim_series(series: &Series) -> Result<Series> {
    let utf8 = series.str()?;
    let trimmed = utf8
        .apply(|v| v.map(|s| Cow::Owned(s.trim().to_string())))
        .into_series();
    Ok(trimmed)
}

fn trim_string_columns(mut df: DataFrame) -> Result<DataFrame> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    for name in names {
        let column = df.column(&name)?;
        if column.dtype() == &DataType::String {
            let mut s = trim_series(column.as_materialized_series())?;
            s.rename(name.as_str().into());
            df.with_column(s)?;
        }
    }
    Ok(df)
}

pub fn write_dataframe(df: &DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut df = df.clone();
    CsvWriter::new(&mut file)
        .with_separator(b'\t')
        .finish(&mut df)
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
