use anyhow::Result;
use polars::prelude::*;

use crate::error::AnalysisError;

pub fn ensure_f64(mut df: DataFrame, cols: &[&str]) -> Result<DataFrame> {
    for col in cols {
        let column = df
            .column(col)
            .map_err(|_| AnalysisError::MissingColumn((*col).to_string()))?;
        if column.dtype() != &DataType::Float64 {
            let mut casted = column.as_materialized_series().cast(&DataType::Float64)?;
            casted.rename((*col).into());
            df.with_column(casted)?;
        }
    }
    Ok(df)
}

pub fn string_values(df: &DataFrame, col: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(col)
        .map_err(|_| AnalysisError::MissingColumn(col.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

pub fn f64_values(df: &DataFrame, col: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(col)
        .map_err(|_| AnalysisError::MissingColumn(col.to_string()))?;
    let series = column.as_materialized_series();
    let values = series.f64()?;
    Ok(values
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

pub fn drop_missing(df: &DataFrame, cols: &[&str]) -> Result<(DataFrame, usize)> {
    let before = df.height();
    let mut mask = BooleanChunked::full("mask".into(), true, before);
    for col in cols {
        let column = df
            .column(col)
            .map_err(|_| AnalysisError::MissingColumn((*col).to_string()))?;
        let series = column.as_materialized_series();
        let present = match series.dtype() {
            DataType::Float64 => series.is_not_null() & series.f64()?.is_not_nan(),
            _ => series.is_not_null(),
        };
        mask = mask & present;
    }
    let filtered = df.filter(&mask)?;
    let removed = before.saturating_sub(filtered.height());
    Ok((filtered, removed))
}

pub fn dense_f64(df: &DataFrame, col: &str) -> Result<Vec<f64>> {
    Ok(f64_values(df, col)?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}
