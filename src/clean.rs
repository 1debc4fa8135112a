use std::str::FromStr;

use anyhow::{Context, Result};
use polars::prelude::*;
use tracing::debug;

use crate::df_utils::{drop_missing, ensure_f64, f64_values, string_values};
use crate::error::AnalysisError;
use crate::schema::{ColumnMapConfig, resolve_column_map};
use crate::types::{
    DEFAULT_SEVERITY_LEVELS, Factor, GENDER_COLUMN, ID_COLUMN, Measure, SEVERITY_COLUMN,
};

/// What to do with the first data row, which in the published sheet repeats
/// header text (units, sub-headings) instead of subject data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderArtifact {
    /// Drop the row only if none of its numeric cells parse and its
    /// severity cell is not a known group.
    Detect,
    Drop,
    Keep,
}

impl FromStr for HeaderArtifact {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "detect" => Ok(HeaderArtifact::Detect),
            "drop" => Ok(HeaderArtifact::Drop),
            "keep" => Ok(HeaderArtifact::Keep),
            other => Err(AnalysisError::InvalidArgument(format!(
                "header artifact mode {other:?}; expected detect, drop or keep"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CleanConfig {
    pub severity_levels: Vec<String>,
    pub header_artifact: HeaderArtifact,
    pub column_map: ColumnMapConfig,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            severity_levels: DEFAULT_SEVERITY_LEVELS.iter().map(|s| s.to_string()).collect(),
            header_artifact: HeaderArtifact::Detect,
            column_map: ColumnMapConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CleanDataset {
    frame: DataFrame,
    severity: Factor,
    gender: Factor,
    header_row_dropped: bool,
    notes: Vec<String>,
    warnings: Vec<String>,
}

impl CleanDataset {
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn severity(&self) -> &Factor {
        &self.severity
    }

    pub fn gender(&self) -> &Factor {
        &self.gender
    }

    pub fn header_row_dropped(&self) -> bool {
        self.header_row_dropped
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn measure_values(&self, measure: Measure) -> Result<Vec<Option<f64>>> {
        f64_values(&self.frame, measure.column_name())
    }

    pub fn complete_subset(&self, measures: &[Measure]) -> Result<(DataFrame, usize)> {
        let cols: Vec<&str> = measures.iter().map(|m| m.column_name()).collect();
        drop_missing(&self.frame, &cols)
    }

    pub fn values_by_severity(&self, measure: Measure) -> Result<Vec<(String, Vec<f64>)>> {
        let values = self.measure_values(measure)?;
        let mut groups: Vec<(String, Vec<f64>)> = self
            .severity
            .levels
            .iter()
            .map(|l| (l.clone(), Vec::new()))
            .collect();
        for (code, value) in self.severity.codes.iter().zip(values) {
            if let (Some(code), Some(value)) = (code, value) {
                groups[*code].1.push(value);
            }
        }
        let observed = self.severity.observed_levels();
        groups.retain(|(level, _)| observed.contains(&level.as_str()));
        Ok(groups)
    }
}

fn numeric_targets() -> Vec<&'static str> {
    Measure::ALL.iter().map(|m| m.column_name()).collect()
}

fn looks_like_header_artifact(
    df: &DataFrame,
    numeric_cols: &[&str],
    severity_levels: &[String],
) -> Result<bool> {
    if df.height() == 0 {
        return Ok(false);
    }
    for col in numeric_cols {
        let parses = string_values(df, col)?
            .first()
            .cloned()
            .flatten()
            .is_some_and(|v| v.trim().parse::<f64>().is_ok());
        if parses {
            return Ok(false);
        }
    }
    let severity = string_values(df, SEVERITY_COLUMN)?
        .first()
        .cloned()
        .flatten();
    let known_group = severity.is_some_and(|v| {
        severity_levels
            .iter()
            .any(|level| level.trim().eq_ignore_ascii_case(v.trim()))
    });
    Ok(!known_group)
}

pub fn clean_dataset(raw: DataFrame, config: &CleanConfig) -> Result<CleanDataset> {
    let headers: Vec<String> = raw
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let map = resolve_column_map(&headers, &config.column_map)?;
    let mut notes = map.info.clone();
    let mut warnings = Vec::new();

    let sources: Vec<&str> = map.selected.iter().map(|(src, _)| src.as_str()).collect();
    let mut df = raw.select(sources).context("select subject columns")?;
    df.set_column_names(map.selected.iter().map(|(_, target)| target.as_str()))
        .context("rename subject columns")?;

    let numeric = numeric_targets();
    let drop_first = match config.header_artifact {
        HeaderArtifact::Drop => true,
        HeaderArtifact::Keep => false,
        HeaderArtifact::Detect => {
            let artifact = looks_like_header_artifact(&df, &numeric, &config.severity_levels)?;
            if !artifact && df.height() > 0 {
                warnings.push("First data row holds subject data; keeping it".to_string());
            }
            artifact
        }
    };
    if drop_first && df.height() > 0 {
        df = df.slice(1, df.height() - 1);
        debug!("dropped header-artifact row");
    }

    df = ensure_f64(df, &numeric)?;

    let gender_raw = string_values(&df, GENDER_COLUMN)?;
    let gender = Factor::from_observed(GENDER_COLUMN, &gender_raw);
    if gender.levels.len() != 2 {
        let msg = format!(
            "{GENDER_COLUMN} has {} level(s) ({}); two were expected",
            gender.levels.len(),
            gender.levels.join(", ")
        );
        warnings.push(msg);
    }

    let severity_raw = string_values(&df, SEVERITY_COLUMN)?;
    let severity = Factor::with_levels(SEVERITY_COLUMN, &severity_raw, &config.severity_levels)?;
    let canonical: Vec<Option<&str>> = (0..severity.len()).map(|i| severity.label(i)).collect();
    df.with_column(Series::new(SEVERITY_COLUMN.into(), canonical))?;

    let missing_ids = string_values(&df, ID_COLUMN)?
        .iter()
        .filter(|v| v.is_none())
        .count();
    if missing_ids > 0 {
        notes.push(format!("{missing_ids} row(s) have no {ID_COLUMN}"));
    }

    Ok(CleanDataset {
        frame: df,
        severity,
        gender,
        header_row_dropped: drop_first,
        notes,
        warnings,
    })
}
