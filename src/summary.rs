use anyhow::Result;
use polars::prelude::*;
use statrs::statistics::{Data, Median, Statistics};

use crate::clean::CleanDataset;
use crate::types::Measure;

#[derive(Debug, Clone, PartialEq)]
pub struct GroupStats {
    pub group: String,
    pub n: usize,
    pub mean: f64,
    pub median: f64,
    pub sd: f64,
    pub min: f64,
    pub max: f64,
}

impl GroupStats {
    pub fn from_values(group: &str, values: &[f64]) -> Self {
        let n = values.len();
        let (mean, median, sd, min, max) = if n == 0 {
            (f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN)
        } else {
            let mean = values.iter().mean();
            let median = Data::new(values.to_vec()).median();
            let sd = if n < 2 { f64::NAN } else { values.iter().std_dev() };
            let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            (mean, median, sd, min, max)
        };
        Self {
            group: group.to_string(),
            n,
            mean,
            median,
            sd,
            min,
            max,
        }
    }

    pub fn lower(&self) -> f64 {
        self.mean - self.sd
    }

    pub fn upper(&self) -> f64 {
        self.mean + self.sd
    }
}

pub fn summarize_by_group(dataset: &CleanDataset, measure: Measure) -> Result<Vec<GroupStats>> {
    Ok(dataset
        .values_by_severity(measure)?
        .iter()
        .map(|(group, values)| GroupStats::from_values(group, values))
        .collect())
}

pub fn summary_table(stats: &[GroupStats]) -> Result<DataFrame> {
    let df = df!(
        "group" => stats.iter().map(|s| s.group.clone()).collect::<Vec<_>>(),
        "n" => stats.iter().map(|s| s.n as u32).collect::<Vec<_>>(),
        "mean" => stats.iter().map(|s| s.mean).collect::<Vec<_>>(),
        "median" => stats.iter().map(|s| s.median).collect::<Vec<_>>(),
        "sd" => stats.iter().map(|s| s.sd).collect::<Vec<_>>(),
        "mean_minus_sd" => stats.iter().map(GroupStats::lower).collect::<Vec<_>>(),
        "mean_plus_sd" => stats.iter().map(GroupStats::upper).collect::<Vec<_>>(),
        "min" => stats.iter().map(|s| s.min).collect::<Vec<_>>(),
        "max" => stats.iter().map(|s| s.max).collect::<Vec<_>>(),
    )?;
    Ok(df)
}
