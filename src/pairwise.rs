use anyhow::Result;
use polars::prelude::*;

use crate::clean::CleanDataset;
use crate::stats::{centered_ss, two_sided_t_p};
use crate::types::Measure;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TTestMethod {
    PooledSd,
    Welch,
}

#[derive(Debug, Clone, Copy)]
pub struct PairwiseConfig {
    pub method: TTestMethod,
}

impl Default for PairwiseConfig {
    fn default() -> Self {
        Self {
            method: TTestMethod::PooledSd,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairComparison {
    pub first: String,
    pub second: String,
    pub n_first: usize,
    pub n_second: usize,
    pub t: f64,
    pub df: f64,
    pub p_raw: f64,
    pub p_adjusted: f64,
}

#[derive(Debug, Clone)]
pub struct PairwiseResult {
    pub measure: Measure,
    pub method: TTestMethod,
    pub groups: Vec<String>,
    pub comparisons: Vec<PairComparison>,
}

impl PairwiseResult {
    pub fn comparison(&self, a: &str, b: &str) -> Option<&PairComparison> {
        self.comparisons
            .iter()
            .find(|c| (c.first == a && c.second == b) || (c.first == b && c.second == a))
    }

    /// Lower-triangular matrix of adjusted p-values: row `i` holds the
    /// comparisons of `groups[i + 1]` against `groups[..=i]`.
    pub fn adjusted_matrix(&self) -> Vec<Vec<f64>> {
        let k = self.groups.len();
        (1..k)
            .map(|i| {
                (0..i)
                    .map(|j| {
                        self.comparison(&self.groups[i], &self.groups[j])
                            .map(|c| c.p_adjusted)
                            .unwrap_or(f64::NAN)
                    })
                    .collect()
            })
            .collect()
    }

    pub fn table(&self) -> Result<DataFrame> {
        let c = &self.comparisons;
        let df = df!(
            "group_1" => c.iter().map(|x| x.first.clone()).collect::<Vec<_>>(),
            "group_2" => c.iter().map(|x| x.second.clone()).collect::<Vec<_>>(),
            "n_1" => c.iter().map(|x| x.n_first as u32).collect::<Vec<_>>(),
            "n_2" => c.iter().map(|x| x.n_second as u32).collect::<Vec<_>>(),
            "t" => c.iter().map(|x| x.t).collect::<Vec<_>>(),
            "df" => c.iter().map(|x| x.df).collect::<Vec<_>>(),
            "p" => c.iter().map(|x| x.p_raw).collect::<Vec<_>>(),
            "p_bonferroni" => c.iter().map(|x| x.p_adjusted).collect::<Vec<_>>(),
        )?;
        Ok(df)
    }
}

/// Bonferroni adjustment: each p-value times the number of non-NaN p-values,
/// capped at 1. NaN entries pass through.
pub fn bonferroni(p: &[f64]) -> Vec<f64> {
    let m = p.iter().filter(|v| !v.is_nan()).count() as f64;
    p.iter()
        .map(|v| if v.is_nan() { f64::NAN } else { (v * m).min(1.0) })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        f64::NAN
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn pooled_t(a: &[f64], b: &[f64], pooled_var: f64, df: f64) -> (f64, f64) {
    let se = (pooled_var * (1.0 / a.len() as f64 + 1.0 / b.len() as f64)).sqrt();
    ((mean(a) - mean(b)) / se, df)
}

fn welch_t(a: &[f64], b: &[f64]) -> (f64, f64) {
    if a.len() < 2 || b.len() < 2 {
        return (f64::NAN, f64::NAN);
    }
    let (na, nb) = (a.len() as f64, b.len() as f64);
    let va = centered_ss(a) / (na - 1.0) / na;
    let vb = centered_ss(b) / (nb - 1.0) / nb;
    let se2 = va + vb;
    let df = se2.powi(2) / (va.powi(2) / (na - 1.0) + vb.powi(2) / (nb - 1.0));
    ((mean(a) - mean(b)) / se2.sqrt(), df)
}

/// Variance pooled over every group, with its degrees of freedom. A group
/// with a single value has no variance estimate, which leaves the pooled
/// variance undefined.
fn pooled_variance(groups: &[(String, Vec<f64>)]) -> (f64, f64) {
    let df: usize = groups
        .iter()
        .map(|(_, v)| v.len().saturating_sub(1))
        .sum();
    if groups.iter().any(|(_, v)| v.len() < 2) {
        return (f64::NAN, df as f64);
    }
    let ss: f64 = groups.iter().map(|(_, v)| centered_ss(v)).sum();
    (ss / df as f64, df as f64)
}

/// All pairwise t-tests between the groups that have values, Bonferroni
/// adjusted.
pub fn pairwise_t_test_groups(
    measure: Measure,
    groups: &[(String, Vec<f64>)],
    config: &PairwiseConfig,
) -> PairwiseResult {
    let groups: Vec<(String, Vec<f64>)> = groups
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .cloned()
        .collect();
    let (pooled_var, pooled_df) = pooled_variance(&groups);

    let mut comparisons = Vec::new();
    for j in 0..groups.len() {
        for i in (j + 1)..groups.len() {
            let (name_a, a) = &groups[i];
            let (name_b, b) = &groups[j];
            let (t, df) = match config.method {
                TTestMethod::PooledSd => pooled_t(a, b, pooled_var, pooled_df),
                TTestMethod::Welch => welch_t(a, b),
            };
            comparisons.push(PairComparison {
                first: name_a.clone(),
                second: name_b.clone(),
                n_first: a.len(),
                n_second: b.len(),
                t,
                df,
                p_raw: two_sided_t_p(t, df),
                p_adjusted: f64::NAN,
            });
        }
    }

    let raw: Vec<f64> = comparisons.iter().map(|c| c.p_raw).collect();
    for (c, adj) in comparisons.iter_mut().zip(bonferroni(&raw)) {
        c.p_adjusted = adj;
    }

    PairwiseResult {
        measure,
        method: config.method,
        groups: groups.iter().map(|(g, _)| g.clone()).collect(),
        comparisons,
    }
}

pub fn pairwise_t_test(
    dataset: &CleanDataset,
    measure: Measure,
    config: &PairwiseConfig,
) -> Result<PairwiseResult> {
    let groups = dataset.values_by_severity(measure)?;
    Ok(pairwise_t_test_groups(measure, &groups, config))
}
