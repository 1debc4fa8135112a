use anyhow::{Context, Result};
use polars::prelude::*;
use tracing::{debug, warn};

use crate::clean::CleanDataset;
use crate::df_utils::dense_f64;
use crate::regression::ols;
use crate::stats::pearson;
use crate::types::Measure;

#[derive(Debug, Clone, PartialEq)]
pub struct PartialSpec {
    pub label: String,
    pub a: Measure,
    pub b: Measure,
    pub covariates: Vec<Measure>,
}

impl PartialSpec {
    pub fn new(a: Measure, b: Measure, covariates: &[Measure]) -> Self {
        let label = format!("{}_vs_{}", a.slug(), b.slug());
        Self {
            label,
            a,
            b,
            covariates: covariates.to_vec(),
        }
    }

    pub fn required_measures(&self) -> Vec<Measure> {
        let mut out = vec![self.a];
        for m in std::iter::once(self.b).chain(self.covariates.iter().copied()) {
            if !out.contains(&m) {
                out.push(m);
            }
        }
        out
    }

    pub fn covariate_names(&self) -> String {
        if self.covariates.is_empty() {
            return "nothing".to_string();
        }
        self.covariates
            .iter()
            .map(|m| m.column_name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The four analyses of the report: each neurotransmitter ratio against
/// retinal structure (age removed), then against neural specificity with the
/// other ratio, retinal structure, age and gray-matter volume removed.
pub fn standard_analyses() -> Vec<PartialSpec> {
    vec![
        PartialSpec::new(Measure::GabaTcr, Measure::RetinaStructureIndex, &[Measure::Age]),
        PartialSpec::new(Measure::GlutamateTcr, Measure::RetinaStructureIndex, &[Measure::Age]),
        PartialSpec::new(
            Measure::GabaTcr,
            Measure::NeuralSpecificity,
            &[
                Measure::GlutamateTcr,
                Measure::RetinaStructureIndex,
                Measure::Age,
                Measure::GrayMatterVolume,
            ],
        ),
        PartialSpec::new(
            Measure::GlutamateTcr,
            Measure::NeuralSpecificity,
            &[
                Measure::GabaTcr,
                Measure::RetinaStructureIndex,
                Measure::Age,
                Measure::GrayMatterVolume,
            ],
        ),
    ]
}

#[derive(Debug, Clone)]
pub struct PartialCorrelation {
    pub spec: PartialSpec,
    pub n: usize,
    pub rows_removed: usize,
    pub coefficient: f64,
    pub p_value: f64,
    pub slope: f64,
    pub intercept: f64,
    pub residual_pairs: Vec<(f64, f64)>,
    /// Set when a residual series has no variance left, leaving the
    /// coefficient and p-value undefined.
    pub degenerate: bool,
}

impl PartialCorrelation {
    pub fn residuals_b(&self) -> Vec<f64> {
        self.residual_pairs.iter().map(|(b, _)| *b).collect()
    }

    pub fn residuals_a(&self) -> Vec<f64> {
        self.residual_pairs.iter().map(|(_, a)| *a).collect()
    }

    fn undefined(
        spec: &PartialSpec,
        n: usize,
        rows_removed: usize,
        pairs: Vec<(f64, f64)>,
    ) -> Self {
        Self {
            spec: spec.clone(),
            n,
            rows_removed,
            coefficient: f64::NAN,
            p_value: f64::NAN,
            slope: f64::NAN,
            intercept: f64::NAN,
            residual_pairs: pairs,
            degenerate: true,
        }
    }
}

fn covariate_rows(subset: &DataFrame, covariates: &[Measure]) -> Result<Vec<Vec<f64>>> {
    let cols = covariates
        .iter()
        .map(|m| dense_f64(subset, m.column_name()))
        .collect::<Result<Vec<_>>>()?;
    Ok((0..subset.height())
        .map(|i| cols.iter().map(|c| c[i]).collect())
        .collect())
}

pub fn residual_correlation(
    dataset: &CleanDataset,
    spec: &PartialSpec,
) -> Result<PartialCorrelation> {
    let (subset, removed) = dataset.complete_subset(&spec.required_measures())?;
    let n = subset.height();
    debug!(
        "{}: {n} complete rows, {removed} removed for missing values",
        spec.label
    );
    if n == 0 {
        warn!("{}: no complete rows", spec.label);
        return Ok(PartialCorrelation::undefined(spec, 0, removed, Vec::new()));
    }

    let a = dense_f64(&subset, spec.a.column_name())?;
    let b = dense_f64(&subset, spec.b.column_name())?;
    let x = covariate_rows(&subset, &spec.covariates)?;

    let fit_a = ols(&a, &x, true).with_context(|| format!("{}: fit {}", spec.label, spec.a))?;
    let fit_b = ols(&b, &x, true).with_context(|| format!("{}: fit {}", spec.label, spec.b))?;

    let pairs: Vec<(f64, f64)> = fit_b
        .residuals
        .iter()
        .copied()
        .zip(fit_a.residuals.iter().copied())
        .collect();

    if fit_a.is_exact_fit() || fit_b.is_exact_fit() {
        warn!(
            "{}: covariates explain {} or {} exactly; correlation undefined",
            spec.label, spec.a, spec.b
        );
        let zeroed = pairs
            .iter()
            .map(|(rb, ra)| {
                (
                    if fit_b.is_exact_fit() { 0.0 } else { *rb },
                    if fit_a.is_exact_fit() { 0.0 } else { *ra },
                )
            })
            .collect();
        return Ok(PartialCorrelation::undefined(spec, n, removed, zeroed));
    }

    let coefficient = pearson(&fit_a.residuals, &fit_b.residuals);

    let resid_b_rows: Vec<Vec<f64>> = fit_b.residuals.iter().map(|r| vec![*r]).collect();
    let slope_fit = ols(&fit_a.residuals, &resid_b_rows, true)
        .with_context(|| format!("{}: fit residuals", spec.label))?;
    let slope_idx = slope_fit.predictor_index(0);

    Ok(PartialCorrelation {
        spec: spec.clone(),
        n,
        rows_removed: removed,
        coefficient,
        p_value: slope_fit.p_values[slope_idx],
        slope: slope_fit.coefficients[slope_idx],
        intercept: slope_fit.coefficients[0],
        residual_pairs: pairs,
        degenerate: coefficient.is_nan(),
    })
}

pub fn correlation_table(results: &[PartialCorrelation]) -> Result<DataFrame> {
    let df = df!(
        "analysis" => results.iter().map(|r| r.spec.label.clone()).collect::<Vec<_>>(),
        "a" => results.iter().map(|r| r.spec.a.column_name().to_string()).collect::<Vec<_>>(),
        "b" => results.iter().map(|r| r.spec.b.column_name().to_string()).collect::<Vec<_>>(),
        "covariates" => results.iter().map(|r| r.spec.covariate_names()).collect::<Vec<_>>(),
        "n" => results.iter().map(|r| r.n as u32).collect::<Vec<_>>(),
        "r" => results.iter().map(|r| r.coefficient).collect::<Vec<_>>(),
        "p" => results.iter().map(|r| r.p_value).collect::<Vec<_>>(),
        "slope" => results.iter().map(|r| r.slope).collect::<Vec<_>>(),
    )?;
    Ok(df)
}
