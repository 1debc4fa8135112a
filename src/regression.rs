use anyhow::{Context, Result};
use ndarray::{Array1, Array2};
use ndarray_linalg::{Inverse, LeastSquaresSvd};
use tracing::debug;

use crate::qc::check_equal_length;
use crate::stats::two_sided_t_p;

/// Residual sum of squares below this fraction of `sum(y^2)` counts as an exact fit.
const EXACT_FIT_RTOL: f64 = 1e-16;

#[derive(Debug, Clone)]
pub struct OlsFit {
    pub coefficients: Vec<f64>,
    pub std_errors: Vec<f64>,
    pub t_values: Vec<f64>,
    pub p_values: Vec<f64>,
    pub fitted: Vec<f64>,
    pub residuals: Vec<f64>,
    pub df_resid: usize,
    pub rank: usize,
    pub rss: f64,
    y_sq: f64,
    intercept: bool,
}

impl OlsFit {
    pub fn is_exact_fit(&self) -> bool {
        self.rss <= EXACT_FIT_RTOL * self.y_sq
    }

    pub fn predictor_index(&self, j: usize) -> usize {
        if self.intercept { j + 1 } else { j }
    }
}

/// Fits `y ~ predictors` where `predictors[i]` is the predictor row of
/// observation `i`. An empty predictor row with `intercept` fits the mean.
pub fn ols(y: &[f64], predictors: &[Vec<f64>], intercept: bool) -> Result<OlsFit> {
    let n = y.len();
    if n == 0 {
        return Err(anyhow::anyhow!("Y must not be empty"));
    }
    check_equal_length(predictors.len(), n, "predictor rows", "Y")?;
    let p = predictors.first().map(|row| row.len()).unwrap_or(0);
    for (i, row) in predictors.iter().enumerate() {
        if row.len() != p {
            return Err(anyhow::anyhow!(
                "Predictors row {i} length {} does not match {p}",
                row.len()
            ));
        }
    }
    let x_cols = if intercept { p + 1 } else { p };
    if x_cols == 0 {
        return Err(anyhow::anyhow!("Model must have an intercept or a predictor"));
    }

    let mut x_data = Vec::with_capacity(n * x_cols);
    for row in predictors {
        if intercept {
            x_data.push(1.0);
        }
        x_data.extend_from_slice(row);
    }
    let x = Array2::from_shape_vec((n, x_cols), x_data).context("X shape")?;
    let y_arr = Array1::from_vec(y.to_vec());

    let lsq = x.least_squares(&y_arr).context("least squares")?;
    let betas = lsq.solution;
    let rank = usize::try_from(lsq.rank).unwrap_or(0);

    let fitted_arr = x.dot(&betas);
    let fitted = fitted_arr.to_vec();
    let residuals: Vec<f64> = y.iter().zip(&fitted).map(|(obs, fit)| obs - fit).collect();
    let rss: f64 = residuals.iter().map(|r| r * r).sum();
    let y_sq: f64 = y.iter().map(|v| v * v).sum();
    let df_resid = n.saturating_sub(x_cols);

    let cov = if rank == x_cols && df_resid > 0 {
        let xtx = x.t().dot(&x);
        match xtx.inv() {
            Ok(inv) => Some(inv * (rss / df_resid as f64)),
            Err(e) => {
                debug!("X'X not invertible: {e}");
                None
            }
        }
    } else {
        debug!("rank {rank} of {x_cols} columns, {df_resid} residual df; standard errors undefined");
        None
    };

    let coefficients = betas.to_vec();
    let std_errors: Vec<f64> = (0..x_cols)
        .map(|i| {
            cov.as_ref()
                .map(|c| c[(i, i)].abs().sqrt())
                .unwrap_or(f64::NAN)
        })
        .collect();
    let t_values: Vec<f64> = coefficients
        .iter()
        .zip(&std_errors)
        .map(|(b, se)| b / se)
        .collect();
    let p_values = t_values
        .iter()
        .map(|t| two_sided_t_p(*t, df_resid as f64))
        .collect();

    Ok(OlsFit {
        coefficients,
        std_errors,
        t_values,
        p_values,
        fitted,
        residuals,
        df_resid,
        rank,
        rss,
        y_sq,
        intercept,
    })
}
