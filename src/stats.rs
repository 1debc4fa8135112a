use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::statistics::Statistics;

pub fn two_sided_t_p(t: f64, df: f64) -> f64 {
    if t.is_nan() || !(df > 0.0) {
        return f64::NAN;
    }
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * dist.sf(t.abs())).min(1.0),
        Err(_) => f64::NAN,
    }
}

pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return f64::NAN;
    }
    let sx = x.iter().std_dev();
    let sy = y.iter().std_dev();
    if !(sx > 0.0) || !(sy > 0.0) {
        return f64::NAN;
    }
    let r = x.iter().covariance(y.iter()) / (sx * sy);
    r.clamp(-1.0, 1.0)
}

pub fn centered_ss(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().mean();
    values.iter().map(|v| (v - mean).powi(2)).sum()
}
