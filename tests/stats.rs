use approx::assert_abs_diff_eq;
use glaucoma_mrs::regression::ols;
use glaucoma_mrs::stats::{pearson, two_sided_t_p};

#[test]
fn t_p_matches_reference_values() {
    // qt(0.975, 10) = 2.228139
    assert_abs_diff_eq!(two_sided_t_p(2.228139, 10.0), 0.05, epsilon = 1e-5);
    assert_abs_diff_eq!(two_sided_t_p(0.0, 4.0), 1.0, epsilon = 1e-12);
    assert!(two_sided_t_p(1.0, 0.0).is_nan());
}

#[test]
fn pearson_perfect_and_degenerate() {
    let x = [1.0, 2.0, 3.0, 4.0];
    let y = [2.0, 4.0, 6.0, 8.0];
    assert_abs_diff_eq!(pearson(&x, &y), 1.0, epsilon = 1e-12);
    let neg: Vec<f64> = y.iter().map(|v| -v).collect();
    assert_abs_diff_eq!(pearson(&x, &neg), -1.0, epsilon = 1e-12);
    assert!(pearson(&x, &[5.0; 4]).is_nan());
    assert!(pearson(&[1.0], &[1.0]).is_nan());
}

#[test]
fn simple_regression_recovers_line() {
    let x: Vec<Vec<f64>> = (0..6).map(|i| vec![i as f64]).collect();
    let y: Vec<f64> = (0..6)
        .map(|i| 1.5 + 2.0 * i as f64 + if i % 2 == 0 { 0.1 } else { -0.1 })
        .collect();
    let fit = ols(&y, &x, true).unwrap();
    assert_eq!(fit.df_resid, 4);
    // alternating +-0.1 noise shifts the slope by sum((x - 2.5) * e) / Sxx = -0.3 / 17.5
    assert_abs_diff_eq!(fit.coefficients[1], 2.0 - 0.3 / 17.5, epsilon = 1e-9);
    let resid_sum: f64 = fit.residuals.iter().sum();
    assert_abs_diff_eq!(resid_sum, 0.0, epsilon = 1e-9);
    assert!(fit.p_values[fit.predictor_index(0)] < 1e-6);
    assert!(!fit.is_exact_fit());
}

#[test]
fn noiseless_response_is_exact_fit() {
    let x: Vec<Vec<f64>> = [45.0, 52.0, 61.0, 66.0, 70.0]
        .iter()
        .map(|a| vec![*a])
        .collect();
    let y: Vec<f64> = x.iter().map(|r| 0.01 * r[0] + 0.3).collect();
    let fit = ols(&y, &x, true).unwrap();
    assert!(fit.is_exact_fit());
    assert!(fit.residuals.iter().all(|r| r.abs() < 1e-9));
}

#[test]
fn mismatched_rows_are_rejected() {
    let err = ols(&[1.0, 2.0], &[vec![1.0]], true).unwrap_err();
    assert!(err.to_string().contains("should be equal"), "{err}");
}
