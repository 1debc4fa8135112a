use std::path::Path;

use glaucoma_mrs::error::AnalysisError;
use glaucoma_mrs::parallel::{resolve_threads, run_in_pool};
use glaucoma_mrs::plot_utils::plot_path;
use glaucoma_mrs::qc::{check_equal_length, check_range_f64};
use glaucoma_mrs::report::{describe_summary, format_p};
use glaucoma_mrs::summary::GroupStats;
use glaucoma_mrs::types::{DEFAULT_SEVERITY_LEVELS, Factor, Measure};

fn vals(v: &[&str]) -> Vec<Option<String>> {
    v.iter()
        .map(|s| if s.is_empty() { None } else { Some(s.to_string()) })
        .collect()
}

#[test]
fn range_bounds() {
    assert!(check_range_f64(0.05, 0.0, 1.0, true, "alpha").is_ok());
    assert!(check_range_f64(0.0, 0.0, 1.0, true, "alpha").is_err());
    assert!(check_range_f64(0.0, 0.0, 1.0, false, "alpha").is_ok());
    assert!(check_range_f64(f64::NAN, 0.0, 1.0, false, "alpha").is_err());
    assert!(check_equal_length(2, 3, "a", "b").is_err());
}

#[test]
fn threads_capped_by_tasks() {
    assert_eq!(resolve_threads(Some(16), 4), Some(4));
    assert_eq!(resolve_threads(Some(2), 4), Some(2));
    assert_eq!(resolve_threads(Some(0), 4), Some(1));
    assert_eq!(resolve_threads(None, 4), None);
    assert_eq!(run_in_pool(Some(2), "pool", || 40 + 2).unwrap(), 42);
}

#[test]
fn plot_paths_live_under_plots() {
    let p = plot_path(Path::new("out"), Some("boxplot"), "gaba-tcr");
    assert_eq!(p, Path::new("out").join("Plots").join("boxplot_gaba-tcr.html"));
    let p = plot_path(Path::new("out"), None, "x");
    assert_eq!(p, Path::new("out").join("Plots").join("x.html"));
}

#[test]
fn p_value_formatting() {
    assert_eq!(format_p(f64::NAN), "NA");
    assert_eq!(format_p(0.0312), "0.0312");
    assert_eq!(format_p(0.00012), "1.20e-4");
}

#[test]
fn summary_notes_undefined_sd() {
    let stats = vec![
        GroupStats::from_values("Healthy control", &[0.1]),
        GroupStats::from_values("Early glaucoma", &[0.2, 0.3]),
    ];
    let lines = describe_summary(Measure::GabaTcr, &stats);
    assert!(lines.iter().any(|l| l.contains("Healthy control has 1 non-missing")));
    assert!(lines.iter().any(|l| l.contains("highest in Early glaucoma")));
}

#[test]
fn factor_levels_in_first_seen_order() {
    let f = Factor::from_observed("Gender", &vals(&["F", "M", "", "F"]));
    assert_eq!(f.levels, vec!["F", "M"]);
    assert_eq!(f.codes, vec![Some(0), Some(1), None, Some(0)]);
    assert_eq!(f.label(2), None);
}

#[test]
fn fixed_levels_reject_unknown_label() {
    let expected: Vec<String> = DEFAULT_SEVERITY_LEVELS
        .iter()
        .map(|s| s.to_string())
        .collect();
    let ok =
        Factor::with_levels("Severity group", &vals(&["early glaucoma", ""]), &expected).unwrap();
    assert_eq!(ok.codes, vec![Some(1), None]);
    assert_eq!(ok.observed_levels(), vec!["Early glaucoma"]);

    let err = Factor::with_levels("Severity group", &vals(&["Moderate"]), &expected);
    assert!(matches!(err, Err(AnalysisError::UnexpectedLevel { .. })));
}

#[test]
fn measure_parses_slug_and_column_name() {
    assert_eq!("gaba-tcr".parse::<Measure>().unwrap(), Measure::GabaTcr);
    assert_eq!(
        "Retina Structure Index".parse::<Measure>().unwrap(),
        Measure::RetinaStructureIndex
    );
    assert!("lactate".parse::<Measure>().is_err());
}
