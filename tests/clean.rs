mod common;

use common::{GROUPS, csv_text, dataset_from_rows, noisy_rows, row};
use glaucoma_mrs::clean::{CleanConfig, HeaderArtifact, clean_dataset};
use glaucoma_mrs::error::AnalysisError;
use glaucoma_mrs::io::parse_csv_bytes;
use glaucoma_mrs::types::Measure;

#[test]
fn header_artifact_row_is_detected_and_dropped() {
    let ds = dataset_from_rows(&noisy_rows(9, 1), true);
    assert!(ds.header_row_dropped());
    assert_eq!(ds.height(), 9);
    assert_eq!(ds.severity().label(0), Some(GROUPS[0]));
}

#[test]
fn numeric_first_row_is_kept_in_detect_mode() {
    let ds = dataset_from_rows(&noisy_rows(9, 2), false);
    assert!(!ds.header_row_dropped());
    assert_eq!(ds.height(), 9);
    assert!(ds.warnings().iter().any(|w| w.contains("keeping it")));
    assert!(ds.notes().iter().all(|n| !n.contains("keeping it")));
}

#[test]
fn first_subject_with_blank_measures_is_kept() {
    let mut rows = vec![format!("s1,,F,{},,,,,,,,", GROUPS[0])];
    rows.extend(noisy_rows(6, 5));
    let raw = parse_csv_bytes(csv_text(&rows, false).into_bytes(), "fixture").unwrap();
    let ds = clean_dataset(raw, &CleanConfig::default()).unwrap();
    assert!(!ds.header_row_dropped());
    assert_eq!(ds.height(), 7);
    assert_eq!(ds.severity().label(0), Some(GROUPS[0]));
    assert_eq!(ds.measure_values(Measure::Age).unwrap()[0], None);
}

#[test]
fn single_gender_level_is_a_warning() {
    let rows: Vec<String> = (0..6)
        .map(|i| {
            let id = format!("s{i}");
            row(&id, "60", "F", GROUPS[i % 3], "0.1", "1.0", "0.5", "4000", "0.8")
        })
        .collect();
    let ds = dataset_from_rows(&rows, true);
    assert_eq!(ds.gender().levels.len(), 1);
    assert!(ds.warnings().iter().any(|w| w.contains("two were expected")));
}

#[test]
fn forced_drop_removes_first_row_even_if_numeric() {
    let raw = parse_csv_bytes(csv_text(&noisy_rows(6, 3), false).into_bytes(), "fixture").unwrap();
    let config = CleanConfig {
        header_artifact: HeaderArtifact::Drop,
        ..CleanConfig::default()
    };
    let ds = clean_dataset(raw, &config).unwrap();
    assert_eq!(ds.height(), 5);
}

#[test]
fn non_numeric_cells_become_missing_not_zero() {
    let rows = vec![
        row("s1", "61", "F", GROUPS[0], "0.102", "n/a", "0.55", "4200", "0.9"),
        row("s2", "abc", "M", GROUPS[1], "", "1.01", "0.60", "4100", "0.7"),
        row("s3", "70", "F", GROUPS[2], "0.095", "0.98", "--", "3900", "0.5"),
    ];
    let ds = dataset_from_rows(&rows, true);
    assert_eq!(ds.height(), 3, "coercion failures never drop rows");

    let glu = ds.measure_values(Measure::GlutamateTcr).unwrap();
    assert_eq!(glu, vec![None, Some(1.01), Some(0.98)]);
    let age = ds.measure_values(Measure::Age).unwrap();
    assert_eq!(age, vec![Some(61.0), None, Some(70.0)]);
    let gaba = ds.measure_values(Measure::GabaTcr).unwrap();
    assert_eq!(gaba[1], None);
    let ns = ds.measure_values(Measure::NeuralSpecificity).unwrap();
    assert_eq!(ns[2], None);
}

#[test]
fn severity_levels_are_exactly_the_expected_three() {
    let mut rows = noisy_rows(12, 4);
    rows.push(row("s99", "66", "M", "early GLAUCOMA", "0.1", "1.0", "0.5", "4000", "0.8"));
    let ds = dataset_from_rows(&rows, true);
    assert_eq!(ds.severity().levels, GROUPS.to_vec());
    let mut seen = ds.severity().observed_levels();
    seen.sort();
    let mut expected = GROUPS.to_vec();
    expected.sort();
    assert_eq!(seen, expected);
    assert_eq!(ds.severity().label(12), Some("Early glaucoma"));
    assert_eq!(ds.gender().levels.len(), 2);
}

#[test]
fn unknown_severity_label_is_rejected() {
    let rows = vec![row("s1", "61", "F", "Moderate glaucoma", "0.1", "1.0", "0.5", "4000", "0.8")];
    let raw = parse_csv_bytes(csv_text(&rows, true).into_bytes(), "fixture").unwrap();
    let err = clean_dataset(raw, &CleanConfig::default()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AnalysisError>(),
        Some(AnalysisError::UnexpectedLevel { .. })
    ));
}

#[test]
fn missing_column_is_a_schema_mismatch() {
    let text = "ID,Age,Gender,Severity group,Gaba/tCr,Glutamate/tCr,GABA/NAA,Glutamate/NAA,Neural specificity,Gray matter volume of visual areas,Notes\ns1,60,F,Healthy control,0.1,1,0.1,1,0.5,4000,x\n";
    let raw = parse_csv_bytes(text.as_bytes().to_vec(), "fixture").unwrap();
    let err = clean_dataset(raw, &CleanConfig::default()).unwrap_err();
    match err.downcast_ref::<AnalysisError>() {
        Some(AnalysisError::SchemaMismatch(msg)) => {
            assert!(msg.contains("Retina Structure Index"), "{msg}")
        }
        other => panic!("expected schema mismatch, got {other:?}"),
    }
}

#[test]
fn columns_are_selected_by_name_not_position() {
    let text = "Notes,Retina Structure Index,Severity group,ID,Gaba/tCr,Age,Glutamate/tCr,Gender,GABA/NAA,Glutamate/NAA,Neural specificity,Gray matter volume of visual areas\nx,0.8,Early glaucoma,s1,0.11,64,1.02,F,0.12,0.95,0.5,4100\n";
    let raw = parse_csv_bytes(text.as_bytes().to_vec(), "fixture").unwrap();
    let ds = clean_dataset(
        raw,
        &CleanConfig {
            header_artifact: HeaderArtifact::Keep,
            ..CleanConfig::default()
        },
    )
    .unwrap();
    assert_eq!(ds.measure_values(Measure::Age).unwrap(), vec![Some(64.0)]);
    assert_eq!(
        ds.measure_values(Measure::RetinaStructureIndex).unwrap(),
        vec![Some(0.8)]
    );
    let names: Vec<String> = ds
        .frame()
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(names[0], "ID");
    assert_eq!(names.len(), 11);
}
