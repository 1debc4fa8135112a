use std::collections::HashMap;

use crate::error::{AnalysisError, Result};
use crate::types::{GENDER_COLUMN, ID_COLUMN, Measure, SEVERITY_COLUMN};

pub fn expected_columns() -> Vec<&'static str> {
    let mut cols = vec![ID_COLUMN, "Age", GENDER_COLUMN, SEVERITY_COLUMN];
    cols.extend(
        [
            Measure::GabaTcr,
            Measure::GlutamateTcr,
            Measure::GabaNaa,
            Measure::GlutamateNaa,
            Measure::NeuralSpecificity,
            Measure::GrayMatterVolume,
            Measure::RetinaStructureIndex,
        ]
        .map(Measure::column_name),
    );
    cols
}

#[derive(Debug, Clone)]
pub struct ColumnMap {
    pub selected: Vec<(String, String)>,
    pub info: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ColumnMapConfig {
    pub userprovided: HashMap<String, String>,
    pub source: Option<String>,
}

/// Uppercases and strips everything but ASCII letters and digits, so that
/// `Gaba/tCr`, `GABA_tCr` and `gaba tcr` compare equal.
pub fn normalize_header(header: &str) -> String {
    header
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

fn synonyms() -> HashMap<&'static str, Vec<&'static str>> {
    let mut synonyms: HashMap<&'static str, Vec<&'static str>> = HashMap::new();
    synonyms.insert(
        ID_COLUMN,
        vec!["ID", "SUBJECTID", "SUBJECT", "PARTICIPANT", "PARTICIPANTID"],
    );
    synonyms.insert("Age", vec!["AGE", "AGEYEARS", "AGEYRS"]);
    synonyms.insert(GENDER_COLUMN, vec!["GENDER", "SEX"]);
    synonyms.insert(
        SEVERITY_COLUMN,
        vec!["SEVERITYGROUP", "SEVERITY", "GROUP", "DIAGNOSIS"],
    );
    synonyms.insert(
        Measure::GabaTcr.column_name(),
        vec!["GABATCR", "GABACR", "GABATOTALCREATINE"],
    );
    synonyms.insert(
        Measure::GlutamateTcr.column_name(),
        vec!["GLUTAMATETCR", "GLUTCR", "GLUTAMATECR", "GLUTAMATETOTALCREATINE"],
    );
    synonyms.insert(Measure::GabaNaa.column_name(), vec!["GABANAA"]);
    synonyms.insert(
        Measure::GlutamateNaa.column_name(),
        vec!["GLUTAMATENAA", "GLUNAA"],
    );
    synonyms.insert(
        Measure::NeuralSpecificity.column_name(),
        vec!["NEURALSPECIFICITY", "SPECIFICITY"],
    );
    synonyms.insert(
        Measure::GrayMatterVolume.column_name(),
        vec![
            "GRAYMATTERVOLUMEOFVISUALAREAS",
            "GREYMATTERVOLUMEOFVISUALAREAS",
            "GRAYMATTERVOLUME",
            "GREYMATTERVOLUME",
            "GMV",
        ],
    );
    synonyms.insert(
        Measure::RetinaStructureIndex.column_name(),
        vec!["RETINASTRUCTUREINDEX", "RETINALSTRUCTUREINDEX", "RSI"],
    );
    synonyms
}

pub fn resolve_column_map(headers: &[String], config: &ColumnMapConfig) -> Result<ColumnMap> {
    let source = config
        .source
        .clone()
        .unwrap_or_else(|| "<unknown>".to_string());
    let expected = expected_columns();
    if headers.len() < expected.len() {
        return Err(AnalysisError::SchemaMismatch(format!(
            "{source} has {} column(s); at least {} are required ({})",
            headers.len(),
            expected.len(),
            expected.join(", ")
        )));
    }

    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    let synonyms = synonyms();
    let mut problems = Vec::new();
    let mut info = Vec::new();
    let mut selected: Vec<(String, String)> = Vec::with_capacity(expected.len());

    for target in &expected {
        if let Some(user) = config.userprovided.get(*target) {
            if headers.iter().any(|h| h == user) {
                info.push(format!("Using user-provided column {user:?} for {target}"));
                selected.push((user.clone(), target.to_string()));
            } else {
                problems.push(format!("user-provided column {user:?} for {target} not found"));
            }
            continue;
        }

        let keys = synonyms.get(target).cloned().unwrap_or_default();
        let hits: Vec<usize> = normalized
            .iter()
            .enumerate()
            .filter(|(_, h)| keys.iter().any(|k| *k == h.as_str()))
            .map(|(i, _)| i)
            .collect();
        match hits.as_slice() {
            [] => problems.push(format!("no column found for {target}")),
            [idx] => {
                let header = &headers[*idx];
                if header != target {
                    info.push(format!("Interpreting column {header:?} as {target}"));
                }
                selected.push((header.clone(), target.to_string()));
            }
            many => {
                let names: Vec<&str> = many.iter().map(|i| headers[*i].as_str()).collect();
                problems.push(format!(
                    "multiple columns could be {target}: {}",
                    names.join(", ")
                ));
            }
        }
    }

    for (i, (src, target)) in selected.iter().enumerate() {
        if let Some((_, other)) = selected[..i].iter().find(|(s, _)| s == src) {
            problems.push(format!("column {src:?} matched both {other} and {target}"));
        }
    }

    if !problems.is_empty() {
        return Err(AnalysisError::SchemaMismatch(format!(
            "{source}: {}",
            problems.join("; ")
        )));
    }

    Ok(ColumnMap { selected, info })
}
