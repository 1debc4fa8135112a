use std::fmt;
use std::str::FromStr;

use crate::error::AnalysisError;

pub const ID_COLUMN: &str = "ID";
pub const GENDER_COLUMN: &str = "Gender";
pub const SEVERITY_COLUMN: &str = "Severity group";

pub const DEFAULT_SEVERITY_LEVELS: [&str; 3] =
    ["Healthy control", "Early glaucoma", "Advanced glaucoma"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measure {
    Age,
    GabaTcr,
    GlutamateTcr,
    GabaNaa,
    GlutamateNaa,
    NeuralSpecificity,
    GrayMatterVolume,
    RetinaStructureIndex,
}

impl Measure {
    pub const ALL: [Measure; 8] = [
        Measure::Age,
        Measure::GabaTcr,
        Measure::GlutamateTcr,
        Measure::GabaNaa,
        Measure::GlutamateNaa,
        Measure::NeuralSpecificity,
        Measure::GrayMatterVolume,
        Measure::RetinaStructureIndex,
    ];

    pub const RATIOS: [Measure; 4] = [
        Measure::GabaTcr,
        Measure::GlutamateTcr,
        Measure::GabaNaa,
        Measure::GlutamateNaa,
    ];

    pub fn column_name(self) -> &'static str {
        match self {
            Measure::Age => "Age",
            Measure::GabaTcr => "Gaba/tCr",
            Measure::GlutamateTcr => "Glutamate/tCr",
            Measure::GabaNaa => "GABA/NAA",
            Measure::GlutamateNaa => "Glutamate/NAA",
            Measure::NeuralSpecificity => "Neural specificity",
            Measure::GrayMatterVolume => "Gray matter volume of visual areas",
            Measure::RetinaStructureIndex => "Retina Structure Index",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Measure::Age => "age",
            Measure::GabaTcr => "gaba-tcr",
            Measure::GlutamateTcr => "glutamate-tcr",
            Measure::GabaNaa => "gaba-naa",
            Measure::GlutamateNaa => "glutamate-naa",
            Measure::NeuralSpecificity => "neural-specificity",
            Measure::GrayMatterVolume => "gray-matter-volume",
            Measure::RetinaStructureIndex => "retina-structure-index",
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for Measure {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Measure::ALL
            .into_iter()
            .find(|m| {
                m.slug().eq_ignore_ascii_case(wanted)
                    || m.column_name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| {
                let known: Vec<&str> = Measure::ALL.iter().map(|m| m.slug()).collect();
                AnalysisError::InvalidArgument(format!(
                    "unknown measure {wanted:?}; expected one of {}",
                    known.join(", ")
                ))
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Factor {
    pub name: String,
    pub levels: Vec<String>,
    pub codes: Vec<Option<usize>>,
}

impl Factor {
    pub fn from_observed(name: &str, values: &[Option<String>]) -> Self {
        let mut levels: Vec<String> = Vec::new();
        let codes = values
            .iter()
            .map(|v| {
                let label = v.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
                match levels.iter().position(|l| l == label) {
                    Some(idx) => Some(idx),
                    None => {
                        levels.push(label.to_string());
                        Some(levels.len() - 1)
                    }
                }
            })
            .collect();
        Self {
            name: name.to_string(),
            levels,
            codes,
        }
    }

    /// Matches values case-insensitively against a fixed level list, keeping the
    /// list's order. Any other non-empty label is an error.
    pub fn with_levels(
        name: &str,
        values: &[Option<String>],
        expected: &[String],
    ) -> crate::error::Result<Self> {
        let mut codes = Vec::with_capacity(values.len());
        for v in values {
            let label = v.as_deref().map(str::trim).filter(|s| !s.is_empty());
            let code = match label {
                None => None,
                Some(label) => Some(
                    expected
                        .iter()
                        .position(|l| l.trim().eq_ignore_ascii_case(label))
                        .ok_or_else(|| AnalysisError::UnexpectedLevel {
                            column: name.to_string(),
                            level: label.to_string(),
                            expected: expected.to_vec(),
                        })?,
                ),
            };
            codes.push(code);
        }
        Ok(Self {
            name: name.to_string(),
            levels: expected.to_vec(),
            codes,
        })
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn label(&self, row: usize) -> Option<&str> {
        self.codes
            .get(row)
            .copied()
            .flatten()
            .map(|c| self.levels[c].as_str())
    }

    pub fn observed_levels(&self) -> Vec<&str> {
        self.levels
            .iter()
            .enumerate()
            .filter(|(idx, _)| self.codes.contains(&Some(*idx)))
            .map(|(_, l)| l.as_str())
            .collect()
    }
}
