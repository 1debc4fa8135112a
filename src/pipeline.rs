use std::path::PathBuf;

use anyhow::Result;
use rayon::prelude::*;
use tracing::info;

use crate::clean::{CleanConfig, CleanDataset, clean_dataset};
use crate::io::{DataSource, load_raw, write_dataframe};
use crate::logging::RunLog;
use crate::pairwise::{PairwiseConfig, PairwiseResult, pairwise_t_test};
use crate::parallel::{resolve_threads, run_in_pool};
use crate::plot_utils::{write_group_boxplot, write_residual_plot};
use crate::qc::check_range_f64;
use crate::report::{describe_pairwise, describe_partial, describe_summary};
use crate::residual::{
    PartialCorrelation, PartialSpec, correlation_table, residual_correlation, standard_analyses,
};
use crate::summary::{GroupStats, summarize_by_group, summary_table};
use crate::types::Measure;

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub source: DataSource,
    pub out_dir: PathBuf,
    pub clean: CleanConfig,
    pub pairwise: PairwiseConfig,
    /// Significance level used in the written interpretation only.
    pub alpha: f64,
    pub cores: Option<usize>,
    pub write_plots: bool,
    pub write_tables: bool,
}

impl AnalysisConfig {
    pub fn new(source: DataSource, out_dir: PathBuf) -> Self {
        Self {
            source,
            out_dir,
            clean: CleanConfig::default(),
            pairwise: PairwiseConfig::default(),
            alpha: 0.05,
            cores: None,
            write_plots: true,
            write_tables: true,
        }
    }

    fn validate(&self) -> Result<()> {
        check_range_f64(self.alpha, 0.0, 1.0, true, "alpha")?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Report {
    pub n_subjects: usize,
    pub summaries: Vec<(Measure, Vec<GroupStats>)>,
    pub pairwise: Vec<PairwiseResult>,
    pub partials: Vec<PartialCorrelation>,
}

pub fn load_dataset(config: &AnalysisConfig, log: &mut RunLog) -> Result<CleanDataset> {
    log.log_line(&format!("Loading data from {}", config.source.describe()))?;
    let raw = load_raw(&config.source)?;
    log.log_line(&format!(
        "Raw table: {} rows x {} columns",
        raw.height(),
        raw.width()
    ))?;
    let dataset = clean_dataset(raw, &config.clean)?;
    for note in dataset.notes() {
        log.log_line(note)?;
    }
    for warning in dataset.warnings() {
        log.warn_line(warning)?;
    }
    if dataset.header_row_dropped() {
        log.log_line("Dropped the header-artifact row at the top of the data")?;
    }
    log.log_line(&format!(
        "Clean table: {} subjects; severity groups: {}; {} levels: {}",
        dataset.height(),
        dataset.severity().levels.join(", "),
        dataset.gender().name,
        dataset.gender().levels.join(", ")
    ))?;
    Ok(dataset)
}

fn summary_section(
    config: &AnalysisConfig,
    dataset: &CleanDataset,
    measure: Measure,
    log: &mut RunLog,
) -> Result<Vec<GroupStats>> {
    let stats = summarize_by_group(dataset, measure)?;
    for line in describe_summary(measure, &stats) {
        log.log_line(&line)?;
    }
    if config.write_tables {
        let path = config
            .out_dir
            .join(format!("group_summary_{}.tsv", measure.slug()));
        write_dataframe(&summary_table(&stats)?, &path)?;
    }
    if config.write_plots {
        let groups = dataset.values_by_severity(measure)?;
        let path = write_group_boxplot(&config.out_dir, measure, &groups)?;
        info!("wrote {}", path.display());
    }
    log.blank()?;
    Ok(stats)
}

fn pairwise_section(
    config: &AnalysisConfig,
    dataset: &CleanDataset,
    measure: Measure,
    log: &mut RunLog,
) -> Result<PairwiseResult> {
    let result = pairwise_t_test(dataset, measure, &config.pairwise)?;
    for line in describe_pairwise(&result, config.alpha) {
        log.log_line(&line)?;
    }
    if config.write_tables {
        let path = config
            .out_dir
            .join(format!("pairwise_{}.tsv", measure.slug()));
        write_dataframe(&result.table()?, &path)?;
    }
    log.blank()?;
    Ok(result)
}

pub fn run_partials(
    dataset: &CleanDataset,
    specs: &[PartialSpec],
    cores: Option<usize>,
) -> Result<Vec<PartialCorrelation>> {
    match resolve_threads(cores, specs.len()) {
        Some(threads) => run_in_pool(Some(threads), "build analysis thread pool", || {
            specs
                .par_iter()
                .map(|spec| residual_correlation(dataset, spec))
                .collect::<Result<Vec<_>>>()
        })?,
        None => specs
            .iter()
            .map(|spec| residual_correlation(dataset, spec))
            .collect(),
    }
}

fn partial_section(
    config: &AnalysisConfig,
    results: &[PartialCorrelation],
    log: &mut RunLog,
) -> Result<()> {
    for result in results {
        for line in describe_partial(result, config.alpha) {
            log.log_line(&line)?;
        }
        if config.write_plots {
            let path = write_residual_plot(&config.out_dir, result)?;
            info!("wrote {}", path.display());
        }
        log.blank()?;
    }
    if config.write_tables {
        let path = config.out_dir.join("partial_correlations.tsv");
        write_dataframe(&correlation_table(results)?, &path)?;
    }
    Ok(())
}

pub fn run_report(config: &AnalysisConfig) -> Result<Report> {
    config.validate()?;
    let mut log = RunLog::create(&config.out_dir)?;
    let dataset = load_dataset(config, &mut log)?;
    log.blank()?;

    let mut summaries = Vec::new();
    let mut pairwise = Vec::new();
    for measure in Measure::RATIOS {
        summaries.push((measure, summary_section(config, &dataset, measure, &mut log)?));
        pairwise.push(pairwise_section(config, &dataset, measure, &mut log)?);
    }

    let specs = standard_analyses();
    let partials = run_partials(&dataset, &specs, config.cores)?;
    partial_section(config, &partials, &mut log)?;

    log.log_line(&format!(
        "Report finished; output written to {}",
        config.out_dir.display()
    ))?;
    Ok(Report {
        n_subjects: dataset.height(),
        summaries,
        pairwise,
        partials,
    })
}

pub fn run_summary(config: &AnalysisConfig, measure: Measure) -> Result<Vec<GroupStats>> {
    config.validate()?;
    let mut log = RunLog::create(&config.out_dir)?;
    let dataset = load_dataset(config, &mut log)?;
    summary_section(config, &dataset, measure, &mut log)
}

pub fn run_pairwise(config: &AnalysisConfig, measure: Measure) -> Result<PairwiseResult> {
    config.validate()?;
    let mut log = RunLog::create(&config.out_dir)?;
    let dataset = load_dataset(config, &mut log)?;
    pairwise_section(config, &dataset, measure, &mut log)
}

pub fn run_partial(config: &AnalysisConfig, spec: &PartialSpec) -> Result<PartialCorrelation> {
    config.validate()?;
    let mut log = RunLog::create(&config.out_dir)?;
    let dataset = load_dataset(config, &mut log)?;
    let result = residual_correlation(&dataset, spec)?;
    partial_section(config, std::slice::from_ref(&result), &mut log)?;
    Ok(result)
}
