use std::collections::HashMap;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use glaucoma_mrs::clean::HeaderArtifact;
use glaucoma_mrs::error::AnalysisError;
use glaucoma_mrs::io::DataSource;
use glaucoma_mrs::logging::init_tracing;
use glaucoma_mrs::pairwise::{PairwiseConfig, TTestMethod};
use glaucoma_mrs::pipeline::{
    AnalysisConfig, run_pairwise, run_partial, run_report, run_summary,
};
use glaucoma_mrs::residual::PartialSpec;
use glaucoma_mrs::types::Measure;

#[derive(Parser)]
#[command(name = "glaucoma-mrs")]
#[command(
    about = "GABA, glutamate, retinal structure and neural specificity in glaucoma",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Clone)]
struct SourceArgs {
    /// CSV export of the subject sheet.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    url: Option<String>,
    #[arg(long)]
    file: Option<PathBuf>,
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// Comma-separated severity labels, in report order.
    #[arg(long, default_value = "Healthy control,Early glaucoma,Advanced glaucoma")]
    severity_levels: String,
    /// detect, drop or keep the first data row.
    #[arg(long, default_value = "detect")]
    header_artifact: String,
    /// Explicit column mapping, e.g. "Retina Structure Index=RSI_total".
    #[arg(long = "column")]
    columns: Vec<String>,
    #[arg(long, default_value_t = 0.05)]
    alpha: f64,
    #[arg(long)]
    welch: bool,
    #[arg(long)]
    no_plots: bool,
    #[arg(long)]
    no_tables: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Full report: summaries, pairwise tests and the four partial correlations.
    Run {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long)]
        cores: Option<usize>,
    },
    Summary {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, required = true)]
        measure: String,
    },
    Pairwise {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, required = true)]
        measure: String,
    },
    /// Correlation of A and B after regressing the covariates out of both.
    Partial {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, required = true)]
        a: String,
        #[arg(long, required = true)]
        b: String,
        /// Comma-separated measures; empty removes only the mean.
        #[arg(long, default_value = "")]
        covariates: String,
    },
}

fn split_string_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_measures(value: &str) -> Result<Vec<Measure>, AnalysisError> {
    split_string_list(value)
        .iter()
        .map(|s| s.parse::<Measure>())
        .collect()
}

fn parse_column_overrides(values: &[String]) -> anyhow::Result<HashMap<String, String>> {
    let mut out = HashMap::new();
    for value in values {
        let (target, source) = value.split_once('=').ok_or_else(|| {
            AnalysisError::InvalidArgument(format!(
                "--column expects TARGET=SOURCE, got {value:?}"
            ))
        })?;
        out.insert(target.trim().to_string(), source.trim().to_string());
    }
    Ok(out)
}

fn build_config(args: SourceArgs, cores: Option<usize>) -> anyhow::Result<AnalysisConfig> {
    let source = match (args.url, args.file) {
        (Some(url), None) => DataSource::Url(url),
        (None, Some(file)) => DataSource::File(file),
        _ => {
            return Err(AnalysisError::InvalidArgument(
                "exactly one of --url or --file is required".to_string(),
            )
            .into());
        }
    };
    let mut config = AnalysisConfig::new(source, args.out_dir);
    config.clean.severity_levels = split_string_list(&args.severity_levels);
    if config.clean.severity_levels.len() != 3 {
        return Err(AnalysisError::InvalidArgument(format!(
            "--severity-levels needs three labels, got {}",
            config.clean.severity_levels.len()
        ))
        .into());
    }
    config.clean.header_artifact = args.header_artifact.parse::<HeaderArtifact>()?;
    config.clean.column_map.userprovided = parse_column_overrides(&args.columns)?;
    config.clean.column_map.source = Some(config.source.describe());
    config.pairwise = PairwiseConfig {
        method: if args.welch {
            TTestMethod::Welch
        } else {
            TTestMethod::PooledSd
        },
    };
    config.alpha = args.alpha;
    config.cores = cores;
    config.write_plots = !args.no_plots;
    config.write_tables = !args.no_tables;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Run { source, cores } => {
            let config = build_config(source, cores)?;
            let report = run_report(&config)?;
            tracing::info!(
                "{} subjects, {} partial correlation(s)",
                report.n_subjects,
                report.partials.len()
            );
        }
        Command::Summary { source, measure } => {
            let config = build_config(source, None)?;
            run_summary(&config, measure.parse()?)?;
        }
        Command::Pairwise { source, measure } => {
            let config = build_config(source, None)?;
            run_pairwise(&config, measure.parse()?)?;
        }
        Command::Partial {
            source,
            a,
            b,
            covariates,
        } => {
            let config = build_config(source, None)?;
            let spec = PartialSpec::new(a.parse()?, b.parse()?, &parse_measures(&covariates)?);
            run_partial(&config, &spec)?;
        }
    }
    Ok(())
}
