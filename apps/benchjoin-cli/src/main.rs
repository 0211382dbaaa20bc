//! Benchmark Join Binary
//!
//! Entry point for joining raw benchmark CSVs into per-model summary tables.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::Context;
use benchjoin_core::{
    pipeline, Config, ExecutionModel, FilterMode, JobConfig, JobOutcome, JoinJob, OutputFormat,
    Reporter,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "benchjoin")]
#[command(
    version,
    about = "Join repeated benchmark runs into filtered-mean summary tables"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Report format: console, json or json-pretty
    #[arg(short, long, global = true, default_value = "console")]
    format: OutputFormat,

    /// Log debug detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the jobs listed in a TOML configuration file
    Run {
        /// Configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Only run jobs for these models
        #[arg(short, long = "job")]
        jobs: Vec<ExecutionModel>,
    },

    /// Join one model's files using command-line settings
    Join {
        /// Execution model: mpi, hybrid, openmp or sequential
        model: ExecutionModel,

        /// Root directory of the raw files
        #[arg(short, long)]
        input: PathBuf,

        /// Summary CSV to write
        #[arg(short, long)]
        output: PathBuf,

        /// Trial filter: band or disabled (default depends on the model)
        #[arg(long)]
        filter: Option<FilterMode>,

        /// Band half-width in standard errors
        #[arg(long, default_value_t = benchjoin_core::DEFAULT_BAND_Z)]
        band_z: f64,

        /// Decimal places kept in the summary
        #[arg(long, default_value_t = benchjoin_core::DEFAULT_DECIMALS)]
        decimals: u32,

        /// Write full-precision means
        #[arg(long)]
        no_round: bool,

        /// Node numbers to include, e.g. 1,2,3
        #[arg(long, value_delimiter = ',')]
        nodes: Option<Vec<u32>>,

        /// Label template, e.g. "N {Nodes}"
        #[arg(long)]
        label: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    // Reports go to stdout, logs to stderr; RUST_LOG wins over -v
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let jobs = match args.command {
        Command::Run { config, jobs } => jobs_from_config(&config, &jobs)?,
        Command::Join {
            model,
            input,
            output,
            filter,
            band_z,
            decimals,
            no_round,
            nodes,
            label,
        } => {
            let job = JobConfig {
                filter,
                band_z,
                decimals,
                round: !no_round,
                nodes,
                label,
                ..JobConfig::new(model, input, output)
            };
            vec![job.build(Path::new(""))?]
        }
    };

    let outcomes: Vec<JobOutcome> = jobs
        .iter()
        .map(|job| JobOutcome::from_result(job.model, pipeline::run(job)))
        .collect();

    let color = args.format == OutputFormat::Console && std::io::stdout().is_terminal();
    Reporter::new(args.format)
        .with_color(color)
        .report(&outcomes)?;

    let failed = outcomes.iter().filter(|outcome| !outcome.success).count();
    if failed > 0 {
        tracing::error!(failed, total = outcomes.len(), "some jobs failed");
        std::process::exit(1);
    }
    Ok(())
}

fn jobs_from_config(path: &Path, only: &[ExecutionModel]) -> anyhow::Result<Vec<JoinJob>> {
    let config = Config::from_file(path)?;
    let jobs = config
        .build_jobs()
        .with_context(|| format!("Invalid job in {}", path.display()))?;

    if only.is_empty() {
        return Ok(jobs);
    }
    let selected: Vec<JoinJob> = jobs
        .into_iter()
        .filter(|job| only.contains(&job.model))
        .collect();
    if selected.is_empty() {
        anyhow::bail!("no job in {} matches the requested models", path.display());
    }
    Ok(selected)
}
