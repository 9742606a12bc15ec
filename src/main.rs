mod companion;
mod config;
mod converged;
mod cursor;
mod emit;
mod error;
mod extract;
mod job;
mod patterns;
mod record;
mod runner;
mod trailing;

use clap::Parser;
use config::{Overrides, SummaryConfig};
use error::SummaryError;
use job::Job;
use patterns::PatternSet;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Summarize VASP job directories: pull atom count, energy, electron, band
/// and k-point counts from OUTCAR, the k-point mesh from KPOINTS and the
/// final force drift, and write one CSV row per job.
#[derive(Parser, Debug)]
#[command(name = "outcar-summary", version, about)]
pub struct Cli {
    /// Job directories or glob patterns (default: current directory)
    #[arg(value_name = "JOB_DIRS")]
    job_dirs: Vec<String>,

    /// Config file path
    #[arg(short, long, default_value = "summary.toml")]
    config: PathBuf,

    /// Output CSV path, `-` for stdout (overrides config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Primary log file name inside each job directory (overrides config)
    #[arg(long)]
    primary: Option<PathBuf>,

    /// Companion k-point file name inside each job directory (overrides config)
    #[arg(long)]
    companion: Option<PathBuf>,

    /// Job label to write instead of the directory name (single job only)
    #[arg(long)]
    job_type: Option<String>,

    /// Overwrite the output file instead of appending
    #[arg(long)]
    truncate: bool,

    /// Log failed jobs and keep going; exit non-zero at the end
    #[arg(long)]
    keep_going: bool,

    /// Report whether each job's relaxation converged instead of summarizing
    #[arg(long)]
    converged: bool,

    /// Print resolved settings and job list, don't run
    #[arg(long)]
    dry_run: bool,

    /// Extra logging (stage matches, file handling)
    #[arg(short, long)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            primary: self.primary.clone(),
            companion: self.companion.clone(),
            output: self.output.clone(),
            truncate: self.truncate,
        }
    }

    fn log_filter(&self) -> EnvFilter {
        if self.verbose {
            EnvFilter::new("debug")
        } else if self.quiet {
            EnvFilter::new("error")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(cli.log_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    tracing::debug!(?cli, "parsed CLI arguments");

    let result = run(&cli);
    if let Err(e) = &result {
        eprintln!("{}", diagnostic(e));
    }
    ExitCode::from(exit_status(&result))
}

/// 0 on a clean run, 1 on a fatal error or skipped jobs.
fn exit_status(result: &Result<bool, SummaryError>) -> u8 {
    match result {
        Ok(true) => 0,
        Ok(false) | Err(_) => 1,
    }
}

fn diagnostic(e: &SummaryError) -> String {
    format!("error: {e}")
}

/// Returns `Ok(false)` when `--keep-going` skipped failed jobs.
fn run(cli: &Cli) -> Result<bool, SummaryError> {
    let mut config = SummaryConfig::load(&cli.config)?;
    config.apply_overrides(&cli.overrides());

    let jobs: Vec<Job> =
        job::build_jobs(job::expand_job_dirs(&cli.job_dirs)?, cli.job_type.as_deref())?;

    if cli.dry_run {
        println!("outcar-summary v{}", env!("CARGO_PKG_VERSION"));
        println!("Config file: {}", cli.config.display());
        println!("Primary log: {}", config.inputs.primary.display());
        println!("Companion:   {}", config.inputs.companion.display());
        println!(
            "Output:      {} ({})",
            config.output.path.display(),
            if config.output.append { "append" } else { "truncate" }
        );
        for job in &jobs {
            println!("Job: {} ({})", job.label, job.dir.display());
        }
        println!("Dry run mode: config validated, not running.");
        return Ok(true);
    }

    let report = if cli.converged {
        runner::check_convergence(&config, &jobs, cli.keep_going, std::io::stdout().lock())?
    } else {
        let patterns = PatternSet::new()?;
        runner::summarize(&config, &jobs, &patterns, cli.keep_going)?
    };

    if !report.is_clean() {
        tracing::warn!(
            succeeded = report.succeeded,
            failed = report.failed,
            "some jobs failed"
        );
    }
    Ok(report.is_clean())
}
