/// Batch driver: run every job, then write the collected rows.
use crate::config::SummaryConfig;
use crate::converged;
use crate::emit::{open_output, RecordEmitter};
use crate::error::SummaryError;
use crate::job::{run_job, Job};
use crate::patterns::PatternSet;
use crate::record::ExtractedRecord;
use std::io::Write;
use tracing::{error, info};

/// Outcome of a batch run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub succeeded: usize,
    pub failed: usize,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Extract every job and write one row per success.
///
/// Without `keep_going` the first failure aborts the batch before the output
/// is opened, so nothing is written. With it, failures are logged and the
/// successful rows are still written.
pub fn summarize(
    config: &SummaryConfig,
    jobs: &[Job],
    patterns: &PatternSet,
    keep_going: bool,
) -> Result<RunReport, SummaryError> {
    let mut report = RunReport::default();
    let mut records: Vec<ExtractedRecord> = Vec::with_capacity(jobs.len());

    for job in jobs {
        match run_job(job, &config.inputs, patterns) {
            Ok(record) => {
                report.succeeded += 1;
                records.push(record);
            }
            Err(e) if keep_going => {
                report.failed += 1;
                error!(job = %job.label, stage = ?e.stage(), error = %e, "job failed, continuing");
            }
            Err(e) => return Err(e),
        }
    }

    if records.is_empty() {
        return Ok(report);
    }

    if config.writes_stdout() {
        let stdout = std::io::stdout();
        write_rows(stdout.lock(), true, &records)?;
    } else {
        let (file, needs_header) = open_output(&config.output.path, config.output.append)?;
        write_rows(file, needs_header, &records)?;
        info!(
            path = %config.output.path.display(),
            rows = records.len(),
            "summary written"
        );
    }
    Ok(report)
}

fn write_rows<W: Write>(
    sink: W,
    write_header: bool,
    records: &[ExtractedRecord],
) -> Result<(), SummaryError> {
    let mut emitter = RecordEmitter::new(sink, write_header);
    for record in records {
        emitter.emit(record)?;
    }
    emitter.finish()?;
    Ok(())
}

/// Print a convergence verdict per job to `out`.
pub fn check_convergence<W: Write>(
    config: &SummaryConfig,
    jobs: &[Job],
    keep_going: bool,
    mut out: W,
) -> Result<RunReport, SummaryError> {
    let mut report = RunReport::default();
    let stdout_err = |source| SummaryError::Output {
        path: "-".into(),
        source,
    };
    for job in jobs {
        match converged::check_job(job, &config.inputs) {
            Ok(done) => {
                report.succeeded += 1;
                writeln!(out, "{}", converged::verdict(job, done)).map_err(stdout_err)?;
            }
            Err(e) if keep_going => {
                report.failed += 1;
                error!(job = %job.label, error = %e, "convergence check failed, continuing");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(report)
}
