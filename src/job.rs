/// One job directory: open its inputs and run the extraction stages in order.
use crate::companion;
use crate::config::InputsConfig;
use crate::cursor::ScanCursor;
use crate::error::SummaryError;
use crate::extract;
use crate::patterns::PatternSet;
use crate::record::ExtractedRecord;
use crate::trailing;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// A job directory and the label its row is written under.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub dir: PathBuf,
    pub label: String,
}

impl Job {
    /// `label` overrides the name derived from the directory.
    pub fn new(dir: impl Into<PathBuf>, label: Option<&str>) -> Self {
        let dir = dir.into();
        let label = match label {
            Some(l) => l.to_string(),
            None => job_label(&dir),
        };
        Self { dir, label }
    }

    pub fn primary_path(&self, inputs: &InputsConfig) -> PathBuf {
        self.dir.join(&inputs.primary)
    }

    pub fn companion_path(&self, inputs: &InputsConfig) -> PathBuf {
        self.dir.join(&inputs.companion)
    }
}

/// Final component of the job directory.
///
/// For `.` the shell's `PWD` is preferred (it keeps symlinked names), then
/// the canonical current directory.
pub fn job_label(dir: &Path) -> String {
    let named = |p: &Path| p.file_name().map(|n| n.to_string_lossy().into_owned());
    if dir == Path::new(".") {
        if let Some(name) = std::env::var_os("PWD").and_then(|pwd| named(Path::new(&pwd))) {
            return name;
        }
    }
    named(dir)
        .or_else(|| dir.canonicalize().ok().and_then(|p| named(&p)))
        .unwrap_or_else(|| dir.display().to_string())
}

pub(crate) fn open_input(path: &Path) -> Result<ScanCursor<BufReader<File>>, SummaryError> {
    let file = File::open(path).map_err(|source| SummaryError::MissingInput {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ScanCursor::new(BufReader::new(file), path))
}

/// Extract one record from a job directory.
///
/// Both inputs are opened up front so a missing file is reported before any
/// scanning; each is closed when its cursor is dropped, on every path.
pub fn run_job(
    job: &Job,
    inputs: &InputsConfig,
    patterns: &PatternSet,
) -> Result<ExtractedRecord, SummaryError> {
    let primary = open_input(&job.primary_path(inputs))?;
    let companion = open_input(&job.companion_path(inputs))?;

    let (sequence, primary) = extract::extract(primary, patterns)?;
    let kpoint = companion::lookup(companion)?;
    let drift = trailing::scan(primary, patterns)?;
    if drift.is_none() {
        tracing::debug!(job = %job.label, "drift absent, writing 0");
    }

    Ok(ExtractedRecord::new(job.label.clone(), sequence, kpoint).with_drift(drift))
}

/// Turn expanded directories into jobs.
///
/// An explicit label names one job only; giving it for several directories
/// would write the same label on every row, so that is rejected.
pub fn build_jobs(dirs: Vec<PathBuf>, label: Option<&str>) -> Result<Vec<Job>, SummaryError> {
    if label.is_some() && dirs.len() > 1 {
        return Err(SummaryError::LabelForBatch { count: dirs.len() });
    }
    Ok(dirs.into_iter().map(|dir| Job::new(dir, label)).collect())
}

/// Expand job arguments into directories.
///
/// Arguments containing glob metacharacters are expanded (directories only,
/// in sorted order) and must match at least one; plain paths are kept as-is.
pub fn expand_job_dirs(args: &[String]) -> Result<Vec<PathBuf>, SummaryError> {
    if args.is_empty() {
        return Ok(vec![PathBuf::from(".")]);
    }
    let mut dirs = Vec::new();
    for arg in args {
        if !arg.contains(['*', '?', '[']) {
            dirs.push(PathBuf::from(arg));
            continue;
        }
        let paths = glob::glob(arg).map_err(|e| SummaryError::JobPattern {
            pattern: arg.clone(),
            reason: e.to_string(),
        })?;
        let before = dirs.len();
        for entry in paths {
            match entry {
                Ok(path) if path.is_dir() => dirs.push(path),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "skipping unreadable glob entry"),
            }
        }
        if dirs.len() == before {
            return Err(SummaryError::JobPattern {
                pattern: arg.clone(),
                reason: "matched no directories".to_string(),
            });
        }
    }
    Ok(dirs)
}
