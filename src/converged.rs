/// Convergence check: did the relaxation reach its force criterion?
use crate::config::InputsConfig;
use crate::cursor::ScanCursor;
use crate::error::SummaryError;
use crate::job::{open_input, Job};
use std::io::BufRead;

/// Printed by VASP once the ionic relaxation has converged.
pub const CONVERGED_MARKER: &str = "reached required accuracy";

/// Scan until the marker is found or the log ends.
pub fn is_converged<R: BufRead>(mut cursor: ScanCursor<R>) -> Result<bool, SummaryError> {
    while let Some(line) = cursor.next_line()? {
        if line.contains(CONVERGED_MARKER) {
            return Ok(true);
        }
    }
    Ok(false)
}

pub fn check_job(job: &Job, inputs: &InputsConfig) -> Result<bool, SummaryError> {
    let converged = is_converged(open_input(&job.primary_path(inputs))?)?;
    tracing::debug!(job = %job.label, converged, "convergence checked");
    Ok(converged)
}

/// Human-readable verdict line for one job.
pub fn verdict(job: &Job, converged: bool) -> String {
    let status = if converged {
        "Converged"
    } else {
        "Convergence not reached"
    };
    format!("{}: {status}", job.label)
}
