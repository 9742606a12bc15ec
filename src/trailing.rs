use crate::cursor::ScanCursor;
use crate::error::SummaryError;
use crate::patterns::{PatternSet, Stage};
use std::io::BufRead;

/// Search the rest of the log for the first drift line.
///
/// Returns the first drift component, or `None` if the log ends first. A
/// truncated log (an unfinished run) is not an error. I/O failures still are.
pub fn scan<R: BufRead>(
    mut cursor: ScanCursor<R>,
    patterns: &PatternSet,
) -> Result<Option<f64>, SummaryError> {
    loop {
        let line_no = cursor.line_no() + 1;
        let Some(line) = cursor.next_line()? else {
            break;
        };
        let Some(text) = patterns.captures(Stage::Drift, line) else {
            continue;
        };
        match text.parse::<f64>() {
            Ok(drift) => {
                tracing::debug!(line = line_no, drift, "drift found");
                return Ok(Some(drift));
            }
            Err(e) => {
                tracing::warn!(line = line_no, text, error = %e, "unparsable drift, still searching");
            }
        }
    }
    tracing::debug!(path = %cursor.path().display(), "no drift line before end of log");
    Ok(None)
}
