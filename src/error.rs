use crate::patterns::Stage;
use std::path::PathBuf;

/// Why one of the ordered stages failed to produce its value.
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceBreak {
    /// The log ended before the stage's line was read.
    EndOfStream,
    /// The single line the stage was allowed to inspect did not match.
    Mismatch { line: usize },
    /// The captured token could not be parsed as a number.
    BadNumber { text: String },
}

impl std::fmt::Display for SequenceBreak {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceBreak::EndOfStream => write!(f, "log ended before the line was found"),
            SequenceBreak::Mismatch { line } => write!(f, "line {line} does not match"),
            SequenceBreak::BadNumber { text } => write!(f, "captured value {text:?} is not a number"),
        }
    }
}

/// Why the companion (KPOINTS) lookup failed.
#[derive(Debug, Clone, PartialEq)]
pub enum CompanionFault {
    /// Fewer than four lines; `lines` is how many were read.
    TooShort { lines: usize },
    /// Line four has fewer than three tokens.
    MissingField { index: usize },
    /// A token on line four is not a float.
    BadNumber { index: usize, text: String },
}

impl std::fmt::Display for CompanionFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompanionFault::TooShort { lines } => {
                write!(f, "expected at least 4 lines, found {lines}")
            }
            CompanionFault::MissingField { index } => {
                write!(f, "line 4 has no field {}", index + 1)
            }
            CompanionFault::BadNumber { index, text } => {
                write!(f, "line 4 field {} ({text:?}) is not a number", index + 1)
            }
        }
    }
}

/// Every fatal condition a summary run can hit.
#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("cannot open {}: {source}", path.display())]
    MissingInput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{stage} stage failed in {}: {cause}", path.display())]
    SequenceBroken {
        path: PathBuf,
        stage: Stage,
        cause: SequenceBreak,
    },

    #[error("malformed companion file {}: {cause}", path.display())]
    CompanionMalformed { path: PathBuf, cause: CompanionFault },

    #[error("cannot write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("csv output error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid config {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    #[error("invalid field pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("--job-type names a single job, but {count} job directories were given")]
    LabelForBatch { count: usize },

    #[error("bad job pattern {pattern:?}: {reason}")]
    JobPattern { pattern: String, reason: String },
}

impl SummaryError {
    /// The stage that broke, when this is a sequence failure.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            SummaryError::SequenceBroken { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
