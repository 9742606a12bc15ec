/// Positional lookup into the KPOINTS companion file.
///
/// Three header lines are skipped unconditionally and the first three
/// whitespace-separated tokens of line four are read as the k-point triple.
///
/// NOTE: the k-point count from the OUTCAR is not consulted here. The lookup
/// always reads the single fixed triple, however many k-points the run used.
use crate::cursor::ScanCursor;
use crate::error::{CompanionFault, SummaryError};
use crate::record::KPoint;
use std::io::BufRead;

/// Header lines preceding the triple.
pub const HEADER_LINES: usize = 3;

pub fn lookup<R: BufRead>(mut cursor: ScanCursor<R>) -> Result<KPoint, SummaryError> {
    let path = cursor.path().to_path_buf();
    let malformed = |cause| SummaryError::CompanionMalformed {
        path: path.clone(),
        cause,
    };

    for _ in 0..HEADER_LINES {
        if cursor.next_line()?.is_none() {
            return Err(malformed(CompanionFault::TooShort {
                lines: cursor.line_no(),
            }));
        }
    }
    let Some(line) = cursor.next_line()? else {
        return Err(malformed(CompanionFault::TooShort {
            lines: HEADER_LINES,
        }));
    };

    let mut fields = [0.0f64; 3];
    let mut tokens = line.split_whitespace();
    for (index, slot) in fields.iter_mut().enumerate() {
        let token = tokens
            .next()
            .ok_or_else(|| malformed(CompanionFault::MissingField { index }))?;
        *slot = token.parse().map_err(|_| {
            malformed(CompanionFault::BadNumber {
                index,
                text: token.to_string(),
            })
        })?;
    }

    let [kx, ky, kz] = fields;
    tracing::debug!(path = %path.display(), kx, ky, kz, "companion triple read");
    Ok(KPoint { kx, ky, kz })
}
