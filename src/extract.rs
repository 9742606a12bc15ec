/// Ordered scan for the five required OUTCAR quantities.
///
/// NIONS is searched for without bound. Each later stage gets exactly one
/// line, the one right after the previous match, and must match it. There is
/// no re-synchronization: a missing or reordered line aborts the job.
use crate::cursor::ScanCursor;
use crate::error::{SequenceBreak, SummaryError};
use crate::patterns::{PatternSet, Stage};
use crate::record::SequenceValues;
use std::io::BufRead;
use std::str::FromStr;
use tracing::{debug, trace};

/// State of the ordered scan.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanState {
    SeekingNions,
    HaveNions {
        atoms: u64,
    },
    HaveToten {
        atoms: u64,
        energy: f64,
    },
    HaveNelect {
        atoms: u64,
        energy: f64,
        electrons: i64,
    },
    HaveNbands {
        atoms: u64,
        energy: f64,
        electrons: i64,
        bands: u64,
    },
    /// Terminal success.
    HaveNkpts(SequenceValues),
    /// Terminal failure.
    Aborted { stage: Stage, cause: SequenceBreak },
}

impl ScanState {
    /// The stage whose matcher the next line is tried against, `None` once terminal.
    pub fn expecting(&self) -> Option<Stage> {
        match self {
            ScanState::SeekingNions => Some(Stage::Nions),
            ScanState::HaveNions { .. } => Some(Stage::Toten),
            ScanState::HaveToten { .. } => Some(Stage::Nelect),
            ScanState::HaveNelect { .. } => Some(Stage::Nbands),
            ScanState::HaveNbands { .. } => Some(Stage::Nkpts),
            ScanState::HaveNkpts(_) | ScanState::Aborted { .. } => None,
        }
    }

    /// Feed one line (`None` = end of stream) and return the next state.
    pub fn advance(self, line: Option<&str>, line_no: usize, patterns: &PatternSet) -> ScanState {
        let Some(stage) = self.expecting() else {
            return self;
        };
        let Some(line) = line else {
            return ScanState::Aborted {
                stage,
                cause: SequenceBreak::EndOfStream,
            };
        };
        let text = match patterns.captures(stage, line) {
            Some(text) => text,
            None if stage == Stage::Nions => return ScanState::SeekingNions,
            None => {
                return ScanState::Aborted {
                    stage,
                    cause: SequenceBreak::Mismatch { line: line_no },
                }
            }
        };
        trace!(stage = %stage, line = line_no, value = text, "stage matched");
        match self.accept(text) {
            Ok(next) => next,
            Err(cause) => ScanState::Aborted { stage, cause },
        }
    }

    fn accept(self, text: &str) -> Result<ScanState, SequenceBreak> {
        let next = match self {
            ScanState::SeekingNions => ScanState::HaveNions {
                atoms: parse(text)?,
            },
            ScanState::HaveNions { atoms } => ScanState::HaveToten {
                atoms,
                energy: parse(text)?,
            },
            ScanState::HaveToten { atoms, energy } => ScanState::HaveNelect {
                atoms,
                energy,
                electrons: parse(text)?,
            },
            ScanState::HaveNelect {
                atoms,
                energy,
                electrons,
            } => ScanState::HaveNbands {
                atoms,
                energy,
                electrons,
                bands: parse(text)?,
            },
            ScanState::HaveNbands {
                atoms,
                energy,
                electrons,
                bands,
            } => ScanState::HaveNkpts(SequenceValues {
                atoms,
                energy,
                electrons,
                bands,
                kpoints: parse(text)?,
            }),
            terminal @ (ScanState::HaveNkpts(_) | ScanState::Aborted { .. }) => terminal,
        };
        Ok(next)
    }
}

fn parse<T: FromStr>(text: &str) -> Result<T, SequenceBreak> {
    text.parse().map_err(|_| SequenceBreak::BadNumber {
        text: text.to_string(),
    })
}

/// Run the ordered scan and hand the cursor back, positioned just after the
/// NKPTS line, for the trailing scan.
pub fn extract<R: BufRead>(
    mut cursor: ScanCursor<R>,
    patterns: &PatternSet,
) -> Result<(SequenceValues, ScanCursor<R>), SummaryError> {
    let mut state = ScanState::SeekingNions;
    loop {
        match state {
            ScanState::HaveNkpts(values) => {
                debug!(
                    path = %cursor.path().display(),
                    line = cursor.line_no(),
                    atoms = values.atoms,
                    kpoints = values.kpoints,
                    "ordered scan complete"
                );
                return Ok((values, cursor));
            }
            ScanState::Aborted { stage, cause } => {
                return Err(SummaryError::SequenceBroken {
                    path: cursor.path().to_path_buf(),
                    stage,
                    cause,
                });
            }
            _ => {}
        }
        let line_no = cursor.line_no() + 1;
        let line = cursor.next_line()?;
        state = state.advance(line, line_no, patterns);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const BLOCK: &str = "\
NIONS    64    12
TOTEN  = -123.456789 eV  -123.456789
NELECT =  200
NBANDS =  400 NKPTS
NKPTS  =   8
";

    fn run(text: &str) -> Result<(SequenceValues, ScanCursor<Cursor<String>>), SummaryError> {
        let patterns = PatternSet::new().unwrap();
        extract(ScanCursor::new(Cursor::new(text.to_string()), "OUTCAR"), &patterns)
    }

    fn broken(text: &str) -> (Stage, SequenceBreak) {
        match run(text) {
            Err(SummaryError::SequenceBroken { stage, cause, .. }) => (stage, cause),
            Err(other) => panic!("unexpected error: {other}"),
            Ok((values, _)) => panic!("unexpected success: {values:?}"),
        }
    }

    #[test]
    fn well_formed_block_yields_all_five() {
        let (values, _) = run(BLOCK).unwrap();
        assert_eq!(
            values,
            SequenceValues {
                atoms: 12,
                energy: -123.456789,
                electrons: 200,
                bands: 400,
                kpoints: 8,
            }
        );
    }

    #[test]
    fn preamble_before_nions_is_skipped() {
        let text = format!("vasp.6.3.0\n running on 4 nodes\n\n{BLOCK}");
        let (values, cursor) = run(&text).unwrap();
        assert_eq!(values.atoms, 12);
        assert_eq!(cursor.line_no(), 8);
    }

    #[test]
    fn cursor_resumes_after_nkpts() {
        let text = format!("{BLOCK}after\n");
        let (_, mut cursor) = run(&text).unwrap();
        assert_eq!(cursor.next_line().unwrap(), Some("after"));
    }

    #[test]
    fn first_occurrence_wins() {
        let second = BLOCK.replace("NIONS    64    12", "NIONS    64    99");
        let (values, _) = run(&format!("{BLOCK}{second}")).unwrap();
        assert_eq!(values.atoms, 12);
    }

    #[test]
    fn missing_nions_is_end_of_stream() {
        assert_eq!(
            broken("nothing useful\nhere\n"),
            (Stage::Nions, SequenceBreak::EndOfStream)
        );
    }

    #[test]
    fn empty_log_fails_at_nions() {
        assert_eq!(broken(""), (Stage::Nions, SequenceBreak::EndOfStream));
    }

    #[test]
    fn swapped_toten_and_nelect_fails_at_toten() {
        let text = "\
NIONS    64    12
NELECT =  200
TOTEN  = -123.456789 eV  -123.456789
NBANDS =  400 NKPTS
NKPTS  =   8
";
        assert_eq!(
            broken(text),
            (Stage::Toten, SequenceBreak::Mismatch { line: 2 })
        );
    }

    #[test]
    fn gap_line_is_not_skipped() {
        let text = BLOCK.replace("NELECT =  200\n", "\nNELECT =  200\n");
        assert_eq!(
            broken(&text),
            (Stage::Nelect, SequenceBreak::Mismatch { line: 3 })
        );
    }

    #[test]
    fn missing_nbands_fails_at_nbands() {
        let text = BLOCK.replace("NBANDS =  400 NKPTS\n", "");
        assert_eq!(
            broken(&text),
            (Stage::Nbands, SequenceBreak::Mismatch { line: 4 })
        );
    }

    #[test]
    fn truncated_log_fails_at_next_stage() {
        let text = "NIONS    64    12\nTOTEN  = -1.0 eV  -2.0\nNELECT =  200\n";
        assert_eq!(broken(text), (Stage::Nbands, SequenceBreak::EndOfStream));
    }

    #[test]
    fn truncated_before_nkpts() {
        let text = BLOCK.replace("NKPTS  =   8\n", "");
        assert_eq!(broken(&text), (Stage::Nkpts, SequenceBreak::EndOfStream));
    }

    #[test]
    fn overflowing_count_is_bad_number() {
        let text = BLOCK.replace("NIONS    64    12", "NIONS    64    99999999999999999999999");
        assert_eq!(
            broken(&text),
            (
                Stage::Nions,
                SequenceBreak::BadNumber {
                    text: "99999999999999999999999".to_string()
                }
            )
        );
    }

    #[test]
    fn negative_electron_count_is_accepted() {
        let text = BLOCK.replace("NELECT =  200", "NELECT =  -4");
        let (values, _) = run(&text).unwrap();
        assert_eq!(values.electrons, -4);
    }

    #[test]
    fn terminal_states_ignore_further_lines() {
        let patterns = PatternSet::new().unwrap();
        let aborted = ScanState::Aborted {
            stage: Stage::Toten,
            cause: SequenceBreak::EndOfStream,
        };
        assert_eq!(aborted.expecting(), None);
        let next = aborted
            .clone()
            .advance(Some("NIONS    64    12"), 9, &patterns);
        assert_eq!(next, aborted);
    }

    #[test]
    fn seeking_state_stays_put_on_unrelated_line() {
        let patterns = PatternSet::new().unwrap();
        let next = ScanState::SeekingNions.advance(Some("POTCAR: PAW_PBE Si"), 1, &patterns);
        assert_eq!(next, ScanState::SeekingNions);
    }
}
