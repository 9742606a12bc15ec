/// Line matchers for the quantities pulled out of an OUTCAR.
///
/// The log interleaves housekeeping numbers with the value of interest on the
/// same line, so each matcher targets one specific numeric position rather
/// than "the first number on the line".
use regex::Regex;

/// One named extraction step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Nions,
    Toten,
    Nelect,
    Nbands,
    Nkpts,
    Drift,
}

impl Stage {
    /// The five required stages, in the order they must appear in the log.
    #[cfg(test)]
    pub const SEQUENCE: [Stage; 5] = [
        Stage::Nions,
        Stage::Toten,
        Stage::Nelect,
        Stage::Nbands,
        Stage::Nkpts,
    ];

    /// Label as it appears in the log.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Nions => "NIONS",
            Stage::Toten => "TOTEN",
            Stage::Nelect => "NELECT",
            Stage::Nbands => "NBANDS",
            Stage::Nkpts => "NKPTS",
            Stage::Drift => "drift",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single-line matcher bound to one stage.
#[derive(Debug)]
pub struct FieldMatcher {
    stage: Stage,
    regex: Regex,
    capture: usize,
}

impl FieldMatcher {
    fn new(stage: Stage, pattern: &str, capture: usize) -> Result<Self, regex::Error> {
        Ok(Self {
            stage,
            regex: Regex::new(pattern)?,
            capture,
        })
    }

    #[cfg(test)]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The captured numeric substring, or `None` if the line doesn't match.
    pub fn captures<'l>(&self, line: &'l str) -> Option<&'l str> {
        self.regex
            .captures(line)
            .and_then(|caps| caps.get(self.capture))
            .map(|m| m.as_str())
    }
}

/// The fixed set of matchers, one per [`Stage`].
///
/// Built once at startup and shared by reference with every job.
#[derive(Debug)]
pub struct PatternSet {
    matchers: Vec<FieldMatcher>,
}

impl PatternSet {
    pub fn new() -> Result<Self, regex::Error> {
        let matchers = vec![
            // "NIONS <related count> <ions>": skip the first integer
            FieldMatcher::new(Stage::Nions, r"NIONS\s+\d+\s+(\d+)", 1)?,
            // "TOTEN = <energy> eV <free energy>": second numeric token
            FieldMatcher::new(
                Stage::Toten,
                r"TOTEN\s+=\s+-?\d+\.\d+\s+eV\s+(-?\d+\.\d+)",
                1,
            )?,
            FieldMatcher::new(Stage::Nelect, r"NELECT\s+=\s+(-?\d+)", 1)?,
            FieldMatcher::new(Stage::Nbands, r"NBANDS\s+=\s+(\d+)\s+NKPTS", 1)?,
            FieldMatcher::new(Stage::Nkpts, r"NKPTS\s+=\s+(\d+)", 1)?,
            // three components follow; only the first is kept
            FieldMatcher::new(
                Stage::Drift,
                r"drift\s+=\s+(-?\d+\.\d+)\s+(-?\d+\.\d+)\s+(-?\d+\.\d+)",
                1,
            )?,
        ];
        Ok(Self { matchers })
    }

    pub fn matcher(&self, stage: Stage) -> &FieldMatcher {
        // matchers are stored in Stage declaration order
        let matcher = &self.matchers[stage as usize];
        debug_assert_eq!(matcher.stage, stage);
        matcher
    }

    /// Match `line` against the matcher for `stage`.
    pub fn captures<'l>(&self, stage: Stage, line: &'l str) -> Option<&'l str> {
        self.matcher(stage).captures(line)
    }
}
