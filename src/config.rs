use crate::error::SummaryError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level configuration loaded from summary.toml.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SummaryConfig {
    pub inputs: InputsConfig,
    pub output: OutputConfig,
}

/// File names looked up inside each job directory.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct InputsConfig {
    pub primary: PathBuf,
    pub companion: PathBuf,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// CSV destination; `-` means stdout.
    pub path: PathBuf,
    /// Append to an existing file instead of truncating it.
    pub append: bool,
}

// --- Default implementations ---

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            primary: PathBuf::from("OUTCAR"),
            companion: PathBuf::from("KPOINTS"),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data.csv"),
            append: true,
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub primary: Option<PathBuf>,
    pub companion: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub truncate: bool,
}

impl SummaryConfig {
    /// Load config from `path`. A missing file yields the defaults; an
    /// unreadable or invalid one is an error.
    pub fn load(path: &Path) -> Result<Self, SummaryError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(SummaryError::Config {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            }
        };
        Self::parse(&contents).map_err(|reason| SummaryError::Config {
            path: path.to_path_buf(),
            reason,
        })
    }

    fn parse(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|e| e.to_string())
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(primary) = &overrides.primary {
            self.inputs.primary = primary.clone();
        }
        if let Some(companion) = &overrides.companion {
            self.inputs.companion = companion.clone();
        }
        if let Some(output) = &overrides.output {
            self.output.path = output.clone();
        }
        if overrides.truncate {
            self.output.append = false;
        }
    }

    /// True when rows go to stdout rather than a file.
    pub fn writes_stdout(&self) -> bool {
        self.output.path == Path::new("-")
    }
}
