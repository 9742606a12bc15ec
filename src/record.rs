/// The five quantities the ordered scan must find, all or nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceValues {
    pub atoms: u64,
    pub energy: f64,
    pub electrons: i64,
    pub bands: u64,
    pub kpoints: u64,
}

/// First k-point triple from the companion file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KPoint {
    pub kx: f64,
    pub ky: f64,
    pub kz: f64,
}

/// One summary row.
///
/// Only constructed once the ordered scan and the companion lookup have both
/// succeeded; `drift` is filled in afterwards if the trailing scan finds it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRecord {
    pub job_label: String,
    pub sequence: SequenceValues,
    pub kpoint: KPoint,
    pub drift: Option<f64>,
}

impl ExtractedRecord {
    pub fn new(job_label: impl Into<String>, sequence: SequenceValues, kpoint: KPoint) -> Self {
        Self {
            job_label: job_label.into(),
            sequence,
            kpoint,
            drift: None,
        }
    }

    pub fn with_drift(mut self, drift: Option<f64>) -> Self {
        // never retract a value already recorded
        if drift.is_some() {
            self.drift = drift;
        }
        self
    }
}
