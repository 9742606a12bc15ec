/// CSV output: one fixed header, one row per job.
use crate::error::SummaryError;
use crate::record::ExtractedRecord;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

pub const HEADER: [&str; 10] = [
    "JobType",
    "Atoms",
    "Energy",
    "Electrons",
    "Bands",
    "NKpoints",
    "Kx",
    "Ky",
    "Kz",
    "Drift",
];

/// Writes summary rows through a `csv::Writer`.
pub struct RecordEmitter<W: Write> {
    writer: csv::Writer<W>,
    header_pending: bool,
}

impl<W: Write> RecordEmitter<W> {
    /// `write_header` should be false when appending to a file that already
    /// has one.
    pub fn new(sink: W, write_header: bool) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(sink);
        Self {
            writer,
            header_pending: write_header,
        }
    }

    pub fn emit(&mut self, record: &ExtractedRecord) -> Result<(), SummaryError> {
        if self.header_pending {
            self.writer.write_record(HEADER)?;
            self.header_pending = false;
        }
        self.writer.write_record(row(record))?;
        Ok(())
    }

    /// Flush and return the sink.
    pub fn finish(self) -> Result<W, SummaryError> {
        self.writer
            .into_inner()
            .map_err(|e| SummaryError::Csv(e.into_error().into()))
    }
}

/// Serialize a record in header order.
pub fn row(record: &ExtractedRecord) -> [String; 10] {
    let seq = &record.sequence;
    let k = &record.kpoint;
    [
        record.job_label.clone(),
        seq.atoms.to_string(),
        fixed(seq.energy),
        seq.electrons.to_string(),
        seq.bands.to_string(),
        seq.kpoints.to_string(),
        fixed(k.kx),
        fixed(k.ky),
        fixed(k.kz),
        record.drift.map(fixed).unwrap_or_else(|| "0".to_string()),
    ]
}

fn fixed(value: f64) -> String {
    format!("{value:.6}")
}

/// Open (or create) the output file.
///
/// Returns the file and whether a header still has to be written: always
/// when truncating, otherwise only if the file is empty.
pub fn open_output(path: &Path, append: bool) -> Result<(File, bool), SummaryError> {
    let output_err = |source| SummaryError::Output {
        path: path.to_path_buf(),
        source,
    };
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)
        .map_err(output_err)?;
    let needs_header = !append || file.metadata().map_err(output_err)?.len() == 0;
    Ok((file, needs_header))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{KPoint, SequenceValues};
    use tempfile::tempdir;

    fn record(label: &str, drift: Option<f64>) -> ExtractedRecord {
        ExtractedRecord::new(
            label,
            SequenceValues {
                atoms: 12,
                energy: -123.456789,
                electrons: 200,
                bands: 400,
                kpoints: 8,
            },
            KPoint {
                kx: 0.0,
                ky: 0.0,
                kz: 0.0,
            },
        )
        .with_drift(drift)
    }

    fn render(records: &[ExtractedRecord], header: bool) -> String {
        let mut emitter = RecordEmitter::new(Vec::new(), header);
        for r in records {
            emitter.emit(r).unwrap();
        }
        String::from_utf8(emitter.finish().unwrap()).unwrap()
    }

    #[test]
    fn header_then_row() {
        let out = render(&[record("relax", Some(0.000012))], true);
        assert_eq!(
            out,
            "JobType,Atoms,Energy,Electrons,Bands,NKpoints,Kx,Ky,Kz,Drift\n\
             relax,12,-123.456789,200,400,8,0.000000,0.000000,0.000000,0.000012\n"
        );
    }

    #[test]
    fn absent_drift_is_zero() {
        let out = render(&[record("scf", None)], false);
        assert_eq!(out, "scf,12,-123.456789,200,400,8,0.000000,0.000000,0.000000,0\n");
    }

    #[test]
    fn header_written_once_for_many_rows() {
        let out = render(&[record("a", None), record("b", None)], true);
        assert_eq!(out.matches("JobType").count(), 1);
        assert_eq!(out.lines().count(), 3);
    }

    #[test]
    fn no_rows_means_no_header() {
        assert_eq!(render(&[], true), "");
    }

    #[test]
    fn label_with_delimiter_is_quoted() {
        let out = render(&[record("slab,111", None)], false);
        assert!(out.starts_with("\"slab,111\",12,"));
    }

    #[test]
    fn identical_input_renders_identically() {
        let a = render(&[record("relax", Some(-0.5))], true);
        let b = render(&[record("relax", Some(-0.5))], true);
        assert_eq!(a, b);
    }

    #[test]
    fn open_output_header_only_for_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.csv");

        let (file, needs_header) = open_output(&path, true).unwrap();
        assert!(needs_header);
        let mut emitter = RecordEmitter::new(file, needs_header);
        emitter.emit(&record("first", None)).unwrap();
        emitter.finish().unwrap();

        let (file, needs_header) = open_output(&path, true).unwrap();
        assert!(!needs_header);
        let mut emitter = RecordEmitter::new(file, needs_header);
        emitter.emit(&record("second", None)).unwrap();
        emitter.finish().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("JobType,"));
        assert!(lines[1].starts_with("first,"));
        assert!(lines[2].starts_with("second,"));
    }

    #[test]
    fn open_output_truncate_rewrites_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "old contents\n").unwrap();

        let (file, needs_header) = open_output(&path, false).unwrap();
        assert!(needs_header);
        let mut emitter = RecordEmitter::new(file, needs_header);
        emitter.emit(&record("fresh", None)).unwrap();
        emitter.finish().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("old contents"));
        assert!(contents.starts_with("JobType,"));
    }

    #[test]
    fn open_output_in_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no/such/dir/data.csv");
        assert!(matches!(
            open_output(&path, true),
            Err(SummaryError::Output { .. })
        ));
    }
}
