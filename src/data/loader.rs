// ============================================================
// Layer 4 — Event Table Loader
// ============================================================
// Reads a pre-parsed MIDI note table from disk.
//
// Two formats are accepted, picked by file extension:
//
//   .csv   header row with at least `pitch,start,end`
//          (extra columns such as velocity are ignored)
//
//   .json  array of objects: [{"pitch":60,"start":0.0,"end":0.5}, ...]
//
// Every row is checked before it reaches the framer:
//   - start and end must be finite
//   - end must not precede start
//
// Errors name the offending event as "row N", counting data
// rows from 1 (the CSV header is not a row).
//
// Reference: csv crate documentation (serde deserialisation)
//            Rust Book §9 (Error Handling)

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{fs, path::{Path, PathBuf}};

use crate::domain::error::MelodyError;
use crate::domain::note::{EventTable, NoteEvent};
use crate::domain::traits::EventSource;

/// One raw row; only the three columns the framer reads.
#[derive(Debug, Deserialize)]
struct EventRow {
    pitch: u8,
    start: f64,
    end:   f64,
}

/// Loads a note table from a .csv or .json file.
/// Implements the EventSource trait from Layer 3.
pub struct EventTableLoader {
    path: PathBuf,
}

impl EventTableLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl EventSource for EventTableLoader {
    fn load_table(&self) -> Result<EventTable> {
        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let rows = match ext.as_deref() {
            Some("csv")  => read_csv(&self.path)?,
            Some("json") => read_json(&self.path)?,
            _ => bail!(
                "Unsupported event table '{}': expected a .csv or .json file",
                self.path.display()
            ),
        };

        let table = into_table(rows)?;
        tracing::info!("Loaded {} note events from '{}'", table.len(), self.path.display());
        Ok(table)
    }
}

fn read_csv(path: &Path) -> Result<Vec<EventRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Cannot open '{}'", path.display()))?;

    reader
        .deserialize::<EventRow>()
        .enumerate()
        .map(|(i, row)| {
            row.with_context(|| format!("Bad CSV row {} in '{}'", i + 1, path.display()))
        })
        .collect()
}

fn read_json(path: &Path) -> Result<Vec<EventRow>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Bad JSON event table '{}'", path.display()))
}

fn into_table(rows: Vec<EventRow>) -> Result<EventTable, MelodyError> {
    rows.into_iter()
        .enumerate()
        .map(|(i, r)| {
            let row = i + 1;
            if !r.start.is_finite() || !r.end.is_finite() {
                return Err(MelodyError::Table(format!("row {row}: non-finite time")));
            }
            if r.end < r.start {
                return Err(MelodyError::Table(format!(
                    "row {row}: end {} precedes start {}",
                    r.end, r.start
                )));
            }
            Ok(NoteEvent::new(r.pitch, r.start, r.end))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(EventTable::new)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_loads_csv_and_ignores_extra_columns() {
        let dir  = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "notes.csv",
            "pitch,start,end,velocity\n60,0.0,0.5,90\n64,0.25,1.0,70\n",
        );
        let table = EventTableLoader::new(path).load_table().unwrap();
        assert_eq!(
            table.events(),
            &[NoteEvent::new(60, 0.0, 0.5), NoteEvent::new(64, 0.25, 1.0)]
        );
    }

    #[test]
    fn test_loads_json() {
        let dir  = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "notes.json",
            r#"[{"pitch":67,"start":1.0,"end":1.5,"channel":0}]"#,
        );
        let table = EventTableLoader::new(path).load_table().unwrap();
        assert_eq!(table.events(), &[NoteEvent::new(67, 1.0, 1.5)]);
    }

    #[test]
    fn test_rejects_end_before_start() {
        let dir  = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "bad.csv", "pitch,start,end\n60,1.0,0.5\n");
        let err  = EventTableLoader::new(path).load_table().unwrap_err();
        assert!(matches!(err.downcast_ref::<MelodyError>(), Some(MelodyError::Table(_))));
    }

    #[test]
    fn test_errors_count_data_rows_from_one() {
        let dir = tempfile::tempdir().unwrap();

        let path = write_file(&dir, "reversed.csv", "pitch,start,end
60,0.0,0.5
62,1.0,0.5
");
        let err  = EventTableLoader::new(path).load_table().unwrap_err();
        assert!(err.to_string().contains("row 2:"), "{err}");

        let path = write_file(&dir, "garbled.csv", "pitch,start,end
60,0.0,0.5
62,soon,0.5
");
        let err  = EventTableLoader::new(path).load_table().unwrap_err();
        assert!(err.to_string().starts_with("Bad CSV row 2 "), "{err}");
    }

    #[test]
    fn test_rejects_unknown_extension() {
        let dir  = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "notes.mid", "");
        assert!(EventTableLoader::new(path).load_table().is_err());
    }

    #[test]
    fn test_rejects_pitch_above_u8() {
        let dir  = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "bad.csv", "pitch,start,end\n300,0.0,0.5\n");
        assert!(EventTableLoader::new(path).load_table().is_err());
    }
}
