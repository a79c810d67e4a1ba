//! Plain text export of collected towers.
//!
//! The text format is one numbered line per tower, in first-seen order:
//! `1. MCC: 310, MNC: 260, LAC: 1000, CID: 5000`

use std::{
    fmt::Write as _,
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::{error::ExportError, model::CellTower};

/// Renders towers as export text. Performs no I/O.
pub fn serialize(towers: &[CellTower]) -> String {
    let mut out = String::new();
    for (i, tower) in towers.iter().enumerate() {
        // writing into a String cannot fail
        let _ = writeln!(
            out,
            "{}. MCC: {}, MNC: {}, LAC: {}, CID: {}",
            i + 1,
            tower.mcc,
            tower.mnc,
            tower.area_code,
            tower.cell_id
        );
    }
    out
}

/// Hands the export text to an already opened sink.
pub fn write_to(sink: &mut impl Write, towers: &[CellTower]) -> Result<(), ExportError> {
    sink.write_all(serialize(towers).as_bytes())?;
    sink.flush()?;
    Ok(())
}

pub fn file_name(at: DateTime<Utc>) -> String {
    format!("cell_tower_data_{}.txt", at.timestamp_millis())
}

/// Writes the export into a newly created file inside `dir`.
pub fn save(dir: &Path, towers: &[CellTower], at: DateTime<Utc>) -> Result<PathBuf, ExportError> {
    let path = dir.join(file_name(at));
    let mut file = fs::create_dir_all(dir)
        .and_then(|_| OpenOptions::new().write(true).create_new(true).open(&path))
        .map_err(|source| ExportError::SinkUnavailable {
            path: path.clone(),
            source,
        })?;
    write_to(&mut file, towers)?;

    info!(path = %path.display(), towers = towers.len(), "cell tower data saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn single_line() {
        let towers = [CellTower::new(310, 260, 1000, 5000)];
        assert_eq!(
            serialize(&towers),
            "1. MCC: 310, MNC: 260, LAC: 1000, CID: 5000\n"
        );
    }

    #[test]
    fn multiple_lines() {
        let towers = [
            CellTower::new(310, 260, 1000, 5000),
            CellTower::new(262, 1, 2000, 6000),
        ];
        assert_eq!(
            serialize(&towers),
            "1. MCC: 310, MNC: 260, LAC: 1000, CID: 5000\n\
             2. MCC: 262, MNC: 1, LAC: 2000, CID: 6000\n"
        );
    }

    #[test]
    fn empty() {
        assert_eq!(serialize(&[]), "");
    }

    #[test]
    fn name() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(file_name(at), "cell_tower_data_1700000000123.txt");
    }

    #[test]
    fn save_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("Documents");
        let towers = [CellTower::new(310, 260, 1000, 5000)];
        let at = Utc.timestamp_millis_opt(42).unwrap();

        let path = save(&docs, &towers, at).unwrap();
        assert_eq!(path, docs.join("cell_tower_data_42.txt"));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "1. MCC: 310, MNC: 260, LAC: 1000, CID: 5000\n"
        );

        // never overwrites an earlier export
        let err = save(&docs, &towers, at).unwrap_err();
        assert!(matches!(err, ExportError::SinkUnavailable { .. }));
    }
}
