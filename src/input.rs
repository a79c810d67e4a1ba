//! Recorded batch files.

use std::io::{self, BufRead, Read};

use clap::ValueEnum;
use serde::Deserialize;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    sync::mpsc,
};
use tracing::warn;

use crate::{error::InputError, model::RawCellRecord, source::Batch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// One JSON array of records per line
    #[default]
    #[value(name = "jsonl")]
    JsonLines,
    /// Header `batch,radio,mcc,mnc,area,cell`, rows grouped by batch
    Csv,
}

pub fn read(reader: impl BufRead, format: Format) -> Result<Vec<Batch>, InputError> {
    match format {
        Format::JsonLines => read_json_lines(reader),
        Format::Csv => read_csv(reader),
    }
}

pub fn read_json_lines(reader: impl BufRead) -> Result<Vec<Batch>, InputError> {
    let mut batches = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        if let Some(batch) = parse_json_line(&line?, i + 1)? {
            batches.push(batch);
        }
    }
    Ok(batches)
}

/// Parses one line of a JSON lines recording. Blank lines carry no batch.
pub fn parse_json_line(line: &str, number: usize) -> Result<Option<Batch>, InputError> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line)
        .map(Some)
        .map_err(|source| InputError::Json {
            line: number,
            source,
        })
}

/// Sends each batch of a JSON lines stream as soon as its line arrives.
///
/// Malformed lines are logged and skipped. Stops early if the receiver is
/// gone and returns the number of batches sent.
pub async fn forward_json_lines(
    reader: impl AsyncBufRead + Unpin,
    tx: mpsc::Sender<Batch>,
) -> io::Result<usize> {
    let mut lines = reader.lines();
    let mut number = 0;
    let mut sent = 0;
    while let Some(line) = lines.next_line().await? {
        number += 1;
        let batch = match parse_json_line(&line, number) {
            Ok(Some(batch)) => batch,
            Ok(None) => continue,
            Err(e) => {
                warn!("skipping malformed batch on line {number}: {e}");
                continue;
            }
        };
        if tx.send(batch).await.is_err() {
            break;
        }
        sent += 1;
    }
    Ok(sent)
}

#[derive(Debug, Deserialize)]
struct CsvRecord {
    batch: u64,
    radio: String,
    mcc: Option<String>,
    mnc: Option<String>,
    area: u32,
    cell: u64,
}

impl From<CsvRecord> for RawCellRecord {
    fn from(x: CsvRecord) -> Self {
        match x.radio.to_ascii_lowercase().as_str() {
            "lte" => RawCellRecord::Lte {
                mcc: x.mcc,
                mnc: x.mnc,
                tac: x.area,
                ci: x.cell,
            },
            "gsm" => RawCellRecord::Gsm {
                mcc: x.mcc,
                mnc: x.mnc,
                lac: x.area,
                cid: x.cell,
            },
            _ => RawCellRecord::Other,
        }
    }
}

pub fn read_csv(reader: impl Read) -> Result<Vec<Batch>, InputError> {
    let mut reader = csv::Reader::from_reader(reader);

    let mut batches: Vec<Batch> = Vec::new();
    let mut current = None;
    for result in reader.deserialize() {
        let record: CsvRecord = result?;
        if current != Some(record.batch) {
            current = Some(record.batch);
            batches.push(Vec::new());
        }
        if let Some(batch) = batches.last_mut() {
            batch.push(record.into());
        }
    }
    Ok(batches)
}
