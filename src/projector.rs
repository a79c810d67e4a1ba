use std::{
    io::{self, Write},
    sync::{Mutex, PoisonError},
};

use tracing::warn;

use crate::{model::CellTower, session::SessionObserver, status::Status};

const HEADER: [&str; 5] = ["#", "MCC", "MNC", "LAC", "CID"];

/// Renders the collected towers as a plain text table.
///
/// Every snapshot redraws the whole table, statuses are printed on their own
/// line.
pub struct TableProjector<W> {
    out: Mutex<W>,
}

impl<W: Write> TableProjector<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
            warn!("failed to render cell tower table: {e}");
        }
    }
}

/// Formats the table rows for `towers`, header included.
pub fn render(towers: &[CellTower]) -> String {
    let rows: Vec<[String; 5]> = towers
        .iter()
        .enumerate()
        .map(|(i, x)| {
            [
                (i + 1).to_string(),
                x.mcc.to_string(),
                x.mnc.to_string(),
                x.area_code.to_string(),
                x.cell_id.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADER.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    let header = HEADER.map(String::from);
    for row in std::iter::once(&header).chain(&rows) {
        let line: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:>width$}"))
            .collect();
        out.push_str(&line.join("  "));
        out.push('\n');
    }
    out
}

impl<W: Write + Send> SessionObserver for TableProjector<W> {
    fn snapshot_changed(&self, towers: &[CellTower]) {
        self.write(&render(towers));
    }

    fn status(&self, status: Status) {
        self.write(&format!("{}\n", status.as_ref()));
    }
}

impl TableProjector<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}
