//! CSV export of the loaded table page.
//!
//! Only the rows currently held by the panel are written, never the full
//! server-side result set. Headers are the column labels; every value is
//! quoted and rows end in CRLF, so the file opens cleanly in spreadsheet tools.

use crate::error::{ChaospadError, Result};
use crate::model::{Column, Pad};
use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub contents: String,
    /// Data rows, header excluded.
    pub rows: usize,
}

impl CsvExport {
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }
        let path = dir.join(&self.filename);
        fs::write(&path, &self.contents)?;
        Ok(path)
    }
}

/// `pads_YYYY-MM-DD.csv`
pub fn export_filename(date: NaiveDate) -> String {
    format!("pads_{}.csv", date.format("%Y-%m-%d"))
}

pub fn export_csv(columns: &[Column], items: &[Pad], date: NaiveDate) -> Result<CsvExport> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(columns.iter().map(|c| c.label))?;
    for pad in items {
        writer.write_record(columns.iter().map(|c| pad.field_value(c.field)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ChaospadError::Io(e.into_error()))?;
    let contents = String::from_utf8(bytes)
        .map_err(|e| ChaospadError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))?;

    Ok(CsvExport {
        filename: export_filename(date),
        contents,
        rows: items.len(),
    })
}
