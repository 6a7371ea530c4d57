//! Header and column extraction from uploaded CSV and XLSX data files.

use std::collections::BTreeSet;
use std::io::Cursor;

use calamine::{Data, Range, Reader, Xlsx, open_workbook_from_rs};
use fieldtrack_application::SpreadsheetAdapter;
use tracing::debug;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reads CSV files with the `csv` crate and XLSX workbooks with `calamine`.
///
/// Files ending in `.xlsx` are read as workbooks; everything else is treated
/// as UTF-8 CSV. Only the first worksheet of a workbook is considered.
#[derive(Debug, Clone, Copy, Default)]
pub struct TabularSpreadsheetAdapter;

impl TabularSpreadsheetAdapter {
    /// Creates an adapter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SpreadsheetAdapter for TabularSpreadsheetAdapter {
    fn headers(&self, file: &[u8], filename: &str) -> Vec<String> {
        let table = match read_table(file, filename) {
            Ok(table) => table,
            Err(reason) => {
                debug!(filename, reason = %reason, "data file headers unavailable");
                return Vec::new();
            }
        };

        table
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter()
            .filter(|header| !header.is_empty())
            .collect()
    }

    fn column_values(&self, file: &[u8], filename: &str, column: &str) -> BTreeSet<String> {
        let table = match read_table(file, filename) {
            Ok(table) => table,
            Err(reason) => {
                debug!(filename, reason = %reason, "data file column unavailable");
                return BTreeSet::new();
            }
        };

        let mut rows = table.into_iter();
        let Some(position) = rows
            .next()
            .and_then(|headers| headers.iter().position(|header| header == column.trim()))
        else {
            return BTreeSet::new();
        };

        rows.filter_map(|row| row.into_iter().nth(position))
            .filter(|value| !value.is_empty())
            .collect()
    }
}

/// Reads the whole file into trimmed string cells, header row first.
fn read_table(file: &[u8], filename: &str) -> Result<Vec<Vec<String>>, String> {
    if filename.to_lowercase().ends_with(".xlsx") {
        read_workbook(file)
    } else {
        read_csv(file)
    }
}

fn read_csv(file: &[u8]) -> Result<Vec<Vec<String>>, String> {
    let file = file.strip_prefix(UTF8_BOM).unwrap_or(file);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    reader
        .records()
        .map(|record| {
            record
                .map(|record| record.iter().map(|cell| cell.trim().to_owned()).collect())
                .map_err(|error| format!("invalid csv: {error}"))
        })
        .collect()
}

fn read_workbook(file: &[u8]) -> Result<Vec<Vec<String>>, String> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(file))
        .map_err(|error| format!("invalid xlsx workbook: {error}"))?;
    let range: Range<Data> = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| "xlsx workbook has no worksheets".to_owned())?
        .map_err(|error| format!("unreadable xlsx worksheet: {error}"))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string().trim().to_owned()).collect())
        .collect())
}
