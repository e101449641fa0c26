use calamine::{open_workbook_auto, DataType, Reader};
use log::debug;
use snafu::prelude::*;

use crate::dashboard::io_common::{RawCell, RawTable};
use crate::dashboard::{DashResult, EmptyExcelSnafu, MissingWorksheetSnafu, OpeningExcelSnafu};

fn read_cell(cell: &DataType) -> RawCell {
    match cell {
        DataType::String(s) => RawCell::Text(s.clone()),
        DataType::Float(f) => RawCell::Number(*f),
        DataType::Int(i) => RawCell::Number(*i as f64),
        DataType::Bool(b) => RawCell::Bool(*b),
        DataType::DateTime(f) => RawCell::DateSerial(*f),
        // Error cells (#N/A, #REF!, ...) read as blanks.
        _ => RawCell::Empty,
    }
}

fn header_name(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Empty => "".to_string(),
        other => other.to_string(),
    }
}

/// Reads a worksheet of a spreadsheet (xlsx, xls, xlsb or ods).
///
/// Without a worksheet name, the first worksheet is used.
pub fn read_excel_table(path: &str, worksheet: Option<&str>) -> DashResult<RawTable> {
    debug!(
        "read_excel_table: path: {:?} worksheet: {:?}",
        path, worksheet
    );
    let mut workbook = open_workbook_auto(path).context(OpeningExcelSnafu { path })?;

    let wrange = match worksheet {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { path, name })?
            .context(OpeningExcelSnafu { path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?,
    };

    let mut iter = wrange.rows();
    let header = iter.next().context(EmptyExcelSnafu { path })?;
    let headers: Vec<String> = header.iter().map(header_name).collect();
    debug!("read_excel_table: header: {:?}", headers);

    let mut rows: Vec<Vec<RawCell>> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let cells: Vec<RawCell> = row.iter().map(read_cell).collect();
        debug!("read_excel_table: idx: {:?} row: {:?}", idx, &cells);
        rows.push(cells);
    }
    Ok(RawTable { headers, rows })
}
