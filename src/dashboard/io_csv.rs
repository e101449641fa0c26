// Primitives for reading CSV files.

use log::debug;
use snafu::prelude::*;

use crate::dashboard::io_common::{RawCell, RawTable};
use crate::dashboard::{CsvLineParseSnafu, CsvOpenSnafu, DashResult, EmptyCsvSnafu};

pub fn read_csv_table(path: &str) -> DashResult<RawTable> {
    // Rows may be shorter or longer than the header.
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut records = rdr.records();

    let header = records
        .next()
        .context(EmptyCsvSnafu { path })?
        .context(CsvLineParseSnafu { lineno: 1usize })?;
    let headers: Vec<String> = header
        .iter()
        .map(|s| s.trim_start_matches('\u{feff}').to_string())
        .collect();
    debug!("read_csv_table: header: {:?}", headers);

    let mut rows: Vec<Vec<RawCell>> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        let cells: Vec<RawCell> = line
            .iter()
            .map(|s| {
                if s.is_empty() {
                    RawCell::Empty
                } else {
                    RawCell::Text(s.to_string())
                }
            })
            .collect();
        debug!("read_csv_table: lineno: {:?} row: {:?}", lineno, &cells);
        rows.push(cells);
    }
    Ok(RawTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::io_common::write_temp_file;
    use crate::dashboard::DashboardError;

    #[test]
    fn reads_header_and_ragged_rows() {
        let path = write_temp_file(
            "ragged.csv",
            "\u{feff}Nombres,Entrada\nAna,\"VIP (Oferta, 2x1)\"\nLuis\n",
        );
        let table = read_csv_table(&path).unwrap();
        assert_eq!(table.headers, vec!["Nombres", "Entrada"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(
            table.rows[0][1],
            RawCell::Text("VIP (Oferta, 2x1)".to_string())
        );
        assert_eq!(table.rows[1], vec![RawCell::Text("Luis".to_string())]);
    }

    #[test]
    fn empty_file_is_an_error() {
        let path = write_temp_file("empty.csv", "");
        assert!(matches!(
            read_csv_table(&path),
            Err(DashboardError::EmptyCsv { .. })
        ));
    }
}
