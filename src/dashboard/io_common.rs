use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use log::{debug, info};
use registration_stats::builder::DatasetBuilder;
use registration_stats::{Dataset, Field, Registration};

use std::collections::HashMap;
use std::path::Path;

use crate::dashboard::config_reader::ColumnNames;

/// The text formats tried, in order, for the payment dates.
pub const DEFAULT_DATE_FORMATS: [&str; 7] = [
    "%Y-%m-%d",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%d/%m/%Y %H:%M:%S",
    "%m/%d/%Y",
    "%d-%m-%Y",
];

/// A cell, as read by the CSV or the spreadsheet reader.
#[derive(PartialEq, Debug, Clone)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// A spreadsheet date, as a number of days since 1899-12-30.
    DateSerial(f64),
}

/// The header and the rows of a file, before the columns are interpreted.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    // Beyond 9999-12-31 in the spreadsheet calendar.
    if !(1.0..2958466.0).contains(&serial) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(serial.floor() as i64))
}

fn parse_text_date(s: &str, formats: &[String]) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in formats {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Reads a payment date. Anything that does not look like a date gives `None`.
pub fn parse_date(cell: &RawCell, formats: &[String]) -> Option<NaiveDate> {
    match cell {
        RawCell::DateSerial(f) | RawCell::Number(f) => serial_to_date(*f),
        RawCell::Text(s) => parse_text_date(s, formats),
        RawCell::Empty | RawCell::Bool(_) => None,
    }
}

/// The text of a cell. Whole numbers lose their decimal part, so that phone
/// numbers stored as numbers read as they were typed.
pub fn cell_text(cell: &RawCell) -> Option<String> {
    match cell {
        RawCell::Empty => None,
        RawCell::Text(s) if s.is_empty() => None,
        RawCell::Text(s) => Some(s.clone()),
        RawCell::Number(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", *f as i64)),
        RawCell::Number(f) => Some(f.to_string()),
        RawCell::Bool(b) => Some(b.to_string()),
        RawCell::DateSerial(f) => match serial_to_date(*f) {
            Some(d) => Some(d.format("%Y-%m-%d").to_string()),
            None => Some(f.to_string()),
        },
    }
}

/// Finds the recognized columns in the header. The names are compared without
/// their surrounding spaces, and the first matching column wins.
pub fn find_columns(headers: &[String], columns: &ColumnNames) -> Vec<(Field, usize)> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    for (idx, h) in headers.iter().enumerate() {
        positions.entry(h.trim().to_string()).or_insert(idx);
    }
    debug!("find_columns: header positions: {:?}", positions);

    let mut res: Vec<(Field, usize)> = Field::ALL
        .iter()
        .filter_map(|f| positions.get(&columns.header(*f)).map(|idx| (*f, *idx)))
        .collect();
    res.sort_by_key(|(_, idx)| *idx);
    res
}

/// Turns a raw table into registrations.
pub fn to_dataset(table: &RawTable, columns: &ColumnNames, date_formats: &[String]) -> Dataset {
    let found = find_columns(&table.headers, columns);
    let fields: Vec<Field> = found.iter().map(|(f, _)| *f).collect();
    let col_of: HashMap<Field, usize> = found.iter().cloned().collect();

    let mut builder = DatasetBuilder::new(&fields);
    let mut unreadable_dates: usize = 0;
    for (idx, row) in table.rows.iter().enumerate() {
        let cell = |f: Field| col_of.get(&f).and_then(|c| row.get(*c));
        let text = |f: Field| cell(f).and_then(cell_text);

        let payment_date = match cell(Field::PaymentDate) {
            Some(c) => {
                let d = parse_date(c, date_formats);
                if d.is_none() && *c != RawCell::Empty {
                    debug!("to_dataset: row {}: unreadable date {:?}", idx + 2, c);
                    unreadable_dates += 1;
                }
                d
            }
            None => None,
        };

        builder.add(Registration::new(
            text(Field::FirstName),
            text(Field::LastName),
            text(Field::Leader),
            text(Field::Phone),
            text(Field::TicketType),
            payment_date,
        ));
    }
    if unreadable_dates > 0 {
        info!(
            "to_dataset: {} payment dates could not be read and were left empty",
            unreadable_dates
        );
    }
    builder.build()
}

#[cfg(test)]
pub(crate) fn write_temp_file(name: &str, contents: &str) -> String {
    let p = std::env::temp_dir().join(format!("antorcha-{}-{}", std::process::id(), name));
    std::fs::write(&p, contents).unwrap();
    p.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formats() -> Vec<String> {
        DEFAULT_DATE_FORMATS.iter().map(|s| s.to_string()).collect()
    }

    fn day(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn dates_from_text_and_serials() {
        let f = formats();
        let text = |s: &str| parse_date(&RawCell::Text(s.to_string()), &f);
        assert_eq!(text("2025-01-10"), day(2025, 1, 10));
        assert_eq!(text(" 2025-01-10 14:30:00 "), day(2025, 1, 10));
        assert_eq!(text("10/01/2025"), day(2025, 1, 10));
        assert_eq!(text("2025-01-10T08:00:00-05:00"), day(2025, 1, 10));
        assert_eq!(text("pendiente"), None);
        assert_eq!(text(""), None);
        assert_eq!(parse_date(&RawCell::DateSerial(45667.0), &f), day(2025, 1, 10));
        assert_eq!(parse_date(&RawCell::Number(45667.75), &f), day(2025, 1, 10));
        assert_eq!(parse_date(&RawCell::Number(-3.0), &f), None);
    }

    #[test]
    fn month_first_files_need_their_format() {
        let ambiguous = RawCell::Text("10/01/2025".to_string());
        assert_eq!(parse_date(&ambiguous, &formats()), day(2025, 1, 10));
        let month_first = vec!["%m/%d/%Y".to_string()];
        assert_eq!(parse_date(&ambiguous, &month_first), day(2025, 10, 1));
    }

    #[test]
    fn numbers_read_as_typed() {
        assert_eq!(cell_text(&RawCell::Number(987654321.0)), Some("987654321".to_string()));
        assert_eq!(cell_text(&RawCell::Number(2.5)), Some("2.5".to_string()));
        assert_eq!(cell_text(&RawCell::Text("".to_string())), None);
        assert_eq!(cell_text(&RawCell::Empty), None);
    }

    #[test]
    fn headers_are_trimmed_before_matching() {
        let table = RawTable {
            headers: vec![
                " Nombres ".to_string(),
                "Otro".to_string(),
                "Entrada  ".to_string(),
                "Fecha de pago".to_string(),
            ],
            rows: vec![
                vec![
                    RawCell::Text("Ana".to_string()),
                    RawCell::Text("x".to_string()),
                    RawCell::Text("VIP (Oferta)".to_string()),
                    RawCell::Text("no es fecha".to_string()),
                ],
                vec![RawCell::Text("Luis".to_string())],
            ],
        };
        let ds = to_dataset(&table, &ColumnNames::default(), &formats());
        assert_eq!(
            ds.fields(),
            &[Field::FirstName, Field::TicketType, Field::PaymentDate]
        );
        assert!(!ds.has(Field::Leader));
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[0].category(), "VIP");
        assert_eq!(ds.records()[0].payment_date(), None);
        assert_eq!(ds.records()[1].ticket_type(), None);
    }
}
