use log::debug;
use registration_stats::{ColorScheme, Field, GroupBy, PRISM};
use snafu::prelude::*;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;

use crate::dashboard::{DashResult, InvalidGroupBySnafu, OpeningJsonSnafu, ParsingJsonSnafu};

/// The headers of the recognized columns, when they differ from the usual ones.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnNames {
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    #[serde(rename = "leader")]
    pub leader: Option<String>,
    #[serde(rename = "phone")]
    pub phone: Option<String>,
    #[serde(rename = "ticketType")]
    pub ticket_type: Option<String>,
    #[serde(rename = "paymentDate")]
    pub payment_date: Option<String>,
}

impl ColumnNames {
    pub fn header(&self, field: Field) -> String {
        let custom = match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::Leader => &self.leader,
            Field::Phone => &self.phone,
            Field::TicketType => &self.ticket_type,
            Field::PaymentDate => &self.payment_date,
        };
        custom
            .as_ref()
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| field.default_header().to_string())
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputSettings {
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    #[serde(rename = "dateFormats")]
    pub date_formats: Option<Vec<String>>,
    pub columns: Option<ColumnNames>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColorSettings {
    pub palette: Option<Vec<String>>,
    pub fixed: Option<HashMap<String, String>>,
    pub fallback: Option<String>,
}

impl ColorSettings {
    /// A fixed mapping wins over a palette when both are given.
    pub fn color_scheme(&self) -> ColorScheme {
        match (&self.fixed, &self.palette) {
            (Some(map), _) => ColorScheme::Fixed(
                map.clone(),
                self.fallback
                    .clone()
                    .unwrap_or_else(|| PRISM[PRISM.len() - 1].to_string()),
            ),
            (None, Some(palette)) if !palette.is_empty() => ColorScheme::Palette(palette.clone()),
            _ => ColorScheme::Palette(PRISM.iter().map(|s| s.to_string()).collect()),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplaySettings {
    pub title: Option<String>,
    #[serde(rename = "truncateLength")]
    pub truncate_length: Option<usize>,
    #[serde(rename = "groupBy")]
    pub group_by: Option<String>,
    #[serde(rename = "allLabel")]
    pub all_label: Option<String>,
    pub colors: Option<ColorSettings>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub input: Option<InputSettings>,
    pub display: Option<DisplaySettings>,
}

pub fn read_config(path: &str) -> DashResult<DashboardConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read_config: {:?}", contents);
    let config: DashboardConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn parse_group_by(s: &str) -> DashResult<GroupBy> {
    match s {
        "category" => Ok(GroupBy::Category),
        "ticketType" | "ticket-type" => Ok(GroupBy::TicketType),
        x => InvalidGroupBySnafu { value: x }.fail(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_parses() {
        let js = r#"{"display": {"truncateLength": 25, "colors": {"fixed": {"VIP": "gold"}}}}"#;
        let config: DashboardConfig = serde_json::from_str(js).unwrap();
        assert_eq!(config.input, None);
        let display = config.display.unwrap();
        assert_eq!(display.truncate_length, Some(25));
        match display.colors.unwrap().color_scheme() {
            ColorScheme::Fixed(map, fallback) => {
                assert_eq!(map["VIP"], "gold");
                assert_eq!(fallback, "rgb(102, 102, 102)");
            }
            other => panic!("unexpected scheme {:?}", other),
        }
    }

    #[test]
    fn custom_headers_replace_defaults() {
        let js = r#"{"leader": " Líder ", "ticketType": "Tipo de entrada"}"#;
        let cols: ColumnNames = serde_json::from_str(js).unwrap();
        assert_eq!(cols.header(Field::Leader), "Líder");
        assert_eq!(cols.header(Field::TicketType), "Tipo de entrada");
        assert_eq!(cols.header(Field::PaymentDate), "Fecha de pago");
    }

    #[test]
    fn group_by_names() {
        assert_eq!(parse_group_by("category").unwrap(), GroupBy::Category);
        assert_eq!(parse_group_by("ticket-type").unwrap(), GroupBy::TicketType);
        assert!(parse_group_by("Entrada").is_err());
    }
}
