// ********* Input data structures ***********

use chrono::NaiveDate;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;

/// The label used for a leader or a ticket type that is missing from a record.
pub const MISSING_LABEL: &str = "Sin dato";

/// The label of the "no filtering" choice in the selectors.
pub const ALL_LABEL: &str = "Todos";

/// The placeholder for the top category when there is nothing to count.
pub const NO_CATEGORY: &str = "-";

/// Display label of the derived category column.
pub const CATEGORY_LABEL: &str = "Categoria";

/// The columns of a registration file that the dashboard understands.
///
/// The order of the variants is the order of the columns in the detail table.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Field {
    FirstName,
    LastName,
    Leader,
    Phone,
    TicketType,
    PaymentDate,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::FirstName,
        Field::LastName,
        Field::Leader,
        Field::Phone,
        Field::TicketType,
        Field::PaymentDate,
    ];

    /// The header of this column in the registration spreadsheet, after trimming.
    pub fn default_header(&self) -> &'static str {
        match self {
            Field::FirstName => "Nombres",
            Field::LastName => "Apellidos",
            Field::Leader => "Líder directo:",
            Field::Phone => "Teléfono",
            Field::TicketType => "Entrada",
            Field::PaymentDate => "Fecha de pago",
        }
    }

    /// The (shorter) label shown in the detail table.
    pub fn display_label(&self) -> &'static str {
        match self {
            Field::FirstName => "Nombre",
            Field::LastName => "Apellido",
            Field::Leader => "Líder",
            Field::Phone => "Celular",
            Field::TicketType => "Tipo",
            Field::PaymentDate => "Fecha",
        }
    }
}

/// One paid attendee.
///
/// The category is derived from the ticket type when the record is created.
/// The fields are read-only outside this crate, so the two cannot drift apart:
///
/// ```compile_fail
/// use registration_stats::Registration;
///
/// let mut r = Registration::new(None, None, None, None, Some("VIP (Oferta)".to_string()), None);
/// r.ticket_type = Some("General".to_string());
/// ```
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Registration {
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) leader: Option<String>,
    pub(crate) phone: Option<String>,
    pub(crate) ticket_type: Option<String>,
    pub(crate) payment_date: Option<NaiveDate>,
    category: String,
}

impl Registration {
    pub fn new(
        first_name: Option<String>,
        last_name: Option<String>,
        leader: Option<String>,
        phone: Option<String>,
        ticket_type: Option<String>,
        payment_date: Option<NaiveDate>,
    ) -> Registration {
        let category = crate::categorize(ticket_type.as_deref().unwrap_or(MISSING_LABEL));
        Registration {
            first_name,
            last_name,
            leader,
            phone,
            ticket_type,
            payment_date,
            category,
        }
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn leader(&self) -> Option<&str> {
        self.leader.as_deref()
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn ticket_type(&self) -> Option<&str> {
        self.ticket_type.as_deref()
    }

    pub fn payment_date(&self) -> Option<NaiveDate> {
        self.payment_date
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// The leader as shown in selectors. Missing leaders share a placeholder.
    pub fn leader_label(&self) -> &str {
        self.leader.as_deref().unwrap_or(MISSING_LABEL)
    }

    /// The text of a column for the detail table.
    pub fn cell(&self, field: Field) -> String {
        let s = match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::Leader => &self.leader,
            Field::Phone => &self.phone,
            Field::TicketType => &self.ticket_type,
            Field::PaymentDate => {
                return self
                    .payment_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
            }
        };
        s.clone().unwrap_or_default()
    }
}

/// All the registrations read from one file, with the columns that were found in it.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Dataset {
    pub(crate) fields: Vec<Field>,
    pub(crate) records: Vec<Registration>,
}

impl Dataset {
    pub fn new(fields: &[Field], records: Vec<Registration>) -> Dataset {
        let mut fs: Vec<Field> = Vec::new();
        for f in fields {
            if !fs.contains(f) {
                fs.push(*f);
            }
        }
        Dataset {
            fields: fs,
            records,
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn has(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    pub fn records(&self) -> &[Registration] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The date range picked by the user.
///
/// The picker selects the start and the end in two steps, so a range with a
/// single date is a normal intermediate state. Only a complete range filters.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum DateRange {
    Unset,
    Partial(NaiveDate),
    Full(NaiveDate, NaiveDate),
}

impl DateRange {
    pub fn from_dates(dates: &[NaiveDate]) -> DateRange {
        match dates {
            [start, end] => DateRange::Full(*start, *end),
            [start] => DateRange::Partial(*start),
            _ => DateRange::Unset,
        }
    }
}

/// A selector value: everything, the records without a value, or one exact value.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Choice {
    All,
    /// The records where the column is empty, shown as `MISSING_LABEL`.
    Missing,
    Only(String),
}

impl Choice {
    /// Reads a selector value, treating `all_label` as the "everything" choice.
    ///
    /// `MISSING_LABEL` always selects the empty values.
    pub fn parse(s: &str, all_label: &str) -> Choice {
        if s == all_label {
            Choice::All
        } else if s == MISSING_LABEL {
            Choice::Missing
        } else {
            Choice::Only(s.to_string())
        }
    }

    pub fn label<'a>(&'a self, all_label: &'a str) -> &'a str {
        match self {
            Choice::All => all_label,
            Choice::Missing => MISSING_LABEL,
            Choice::Only(s) => s.as_str(),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FilterSelection {
    pub dates: DateRange,
    pub leader: Choice,
    pub category: Choice,
}

impl FilterSelection {
    pub const EVERYTHING: FilterSelection = FilterSelection {
        dates: DateRange::Unset,
        leader: Choice::All,
        category: Choice::All,
    };
}

impl Default for FilterSelection {
    fn default() -> Self {
        FilterSelection::EVERYTHING
    }
}

// ******** Output data structures *********

/// The four headline metrics of the dashboard.
#[derive(PartialEq, Debug, Clone)]
pub struct Summary {
    pub total: usize,
    pub distinct_leaders: usize,
    pub top_category: String,
    pub top_category_count: usize,
    /// Share of the whole dataset that passed the filters, in [0, 100].
    pub percentage: f64,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ChartRow {
    pub leader: String,
    pub label: String,
    pub total: u64,
    pub short_leader: String,
    pub color: String,
}

/// The counts behind the ranking chart.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ChartTable {
    /// One row per (leader, label) pair, sorted by leader then label.
    pub rows: Vec<ChartRow>,
    /// Total per leader, smallest first.
    pub ranking: Vec<(String, u64)>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// The values offered by the selectors.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Controls {
    pub leaders: Vec<String>,
    pub categories: Vec<String>,
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct DashboardView {
    pub summary: Summary,
    pub table: TableView,
    pub chart: Option<ChartTable>,
    pub warning: Option<String>,
    pub controls: Controls,
}

/// Errors raised when an aggregate cannot be computed from a dataset.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum StatsError {
    MissingColumn(Field),
}

impl Error for StatsError {}

impl Display for StatsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsError::MissingColumn(field) => {
                write!(f, "column {:?} is missing from the dataset", field)
            }
        }
    }
}

// ********* Configuration **********

/// The column used for the colored segments of the ranking chart.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum GroupBy {
    /// The derived category ("VIP" for "VIP (Oferta)").
    Category,
    /// The ticket type, as written in the file.
    TicketType,
}

/// How colors are picked for the chart labels.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ColorScheme {
    /// Colors are handed out in order of first appearance, cycling through the list.
    Palette(Vec<String>),
    /// Each label has its own color, with a fallback for the unknown ones.
    Fixed(HashMap<String, String>, String),
}

/// Plotly's qualitative "Prism" palette.
pub const PRISM: [&str; 11] = [
    "rgb(95, 70, 144)",
    "rgb(29, 105, 150)",
    "rgb(56, 166, 165)",
    "rgb(15, 133, 84)",
    "rgb(115, 175, 72)",
    "rgb(237, 173, 8)",
    "rgb(225, 124, 5)",
    "rgb(204, 80, 62)",
    "rgb(148, 52, 110)",
    "rgb(111, 64, 112)",
    "rgb(102, 102, 102)",
];

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DisplayOptions {
    /// Leader names longer than this many characters are shortened on the chart axis.
    pub truncate_length: usize,
    pub group_by: GroupBy,
    pub colors: ColorScheme,
    pub all_label: String,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        DisplayOptions {
            truncate_length: 20,
            group_by: GroupBy::Category,
            colors: ColorScheme::Palette(PRISM.iter().map(|s| s.to_string()).collect()),
            all_label: ALL_LABEL.to_string(),
        }
    }
}
