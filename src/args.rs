use clap::Parser;

/// Registration monitor: summary metrics, detail table and leader ranking from a payment spreadsheet.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, default 'PAGO DE ANTORCHA 2026.xlsx') The registration file. Files ending in
    /// .csv are read as comma-separated values, all the others as spreadsheets.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (file path, optional) A JSON configuration file: column names, date formats, display options.
    /// Flags given on the command line take precedence over it.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the dashboard will be written in JSON format
    /// to the given location instead of the text report.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing a dashboard in JSON format. If provided, the
    /// computed dashboard must match it.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (YYYY-MM-DD) Start of the payment date range. Without --to, no date filtering happens.
    #[clap(long, value_parser)]
    pub from: Option<String>,

    /// (YYYY-MM-DD) End of the payment date range, included.
    #[clap(long, value_parser)]
    pub to: Option<String>,

    /// (default Todos) Only the registrations of this leader.
    #[clap(long, value_parser)]
    pub leader: Option<String>,

    /// (default Todos) Only the registrations of this ticket category.
    #[clap(long, value_parser)]
    pub category: Option<String>,

    /// (default 20) Leader names longer than this are shortened in the ranking.
    #[clap(long, value_parser)]
    pub truncate: Option<usize>,

    /// (category or ticketType, default category) The column used to split the ranking bars.
    #[clap(long, value_parser)]
    pub group_by: Option<String>,

    /// (default: the first worksheet) When using a spreadsheet, the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// Reads filter commands from the standard input and prints the dashboard after each one.
    #[clap(long, takes_value = false)]
    pub interactive: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
