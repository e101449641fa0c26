use log::{debug, warn};

use crate::config::*;
use crate::{chart_table, controls, filter, summarize};

/// Message shown instead of the detail table when nothing matches the filters.
pub const EMPTY_WARNING: &str = "Sin datos para mostrar.";

fn table_view(filtered: &Dataset) -> TableView {
    let fields: Vec<Field> = Field::ALL
        .iter()
        .filter(|f| filtered.has(**f))
        .cloned()
        .collect();
    let mut headers: Vec<String> = fields.iter().map(|f| f.display_label().to_string()).collect();
    if filtered.has(Field::TicketType) {
        headers.push(CATEGORY_LABEL.to_string());
    }

    let rows = filtered
        .records()
        .iter()
        .map(|r| {
            let mut cells: Vec<String> = fields.iter().map(|f| r.cell(*f)).collect();
            if filtered.has(Field::TicketType) {
                cells.push(r.category().to_string());
            }
            cells
        })
        .collect();
    TableView { headers, rows }
}

/// Computes everything the dashboard shows for one filter selection.
///
/// This is a pure function of its inputs: the host calls it again after every
/// change of the selection.
///
/// ```
/// use registration_stats::builder::DatasetBuilder;
/// use registration_stats::*;
///
/// let mut builder = DatasetBuilder::new(&Field::ALL);
/// builder.add_simple("Ana", "Lider1", "VIP (Oferta)", None);
/// builder.add_simple("Eva", "Lider2", "General", None);
/// let dataset = builder.build();
///
/// let view = render(&dataset, &FilterSelection::EVERYTHING, &DisplayOptions::default());
/// assert_eq!(view.summary.total, 2);
/// assert!(view.chart.is_some());
/// ```
pub fn render(
    dataset: &Dataset,
    selection: &FilterSelection,
    options: &DisplayOptions,
) -> DashboardView {
    let filtered = filter(dataset, selection);
    let summary = summarize(dataset, &filtered);
    debug!("render: summary {:?}", summary);

    // The ranking only makes sense when comparing leaders.
    let chart = if selection.leader == Choice::All && !filtered.is_empty() {
        match chart_table(&filtered, options) {
            Ok(c) => Some(c),
            Err(e) => {
                warn!("render: leaving the chart out: {}", e);
                None
            }
        }
    } else {
        None
    };

    let warning = if filtered.is_empty() {
        Some(EMPTY_WARNING.to_string())
    } else {
        None
    };

    DashboardView {
        summary,
        table: table_view(&filtered),
        chart,
        warning,
        controls: controls(dataset, &options.all_label),
    }
}
