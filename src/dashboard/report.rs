// Plain text rendering of the dashboard, for terminals.

use registration_stats::{ChartTable, DashboardView, TableView};

use std::collections::BTreeMap;
use std::io::{self, Write};

const BAR_WIDTH: u64 = 30;

fn pad(s: &str, width: usize) -> String {
    let n = s.chars().count();
    format!("{}{}", s, " ".repeat(width.saturating_sub(n)))
}

fn write_table<W: Write>(out: &mut W, table: &TableView) -> io::Result<()> {
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in table.rows.iter() {
        for (idx, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(idx) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }
    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(c, w)| pad(c, *w))
            .collect::<Vec<String>>()
            .join(" | ")
    };
    writeln!(out, "{}", line(table.headers.as_slice()).trim_end())?;
    let total_width: usize = widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1);
    writeln!(out, "{}", "-".repeat(total_width))?;
    for row in table.rows.iter() {
        writeln!(out, "{}", line(row.as_slice()).trim_end())?;
    }
    Ok(())
}

fn write_ranking<W: Write>(out: &mut W, chart: &ChartTable) -> io::Result<()> {
    let mut short_names: BTreeMap<&str, &str> = BTreeMap::new();
    let mut breakdown: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for r in chart.rows.iter() {
        short_names.insert(&r.leader, &r.short_leader);
        breakdown
            .entry(&r.leader)
            .or_default()
            .push(format!("{}: {}", r.label, r.total));
    }
    let name_width = short_names.values().map(|s| s.chars().count()).max().unwrap_or(0);
    let max_total = chart.ranking.iter().map(|(_, t)| *t).max().unwrap_or(0);

    // Largest first, as a bottom-up horizontal bar chart reads.
    for (leader, total) in chart.ranking.iter().rev() {
        let bar_len = if max_total > 0 {
            ((total * BAR_WIDTH + max_total - 1) / max_total) as usize
        } else {
            0
        };
        let short = short_names.get(leader.as_str()).copied().unwrap_or(leader);
        let parts = breakdown
            .get(leader.as_str())
            .map(|v| v.join(", "))
            .unwrap_or_default();
        writeln!(
            out,
            "{} {} {} ({})",
            pad(short, name_width),
            "#".repeat(bar_len),
            total,
            parts
        )?;
    }
    Ok(())
}

/// Writes the metrics, the detail table and the ranking.
pub fn write_report<W: Write>(out: &mut W, title: &str, view: &DashboardView) -> io::Result<()> {
    let s = &view.summary;
    writeln!(out, "== {} ==", title)?;
    writeln!(out, "Monitor ejecutivo de control de entradas.")?;
    writeln!(
        out,
        "Inscritos: {} | Líderes: {} | Top Categoria: {} | Avance: {:.1}%",
        s.total, s.distinct_leaders, s.top_category, s.percentage
    )?;
    writeln!(out)?;
    writeln!(out, "Detalle de Operaciones")?;
    match &view.warning {
        Some(w) => writeln!(out, "{}", w)?,
        None => write_table(out, &view.table)?,
    }
    if let Some(chart) = &view.chart {
        writeln!(out)?;
        writeln!(out, "Ranking")?;
        write_ranking(out, chart)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use registration_stats::builder::DatasetBuilder;
    use registration_stats::*;

    fn report_for(selection: &FilterSelection) -> String {
        let mut builder = DatasetBuilder::new(&Field::ALL);
        builder.add_simple("Ana", "Equipo Esperanza Juvenil Norte", "VIP (Oferta)", None);
        builder.add_simple("Luis", "Lider2", "General", None);
        builder.add_simple("Eva", "Lider2", "VIP (Oferta)", None);
        let view = render(&builder.build(), selection, &DisplayOptions::default());
        let mut buf: Vec<u8> = Vec::new();
        write_report(&mut buf, "PRUEBA", &view).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn report_lists_metrics_and_ranking() {
        let text = report_for(&FilterSelection::EVERYTHING);
        assert!(text.contains("Inscritos: 3 | Líderes: 2 | Top Categoria: VIP | Avance: 100.0%"));
        assert!(text.contains("Nombre | Apellido | Líder"));
        let ranking = text.split("Ranking\n").nth(1).unwrap();
        let lines: Vec<&str> = ranking.lines().collect();
        assert!(lines[0].starts_with("Lider2"));
        assert!(lines[0].contains("General: 1, VIP: 1"));
        assert!(lines[1].starts_with("Equipo Esperanza Juv..."));
    }

    #[test]
    fn empty_report_shows_warning() {
        let sel = FilterSelection {
            leader: Choice::Only("Nadie".to_string()),
            ..FilterSelection::EVERYTHING
        };
        let text = report_for(&sel);
        assert!(text.contains("Sin datos para mostrar."));
        assert!(text.contains("Avance: 0.0%"));
        assert!(!text.contains("Ranking"));
    }
}
