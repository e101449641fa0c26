// The interactive session: one command per line, the dashboard is printed
// again after every change of the selection.

use log::{debug, info, warn};
use registration_stats::{render, seed_dates, Choice, DateRange, FilterSelection};
use snafu::prelude::*;

use std::io::{BufRead, Write};

use crate::dashboard::cache::DatasetCache;
use crate::dashboard::report::write_report;
use crate::dashboard::{
    open_dataset, parse_cli_date, DashResult, DashboardError, ReadingInputSnafu, Settings,
    UnknownCommandSnafu, WritingOutputSnafu,
};

const HELP: &str = "commands: leader <name|Todos>, category <name|Todos>, dates [start [end]], refresh, show, help, quit";

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Command {
    Leader(Choice),
    Category(Choice),
    Dates(DateRange),
    Refresh,
    Show,
    Help,
    Quit,
}

pub fn parse_command(line: &str, all_label: &str) -> DashResult<Command> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((h, r)) => (h, r.trim()),
        None => (line, ""),
    };
    match head {
        "leader" if !rest.is_empty() => Ok(Command::Leader(Choice::parse(rest, all_label))),
        "category" if !rest.is_empty() => Ok(Command::Category(Choice::parse(rest, all_label))),
        "dates" => {
            let mut dates = Vec::new();
            for d in rest.split_whitespace() {
                dates.push(parse_cli_date(d)?);
            }
            ensure!(dates.len() <= 2, UnknownCommandSnafu { line });
            Ok(Command::Dates(DateRange::from_dates(&dates)))
        }
        "refresh" => Ok(Command::Refresh),
        "show" => Ok(Command::Show),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        _ => UnknownCommandSnafu { line }.fail(),
    }
}

const STDOUT: &str = "stdout";

fn draw<W: Write>(
    settings: &Settings,
    cache: &mut DatasetCache,
    selection: &FilterSelection,
    out: &mut W,
) -> DashResult<()> {
    match open_dataset(cache, &settings.input) {
        Ok(dataset) => {
            let selection = seed_dates(selection, &dataset);
            let view = render(&dataset, &selection, &settings.display);
            write_report(out, &settings.title, &view).context(WritingOutputSnafu { path: STDOUT })
        }
        // A file that disappears during the session ends it.
        Err(e @ DashboardError::MissingSource { .. }) => Err(e),
        Err(e) => {
            warn!("draw: {:?}", e);
            writeln!(out, "{}", e).context(WritingOutputSnafu { path: STDOUT })
        }
    }
}

/// Runs the session until `quit` or the end of the input.
///
/// The dataset comes from the cache, so it is only read again after `refresh`.
pub fn run_session<R: BufRead, W: Write>(
    settings: &Settings,
    cache: &mut DatasetCache,
    input: R,
    mut out: W,
) -> DashResult<()> {
    let mut selection: FilterSelection = settings.selection.clone();
    let all_label = settings.display.all_label.as_str();

    draw(settings, cache, &selection, &mut out)?;
    for line_r in input.lines() {
        let line = line_r.context(ReadingInputSnafu {})?;
        if line.trim().is_empty() {
            continue;
        }
        debug!("run_session: command {:?}", line);
        match parse_command(&line, all_label) {
            Ok(Command::Leader(c)) => selection.leader = c,
            Ok(Command::Category(c)) => selection.category = c,
            Ok(Command::Dates(d)) => selection.dates = d,
            Ok(Command::Refresh) => cache.invalidate(),
            Ok(Command::Show) => {}
            Ok(Command::Help) => {
                writeln!(out, "{}", HELP).context(WritingOutputSnafu { path: STDOUT })?;
                continue;
            }
            Ok(Command::Quit) => {
                info!("run_session: quit");
                return Ok(());
            }
            Err(e @ DashboardError::InvalidDate { .. })
            | Err(e @ DashboardError::UnknownCommand { .. }) => {
                writeln!(out, "{}", e).context(WritingOutputSnafu { path: STDOUT })?;
                writeln!(out, "{}", HELP).context(WritingOutputSnafu { path: STDOUT })?;
                continue;
            }
            Err(e) => return Err(e),
        }
        draw(settings, cache, &selection, &mut out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Args;
    use crate::dashboard::build_settings;
    use crate::dashboard::io_common::write_temp_file;
    use clap::Parser;
    use chrono::NaiveDate;

    const SAMPLE: &str = "Nombres,Líder directo:,Entrada,Fecha de pago\n\
        Ana,Lider1,VIP (Oferta),2025-01-10\n\
        Luis,Lider1,General,2025-01-12\n\
        Eva,Lider2,VIP (Oferta),2025-02-01\n";

    fn settings_for(name: &str, contents: &str) -> Settings {
        let path = write_temp_file(name, contents);
        build_settings(&Args::parse_from(vec!["antorcha", "-i", path.as_str()])).unwrap()
    }

    fn run(settings: &Settings, cache: &mut DatasetCache, commands: &str) -> String {
        let mut buf: Vec<u8> = Vec::new();
        run_session(settings, cache, commands.as_bytes(), &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn commands_parse() {
        assert_eq!(
            parse_command("leader Equipo Norte", "Todos").unwrap(),
            Command::Leader(Choice::Only("Equipo Norte".to_string()))
        );
        assert_eq!(
            parse_command("category Todos", "Todos").unwrap(),
            Command::Category(Choice::All)
        );
        assert_eq!(
            parse_command("dates 2025-01-01", "Todos").unwrap(),
            Command::Dates(DateRange::Partial(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()))
        );
        assert_eq!(parse_command("dates", "Todos").unwrap(), Command::Dates(DateRange::Unset));
        assert!(parse_command("dates ayer", "Todos").is_err());
        assert!(parse_command("leader", "Todos").is_err());
        assert!(parse_command("bailar", "Todos").is_err());
    }

    #[test]
    fn each_change_renders_again() {
        let settings = settings_for("session.csv", SAMPLE);
        let mut cache = DatasetCache::new();
        let text = run(
            &settings,
            &mut cache,
            "leader Lider1\ndates 2025-01-11 2025-01-31\nquit\n",
        );
        assert_eq!(text.matches("== ANTORCHA 2026 ==").count(), 3);
        assert!(text.contains("Inscritos: 3 |"));
        assert!(text.contains("Inscritos: 2 | Líderes: 1"));
        assert!(text.contains("Inscritos: 1 | Líderes: 1 | Top Categoria: General"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn refresh_reads_the_file_again() {
        let settings = settings_for("refresh.csv", SAMPLE);
        let mut cache = DatasetCache::new();
        let more = format!("{}Rosa,Lider2,General,2025-02-02\n", SAMPLE);

        let mut buf: Vec<u8> = Vec::new();
        let input = "show\nrefresh\nquit\n".as_bytes();
        // The file changes after the first read: only the refresh sees it.
        open_dataset(&mut cache, &settings.input).unwrap();
        std::fs::write(&settings.input.path, more).unwrap();
        run_session(&settings, &mut cache, input, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let counts: Vec<&str> = text
            .lines()
            .filter(|l| l.starts_with("Inscritos"))
            .collect();
        assert_eq!(counts.len(), 3);
        assert!(counts[0].starts_with("Inscritos: 3 |"));
        assert!(counts[1].starts_with("Inscritos: 3 |"));
        assert!(counts[2].starts_with("Inscritos: 4 |"));
    }

    #[test]
    fn bare_dates_returns_to_the_full_range() {
        let undated = format!("{}Rosa,Lider2,General,pendiente\n", SAMPLE);
        let settings = settings_for("bare_dates.csv", &undated);
        let mut cache = DatasetCache::new();
        let text = run(
            &settings,
            &mut cache,
            "dates 2025-01-11\ndates 2025-01-11 2025-01-31\ndates\nquit\n",
        );
        let counts: Vec<&str> = text
            .lines()
            .filter(|l| l.starts_with("Inscritos"))
            .collect();
        assert_eq!(counts.len(), 4);
        assert!(counts[0].starts_with("Inscritos: 3 |"));
        assert!(counts[1].starts_with("Inscritos: 4 |"));
        assert!(counts[2].starts_with("Inscritos: 1 |"));
        assert!(counts[3].starts_with("Inscritos: 3 |"));
    }

    #[test]
    fn bad_command_keeps_the_session() {
        let settings = settings_for("bad_command.csv", SAMPLE);
        let mut cache = DatasetCache::new();
        let text = run(&settings, &mut cache, "bailar\nhelp\nquit\n");
        assert!(text.contains("Unknown command: bailar"));
        assert!(text.contains("commands: leader"));
        assert_eq!(text.matches("== ANTORCHA 2026 ==").count(), 1);
    }

    #[test]
    fn missing_file_stops_the_session() {
        let settings = build_settings(&Args::parse_from(vec![
            "antorcha",
            "-i",
            "/nonexistent/registros.csv",
        ]))
        .unwrap();
        let mut cache = DatasetCache::new();
        let mut buf: Vec<u8> = Vec::new();
        let res = run_session(&settings, &mut cache, "show\n".as_bytes(), &mut buf);
        assert!(matches!(res, Err(DashboardError::MissingSource { .. })));
        assert!(buf.is_empty());
    }
}
