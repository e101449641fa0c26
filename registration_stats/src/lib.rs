mod config;
pub mod builder;
pub mod manual;
mod view;

use log::{debug, info};

use std::collections::{BTreeMap, BTreeSet, HashMap};

pub use crate::config::*;
pub use crate::view::render;

/// Simplifies a ticket type into its category.
///
/// The category is the text before the first opening parenthesis, without
/// the surrounding whitespace. A label without parenthesis is its own category.
///
/// ```
/// use registration_stats::categorize;
///
/// assert_eq!(categorize("VIP (Oferta hasta el 10)"), "VIP");
/// assert_eq!(categorize(" General "), "General");
/// ```
pub fn categorize(label: &str) -> String {
    let head = match label.find('(') {
        Some(idx) => &label[..idx],
        None => label,
    };
    head.trim().to_string()
}

/// Shortens a name for a chart axis.
///
/// Names with more than `max_chars` characters are cut and end with an ellipsis.
/// The full name must still be used for anything else than display.
pub fn shorten_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() > max_chars {
        let head: String = label.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        label.to_string()
    }
}

fn keep_record(r: &Registration, dataset: &Dataset, selection: &FilterSelection) -> bool {
    if let DateRange::Full(start, end) = selection.dates {
        if dataset.has(Field::PaymentDate) {
            match r.payment_date {
                Some(d) if d >= start && d <= end => {}
                _ => return false,
            }
        }
    }
    if dataset.has(Field::Leader) {
        let keep = match &selection.leader {
            Choice::All => true,
            Choice::Missing => r.leader.is_none(),
            Choice::Only(leader) => r.leader.as_deref() == Some(leader.as_str()),
        };
        if !keep {
            return false;
        }
    }
    if dataset.has(Field::TicketType) {
        let keep = match &selection.category {
            Choice::All => true,
            Choice::Missing => r.ticket_type.is_none(),
            Choice::Only(category) => r.ticket_type.is_some() && r.category() == category.as_str(),
        };
        if !keep {
            return false;
        }
    }
    true
}

/// Fills an unset date range with the first and last payment dates of the dataset.
///
/// This is the range the date picker starts with, so by default the records
/// without a readable date are left out. A partial range is kept as it is.
pub fn seed_dates(selection: &FilterSelection, dataset: &Dataset) -> FilterSelection {
    let mut res = selection.clone();
    if selection.dates == DateRange::Unset {
        if let Some((lo, hi)) = date_bounds(dataset) {
            res.dates = DateRange::Full(lo, hi);
        }
    }
    debug!("seed_dates: {:?} -> {:?}", selection.dates, res.dates);
    res
}

fn date_bounds(dataset: &Dataset) -> Option<(chrono::NaiveDate, chrono::NaiveDate)> {
    if !dataset.has(Field::PaymentDate) {
        return None;
    }
    let dates = dataset.records.iter().filter_map(|r| r.payment_date);
    let lo = dates.clone().min()?;
    let hi = dates.max()?;
    Some((lo, hi))
}

/// Keeps the registrations that match every active part of the selection.
///
/// The dataset itself is not modified. A date range that is not complete, or a
/// selection on a column that the dataset does not have, does not filter anything.
pub fn filter(dataset: &Dataset, selection: &FilterSelection) -> Dataset {
    let records: Vec<Registration> = dataset
        .records
        .iter()
        .filter(|r| keep_record(r, dataset, selection))
        .cloned()
        .collect();
    debug!(
        "filter: kept {:?} of {:?} records for selection {:?}",
        records.len(),
        dataset.len(),
        selection
    );
    Dataset {
        fields: dataset.fields.clone(),
        records,
    }
}

/// Counts the labels in order of first appearance.
fn count_in_order<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for l in labels {
        if let Some(idx) = positions.get(l).copied() {
            counts[idx].1 += 1;
        } else {
            positions.insert(l, counts.len());
            counts.push((l, 1));
        }
    }
    counts
}

/// Computes the headline metrics of the filtered registrations.
///
/// Arguments:
/// * `base` the full dataset, used for the percentage
/// * `filtered` the registrations left after filtering
pub fn summarize(base: &Dataset, filtered: &Dataset) -> Summary {
    let distinct_leaders = filtered
        .records
        .iter()
        .filter_map(|r| r.leader.as_deref())
        .collect::<BTreeSet<&str>>()
        .len();

    // Ties go to the category seen first.
    let mut top: Option<(&str, usize)> = None;
    for (label, count) in count_in_order(filtered.records.iter().map(|r| r.category())) {
        match top {
            Some((_, best)) if best >= count => {}
            _ => top = Some((label, count)),
        }
    }
    let (top_category, top_category_count) = match top {
        Some((label, count)) if filtered.has(Field::TicketType) => (label.to_string(), count),
        _ => (NO_CATEGORY.to_string(), 0),
    };

    let percentage = if base.is_empty() {
        0.0
    } else {
        (filtered.len() as f64 / base.len() as f64 * 100.0).clamp(0.0, 100.0)
    };

    Summary {
        total: filtered.len(),
        distinct_leaders,
        top_category,
        top_category_count,
        percentage,
    }
}

/// Hands out a color for each label of the chart.
pub fn assign_colors(labels: &[String], scheme: &ColorScheme) -> HashMap<String, String> {
    let mut res: HashMap<String, String> = HashMap::new();
    match scheme {
        ColorScheme::Palette(palette) => {
            for l in labels {
                if res.contains_key(l) || palette.is_empty() {
                    continue;
                }
                let color = palette[res.len() % palette.len()].clone();
                res.insert(l.clone(), color);
            }
        }
        ColorScheme::Fixed(map, fallback) => {
            for l in labels {
                let color = map.get(l).unwrap_or(fallback).clone();
                res.insert(l.clone(), color);
            }
        }
    }
    res
}

/// Counts the registrations per leader and per label, for the ranking chart.
///
/// Registrations without a leader or without a label are not counted.
/// The leaders are ranked by their total, smallest first.
pub fn chart_table(filtered: &Dataset, options: &DisplayOptions) -> Result<ChartTable, StatsError> {
    if !filtered.has(Field::Leader) {
        return Err(StatsError::MissingColumn(Field::Leader));
    }
    if !filtered.has(Field::TicketType) {
        return Err(StatsError::MissingColumn(Field::TicketType));
    }

    let mut counts: BTreeMap<(&str, &str), u64> = BTreeMap::new();
    for r in filtered.records.iter() {
        let label = match options.group_by {
            GroupBy::Category => r.ticket_type.as_ref().map(|_| r.category()),
            GroupBy::TicketType => r.ticket_type.as_deref(),
        };
        if let (Some(leader), Some(label)) = (r.leader.as_deref(), label) {
            *counts.entry((leader, label)).or_insert(0) += 1;
        }
    }

    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for ((leader, _), count) in counts.iter() {
        *totals.entry(*leader).or_insert(0) += count;
    }
    // Stable sort: equal totals stay in name order.
    let mut ranking: Vec<(String, u64)> = totals
        .iter()
        .map(|(leader, total)| (leader.to_string(), *total))
        .collect();
    ranking.sort_by_key(|(_, total)| *total);

    let labels: Vec<String> = counts.keys().map(|(_, l)| l.to_string()).collect();
    let colors = assign_colors(&labels, &options.colors);

    let rows: Vec<ChartRow> = counts
        .iter()
        .map(|((leader, label), total)| ChartRow {
            leader: leader.to_string(),
            label: label.to_string(),
            total: *total,
            short_leader: shorten_label(leader, options.truncate_length),
            color: colors.get(*label).cloned().unwrap_or_default(),
        })
        .collect();

    info!(
        "chart_table: {:?} groups for {:?} leaders",
        rows.len(),
        ranking.len()
    );
    Ok(ChartTable { rows, ranking })
}

/// The values to offer in the selectors, each list starting with the "all" choice.
pub fn controls(dataset: &Dataset, all_label: &str) -> Controls {
    let mut leaders = vec![all_label.to_string()];
    if dataset.has(Field::Leader) {
        let names: BTreeSet<&str> = dataset.records.iter().map(|r| r.leader_label()).collect();
        leaders.extend(names.iter().map(|s| s.to_string()));
    }

    let mut categories = vec![all_label.to_string()];
    if dataset.has(Field::TicketType) {
        let names: BTreeSet<&str> = dataset.records.iter().map(|r| r.category()).collect();
        categories.extend(names.iter().map(|s| s.to_string()));
    }

    Controls {
        leaders,
        categories,
        date_bounds: date_bounds(dataset),
    }
}
