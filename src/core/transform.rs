//! Order filtering, row projection and sheet layout.
//!
//! Everything here is pure: the same orders, contacts and `today` always give
//! the same [`SheetPlan`], which is what makes a re-run overwrite the sheet
//! with identical contents.

use crate::domain::model::{Contact, FormatRule, Order, Row, RowStyle, SheetPlan};
use chrono::{DateTime, Duration, NaiveDate};

/// Output format for every date cell.
const SHEET_DATE_FORMAT: &str = "%d/%m/%Y";

/// Keeps orders that are active and, when a filter is given, whose plan name
/// contains it (case-insensitive).
pub fn is_selected(order: &Order, plan_name_filter: Option<&str>) -> bool {
    if !order.is_active() {
        return false;
    }
    match plan_name_filter {
        Some(needle) if !needle.is_empty() => order
            .plan_name
            .to_lowercase()
            .contains(&needle.to_lowercase()),
        _ => true,
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Renders an API date as `DD/MM/YYYY`; unknown formats pass through untouched.
pub fn format_date(raw: Option<&str>) -> String {
    match raw {
        None => String::new(),
        Some(raw) if raw.trim().is_empty() => String::new(),
        Some(raw) => match parse_date(raw) {
            Some(date) => date.format(SHEET_DATE_FORMAT).to_string(),
            None => raw.to_string(),
        },
    }
}

/// A row is highlighted when its order has an end date. With a threshold, the
/// end date must also fall within `today + days`; unparseable dates still count.
pub fn should_highlight(order: &Order, today: NaiveDate, within_days: Option<i64>) -> bool {
    if !order.is_active() {
        return false;
    }
    let Some(end) = order.end_date() else {
        return false;
    };
    match (within_days, parse_date(end)) {
        (Some(days), Some(end)) => end <= today + Duration::days(days),
        _ => true,
    }
}

pub fn project_row(order: &Order, contact: &Contact, highlighted: bool) -> Row {
    Row {
        order_id: order.id.clone(),
        status: order.status.as_str().to_string(),
        plan_name: order.plan_name.clone(),
        customer_name: contact.name.clone(),
        email: contact.email.clone(),
        start_date: format_date(order.start_date.as_deref()),
        end_date: format_date(order.end_date()),
        price: order.price.as_ref().map(|p| p.display()).unwrap_or_default(),
        highlighted,
    }
}

/// Header at row 0, data from row 1. Formatting starts with a whole-sheet reset
/// so highlights from an earlier, longer run do not linger.
pub fn build_sheet_plan(rows: &[Row]) -> SheetPlan {
    let mut values = Vec::with_capacity(rows.len() + 1);
    values.push(Row::HEADERS.iter().map(|h| h.to_string()).collect());
    values.extend(rows.iter().map(Row::cells));

    let mut formats = vec![
        FormatRule {
            rows: None,
            style: RowStyle::Plain,
        },
        FormatRule {
            rows: Some((0, 1)),
            style: RowStyle::Header,
        },
    ];
    formats.extend(
        rows.iter()
            .enumerate()
            .filter(|(_, row)| row.highlighted)
            .map(|(index, _)| FormatRule {
                rows: Some((index + 1, index + 2)),
                style: RowStyle::Highlight,
            }),
    );

    SheetPlan { values, formats }
}
