//! Natural-language date parsing for the visitor's "Date rule" (§4.4):
//! `parse_natural_date("July 7, 2025")`.
//!
//! No crate in the reference corpus offers natural-language date parsing;
//! the teacher already depends on `time`, so this tries a handful of
//! `time::format_description`s in turn rather than adding a new dependency
//! for it.

use time::Date;

use crate::error::SchemaError;

fn formats() -> Vec<Vec<time::format_description::FormatItem<'static>>> {
    vec![
        time::format_description::parse("[month repr:long] [day padding:none], [year]")
            .expect("long-month date format should be valid"),
        time::format_description::parse("[year]-[month]-[day]")
            .expect("ISO date format should be valid"),
        time::format_description::parse("[month padding:none]/[day padding:none]/[year]")
            .expect("slash date format should be valid"),
    ]
}

/// Tries each known human-readable date format in turn (§4.4 "Date rule").
pub fn parse_natural_date(page: usize, text: &str) -> Result<Date, SchemaError> {
    let trimmed = text.trim();
    for format in formats() {
        if let Ok(date) = Date::parse(trimmed, &format) {
            return Ok(date);
        }
    }
    Err(SchemaError { page, message: format!("could not parse date {trimmed:?}") })
}
