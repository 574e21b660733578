//! Date and time rendering for spoken responses. The voice agent reads these
//! strings verbatim, so they use US-English conversational forms rather than
//! ISO formats.

use chrono::{NaiveDate, NaiveTime};

/// `"14:30"` -> `"2:30 PM"`. Unparsable values are spoken as-is.
pub fn twelve_hour(time: &str) -> String {
    match NaiveTime::parse_from_str(time, "%H:%M") {
        Ok(parsed) => parsed.format("%-I:%M %p").to_string(),
        Err(_) => time.to_string(),
    }
}

/// `"Wednesday, January 15"`
pub fn long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d").to_string()
}

/// `"Wednesday, January 15, 2025"`
pub fn long_date_with_year(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// `"Wed, Jan 15"`
pub fn short_date(date: NaiveDate) -> String {
    date.format("%a, %b %-d").to_string()
}

/// `"1/15/2025"`
pub fn numeric_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}
