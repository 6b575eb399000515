//! Anchored patterns for date normalization.
//!
//! All date patterns are anchored on both ends: a value either parses as
//! a whole or not at all.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Purely numeric dates: 15/01/2024, 15-01-24, 15.01.2024
    pub static ref DATE_NUMERIC: Regex = Regex::new(
        r"^(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{2}|\d{4})$"
    ).unwrap();

    // ISO-ordered dates: 2024-01-15, 2024/1/5
    pub static ref DATE_YMD: Regex = Regex::new(
        r"^(\d{4})[/\-.](\d{1,2})[/\-.](\d{1,2})$"
    ).unwrap();

    // Textual month first: January 15, 2024 / Jan 15 2024
    pub static ref DATE_MONTH_FIRST: Regex = Regex::new(
        r"^([A-Za-z]{3,9})\.?\s+(\d{1,2}),?\s+(\d{2}|\d{4})$"
    ).unwrap();

    // Day before textual month: 15 January 2024
    pub static ref DATE_DAY_FIRST: Regex = Regex::new(
        r"^(\d{1,2})\s+([A-Za-z]{3,9})\.?,?\s+(\d{2}|\d{4})$"
    ).unwrap();

    // Ordinal suffixes on day numbers: 1st, 2nd, 3rd, 15th
    pub static ref ORDINAL_SUFFIX: Regex = Regex::new(
        r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b"
    ).unwrap();
}
