//! Date normalization to canonical `YYYY-MM-DD` form.

use chrono::NaiveDate;
use tracing::debug;

use crate::models::config::DateConfig;

use super::patterns::{DATE_DAY_FIRST, DATE_MONTH_FIRST, DATE_NUMERIC, DATE_YMD, ORDINAL_SUFFIX};

/// Canonical output format for all date fields.
const CANONICAL_FORMAT: &str = "%Y-%m-%d";

/// Label prefixes the extraction collaborator sometimes leaves attached.
const LABEL_PREFIXES: [&str; 4] = ["invoice date:", "due date:", "dated:", "date:"];

/// Date normalizer.
///
/// Tries an ordered list of anchored patterns; the first one that parses
/// the whole cleaned string wins. Ambiguous purely-numeric dates follow
/// the configured day-first policy.
#[derive(Debug, Clone)]
pub struct DateNormalizer {
    config: DateConfig,
}

impl DateNormalizer {
    /// Create a normalizer with the given configuration.
    pub fn new(config: DateConfig) -> Self {
        Self { config }
    }

    /// Normalize a date string to `YYYY-MM-DD`.
    ///
    /// Returns `None` when no pattern parses the full input.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let cleaned = clean_date_string(raw);
        if cleaned.is_empty() {
            return None;
        }

        match self.parse(&cleaned) {
            Some(date) => Some(date.format(CANONICAL_FORMAT).to_string()),
            None => {
                debug!("could not parse date: '{}'", raw);
                None
            }
        }
    }

    fn parse(&self, s: &str) -> Option<NaiveDate> {
        // ISO-ordered first: a four-digit leading year is unambiguous
        if let Some(caps) = DATE_YMD.captures(s) {
            let year: i32 = caps[1].parse().ok()?;
            let month: u32 = caps[2].parse().ok()?;
            let day: u32 = caps[3].parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month, day);
        }

        if let Some(caps) = DATE_NUMERIC.captures(s) {
            let a: u32 = caps[1].parse().ok()?;
            let b: u32 = caps[2].parse().ok()?;
            let year = self.expand_year(caps[3].parse().ok()?);

            // When one component cannot be a month the reading is forced;
            // otherwise the configured day-first policy decides.
            let (day, month) = if a > 12 {
                (a, b)
            } else if b > 12 {
                (b, a)
            } else if self.config.day_first {
                (a, b)
            } else {
                (b, a)
            };

            return NaiveDate::from_ymd_opt(year, month, day);
        }

        if let Some(caps) = DATE_MONTH_FIRST.captures(s) {
            if let Some(month) = month_number(&caps[1]) {
                let day: u32 = caps[2].parse().ok()?;
                let year = self.expand_year(caps[3].parse().ok()?);
                return NaiveDate::from_ymd_opt(year, month, day);
            }
        }

        if let Some(caps) = DATE_DAY_FIRST.captures(s) {
            if let Some(month) = month_number(&caps[2]) {
                let day: u32 = caps[1].parse().ok()?;
                let year = self.expand_year(caps[3].parse().ok()?);
                return NaiveDate::from_ymd_opt(year, month, day);
            }
        }

        None
    }

    fn expand_year(&self, year: i32) -> i32 {
        if year < 100 {
            if year <= self.config.two_digit_year_pivot {
                2000 + year
            } else {
                1900 + year
            }
        } else {
            year
        }
    }
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self::new(DateConfig::default())
    }
}

/// Strip label prefixes, ordinal suffixes, and excess whitespace.
fn clean_date_string(raw: &str) -> String {
    let collapsed: String = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut s = collapsed.trim().to_string();

    for prefix in LABEL_PREFIXES {
        if s.len() >= prefix.len()
            && s.is_char_boundary(prefix.len())
            && s[..prefix.len()].eq_ignore_ascii_case(prefix)
        {
            s = s[prefix.len()..].trim().to_string();
            break;
        }
    }

    ORDINAL_SUFFIX.replace_all(&s, "$1").into_owned()
}

/// Map an English month name or 3-letter abbreviation to its number.
fn month_number(name: &str) -> Option<u32> {
    match name.to_lowercase().as_str() {
        "jan" | "january" => Some(1),
        "feb" | "february" => Some(2),
        "mar" | "march" => Some(3),
        "apr" | "april" => Some(4),
        "may" => Some(5),
        "jun" | "june" => Some(6),
        "jul" | "july" => Some(7),
        "aug" | "august" => Some(8),
        "sep" | "sept" | "september" => Some(9),
        "oct" | "october" => Some(10),
        "nov" | "november" => Some(11),
        "dec" | "december" => Some(12),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn normalizer() -> DateNormalizer {
        DateNormalizer::default()
    }

    #[test]
    fn test_numeric_day_first() {
        assert_eq!(
            normalizer().normalize("15/01/2024"),
            Some("2024-01-15".to_string())
        );
        assert_eq!(
            normalizer().normalize("15.01.2024"),
            Some("2024-01-15".to_string())
        );
    }

    #[test]
    fn test_iso_passthrough() {
        assert_eq!(
            normalizer().normalize("2024-01-15"),
            Some("2024-01-15".to_string())
        );
        assert_eq!(
            normalizer().normalize("2024/1/5"),
            Some("2024-01-05".to_string())
        );
    }

    #[test]
    fn test_textual_month() {
        assert_eq!(
            normalizer().normalize("Jan 15, 2024"),
            Some("2024-01-15".to_string())
        );
        assert_eq!(
            normalizer().normalize("January 15 2024"),
            Some("2024-01-15".to_string())
        );
        assert_eq!(
            normalizer().normalize("15th January 2024"),
            Some("2024-01-15".to_string())
        );
    }

    #[test]
    fn test_ambiguity_policy_is_day_first() {
        // Both components could be a month; the fixed policy decides.
        assert_eq!(
            normalizer().normalize("01/02/2024"),
            Some("2024-02-01".to_string())
        );

        let month_first = DateNormalizer::new(DateConfig {
            day_first: false,
            ..DateConfig::default()
        });
        assert_eq!(
            month_first.normalize("01/02/2024"),
            Some("2024-01-02".to_string())
        );
        // A day above 12 forces the other reading regardless of policy.
        assert_eq!(
            month_first.normalize("15/01/2024"),
            Some("2024-01-15".to_string())
        );
    }

    #[test]
    fn test_two_digit_year_pivot() {
        let n = DateNormalizer::new(DateConfig {
            day_first: true,
            two_digit_year_pivot: 36,
        });

        assert_eq!(n.normalize("15/01/24"), Some("2024-01-15".to_string()));
        assert_eq!(n.normalize("15/01/99"), Some("1999-01-15".to_string()));
        assert_eq!(n.normalize("15/01/36"), Some("2036-01-15".to_string()));
        assert_eq!(n.normalize("15/01/37"), Some("1937-01-15".to_string()));
    }

    #[test]
    fn test_label_prefix_stripped() {
        assert_eq!(
            normalizer().normalize("Date: 15/01/2024"),
            Some("2024-01-15".to_string())
        );
        assert_eq!(
            normalizer().normalize("Invoice Date: Jan 15, 2024"),
            Some("2024-01-15".to_string())
        );
    }

    #[test]
    fn test_no_partial_parse() {
        assert_eq!(normalizer().normalize("15/01/2024 at noon"), None);
        assert_eq!(normalizer().normalize("around 2024"), None);
    }

    #[test]
    fn test_invalid_input() {
        assert_eq!(normalizer().normalize(""), None);
        assert_eq!(normalizer().normalize("not a date"), None);
        assert_eq!(normalizer().normalize("99/99/2024"), None);
        assert_eq!(normalizer().normalize("31/02/2024"), None);
    }

    #[test]
    fn test_idempotent_on_canonical() {
        let n = normalizer();
        let once = n.normalize("15/01/2024").unwrap();
        assert_eq!(n.normalize(&once), Some(once.clone()));
    }
}
