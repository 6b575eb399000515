//! Amount normalization to fixed-point decimal strings.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::models::config::AmountConfig;

/// Amount normalizer.
///
/// Strips currency decoration, resolves thousands/decimal separator
/// ambiguity, and renders a fixed-point decimal string with the
/// configured number of places. Negative amounts (leading or trailing
/// minus, or accounting parentheses) keep a leading `-`.
#[derive(Debug, Clone)]
pub struct AmountNormalizer {
    config: AmountConfig,
}

impl AmountNormalizer {
    /// Create a normalizer with the given configuration.
    pub fn new(config: AmountConfig) -> Self {
        Self { config }
    }

    /// Normalize an amount string, e.g. `"$1,234.56"` to `"1234.56"`.
    ///
    /// Returns `None` when no numeric value remains after stripping.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let (residue, negative) = match strip_to_residue(raw) {
            Some(r) => r,
            None => {
                debug!("could not parse amount: '{}'", raw);
                return None;
            }
        };

        let plain = resolve_separators(&residue);
        if !plain.chars().any(|c| c.is_ascii_digit()) {
            debug!("no digits left in amount: '{}'", raw);
            return None;
        }

        let mut value = Decimal::from_str(&plain).ok()?;
        if negative && !value.is_zero() {
            value.set_sign_negative(true);
        }

        let places = self.config.decimal_places;
        let rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
        Some(format!("{:.prec$}", rounded, prec = places as usize))
    }
}

impl Default for AmountNormalizer {
    fn default() -> Self {
        Self::new(AmountConfig::default())
    }
}

/// Drop currency symbols, codes, and labels; detect the sign.
///
/// Keeps only `[0-9,.]` plus the sign markers, then consumes the markers.
/// Returns `None` when sign markers are malformed (e.g. a minus in the
/// middle of the number).
fn strip_to_residue(raw: &str) -> Option<(String, bool)> {
    let mut s: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-' | '(' | ')'))
        .collect();

    let mut negative = false;

    if s.starts_with('(') && s.ends_with(')') && s.len() >= 2 {
        negative = true;
        s = s[1..s.len() - 1].to_string();
    }

    if let Some(rest) = s.strip_prefix('-') {
        negative = true;
        s = rest.to_string();
    } else if let Some(rest) = s.strip_suffix('-') {
        negative = true;
        s = rest.to_string();
    }

    if s.is_empty() || s.contains(['-', '(', ')']) {
        return None;
    }

    Some((s, negative))
}

/// Resolve `,`/`.` into a single decimal point.
///
/// When both occur, the rightmost one is the decimal mark and the other
/// kind groups thousands. A single kind is a decimal mark only when its
/// final occurrence is followed by exactly 1-2 trailing digits.
fn resolve_separators(s: &str) -> String {
    let has_comma = s.contains(',');
    let has_dot = s.contains('.');

    match (has_comma, has_dot) {
        (false, false) => s.to_string(),
        (true, true) => {
            let last_comma = s.rfind(',').unwrap();
            let last_dot = s.rfind('.').unwrap();
            if last_comma > last_dot {
                // European style: 1.234,56
                s.replace('.', "").replace(',', ".")
            } else {
                // US style: 1,234.56
                s.replace(',', "")
            }
        }
        _ => {
            let sep = if has_comma { ',' } else { '.' };
            let last = s.rfind(sep).unwrap();
            let tail = &s[last + 1..];

            if !tail.is_empty() && tail.len() <= 2 && tail.chars().all(|c| c.is_ascii_digit()) {
                let head: String = s[..last].chars().filter(|c| *c != sep).collect();
                format!("{head}.{tail}")
            } else {
                // Grouping only: 1.234.567 or 1,234
                s.chars().filter(|c| *c != sep).collect()
            }
        }
    }
}
