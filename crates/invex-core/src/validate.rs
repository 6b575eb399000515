//! Advisory per-field validation of normalized values.

use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::models::config::ValidateConfig;
use crate::models::fields::FieldKind;

/// Outcome of a validation check.
///
/// Validation never mutates or discards a value; it only attaches a
/// verdict and a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    /// Whether the value passed.
    pub ok: bool,
    /// Why it failed (or what looks suspicious), if anything.
    pub reason: Option<String>,
}

impl Validation {
    fn pass() -> Self {
        Self {
            ok: true,
            reason: None,
        }
    }

    fn fail(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            reason: Some(reason.into()),
        }
    }
}

/// Per-field-kind sanity rules.
#[derive(Debug, Clone)]
pub struct FieldValidator {
    config: ValidateConfig,
    max_year: i32,
}

impl FieldValidator {
    /// Create a validator with the given configuration.
    pub fn new(config: ValidateConfig) -> Self {
        let max_year = Utc::now().year() + config.max_year_ahead;
        Self { config, max_year }
    }

    /// Validate a normalized value for the given field kind.
    pub fn validate(&self, kind: FieldKind, value: &str) -> Validation {
        if value.trim().is_empty() {
            return Validation::fail(format!("{} is empty", kind));
        }

        if kind.is_date() {
            self.validate_date(value)
        } else if kind.is_amount() {
            self.validate_amount(value)
        } else {
            self.validate_name(kind, value)
        }
    }

    fn validate_date(&self, value: &str) -> Validation {
        let date = match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            Ok(date) => date,
            Err(_) => return Validation::fail(format!("invalid date format: '{value}'")),
        };

        if date.year() < self.config.min_year {
            return Validation::fail(format!("year {} is too old", date.year()));
        }
        if date.year() > self.max_year {
            return Validation::fail(format!("year {} is too far in the future", date.year()));
        }

        Validation::pass()
    }

    fn validate_amount(&self, value: &str) -> Validation {
        let amount = match Decimal::from_str(value) {
            Ok(amount) => amount,
            Err(_) => return Validation::fail(format!("could not parse amount: '{value}'")),
        };

        if amount.is_sign_negative() {
            return Validation::fail("amount cannot be negative");
        }
        if amount.abs() > self.config.max_amount {
            return Validation::fail(format!(
                "amount {amount} exceeds maximum {}",
                self.config.max_amount
            ));
        }

        Validation::pass()
    }

    fn validate_name(&self, kind: FieldKind, value: &str) -> Validation {
        let trimmed = value.trim();

        if trimmed.chars().count() < self.config.min_name_len {
            return Validation::fail(format!("{kind} too short"));
        }
        if !trimmed.chars().any(|c| c.is_alphanumeric()) {
            return Validation::fail(format!("{kind} must contain alphanumeric characters"));
        }

        Validation::pass()
    }

    /// Advisory cross-field check: the payment due date should not precede
    /// the invoice date. Unparseable inputs yield no finding.
    pub fn check_date_order(&self, invoice_date: &str, due_date: &str) -> Option<String> {
        let invoice = NaiveDate::parse_from_str(invoice_date, "%Y-%m-%d").ok()?;
        let due = NaiveDate::parse_from_str(due_date, "%Y-%m-%d").ok()?;

        if due < invoice {
            Some("payment due date precedes invoice date".to_string())
        } else {
            None
        }
    }
}

impl Default for FieldValidator {
    fn default() -> Self {
        Self::new(ValidateConfig::default())
    }
}
