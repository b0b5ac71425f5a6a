//! Input validation utilities for the service layer.
//!
//! Request bodies are checked against an explicit allow-list of mutable
//! fields before anything is deserialized (see [`Payload`]), then each value
//! is validated by the rules below.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{Error, Result, ValidationErrors};

/// Largest value a `NUMERIC(12, 2)` column holds.
pub const MAX_AMOUNT: Decimal = dec!(9999999999.99);

/// Smallest accepted transaction amount.
pub const MIN_TRANSACTION_AMOUNT: Decimal = dec!(0.01);

/// Fractional digits kept for currency values.
pub const CURRENCY_SCALE: u32 = 2;

const PROHIBITED: &str = "This field is prohibited";

/// A JSON object body restricted to an allow-list of keys.
///
/// Construction fails when the body is not an object or when it carries any
/// key outside the allow-list (ownership fields such as `user_id` included).
#[derive(Debug, Clone, Default)]
pub struct Payload {
    fields: Map<String, Value>,
}

impl Payload {
    pub fn from_json(body: Value, allowed: &[&str]) -> Result<Self> {
        let Value::Object(fields) = body else {
            return Err(Error::validation("body", "Request body must be a JSON object"));
        };

        let rejected: BTreeMap<String, String> = fields
            .keys()
            .filter(|key| !allowed.contains(&key.as_str()))
            .map(|key| (key.clone(), PROHIBITED.to_string()))
            .collect();

        match rejected.len() {
            0 => Ok(Self { fields }),
            1 => {
                let (field, message) = rejected.into_iter().next().unwrap_or_default();
                Err(Error::Validation(ValidationErrors::Single { field, message }))
            }
            _ => Err(Error::Validation(ValidationErrors::Multiple { fields: rejected })),
        }
    }

    /// Rejects partial updates that carry no recognized field.
    pub fn require_any(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(Error::validation(
                "body",
                "At least one field must be provided",
            ));
        }
        Ok(())
    }

    /// A key that must be present and non-null.
    pub fn required<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        match self.fields.get(key) {
            None | Some(Value::Null) => {
                Err(Error::validation(key, format!("The {} field is required", key)))
            }
            Some(value) => decode(key, value),
        }
    }

    /// Absent and null both read as `None`.
    pub fn optional<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.fields.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => decode(key, value).map(Some),
        }
    }

    /// Distinguishes absent (`None`) from explicit null (`Some(None)`).
    pub fn nullable<T: DeserializeOwned>(&self, key: &str) -> Result<Option<Option<T>>> {
        match self.fields.get(key) {
            None => Ok(None),
            Some(Value::Null) => Ok(Some(None)),
            Some(value) => decode(key, value).map(|v| Some(Some(v))),
        }
    }
}

fn decode<T: DeserializeOwned>(key: &str, value: &Value) -> Result<T> {
    T::deserialize(value).map_err(|e| Error::validation(key, format!("Invalid {}: {}", key, e)))
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(field: &str, input: &str) -> Result<NaiveDate> {
    NaiveDate::from_str(input.trim())
        .map_err(|_| Error::validation(field, format!("The {} field must be a date in YYYY-MM-DD format", field)))
}

/// Validates a transaction amount: at least 0.01, two decimals at most.
pub fn validate_amount(field: &str, amount: Decimal) -> Result<Decimal> {
    if amount < MIN_TRANSACTION_AMOUNT {
        return Err(Error::validation(field, format!("The {} must be at least 0.01", field)));
    }
    validate_currency_precision(field, amount)
}

/// Validates a budget limit: zero or more, two decimals at most.
pub fn validate_limit(field: &str, limit: Decimal) -> Result<Decimal> {
    if limit.is_sign_negative() && !limit.is_zero() {
        return Err(Error::validation(field, format!("The {} must be at least 0", field)));
    }
    validate_currency_precision(field, limit)
}

fn validate_currency_precision(field: &str, value: Decimal) -> Result<Decimal> {
    if value.normalize().scale() > CURRENCY_SCALE {
        return Err(Error::validation(
            field,
            format!("The {} must have at most 2 decimal places", field),
        ));
    }
    if value > MAX_AMOUNT {
        return Err(Error::validation(field, format!("The {} is too large", field)));
    }
    Ok(to_currency(value))
}

/// Rounds half away from zero to two decimals and pins the scale so `1`
/// renders as `1.00`.
pub fn to_currency(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(CURRENCY_SCALE);
    rounded
}

/// Requires `end >= start`.
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if end < start {
        return Err(Error::validation(
            "end_date",
            "The end date must be a date after or equal to the start date",
        ));
    }
    Ok(())
}

/// Validates email format using structural checks
///
/// # Examples
/// ```
/// use fintrack::validation::validate_email;
///
/// validate_email("user@example.com").unwrap();
/// assert!(validate_email("invalid-email").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(Error::validation("email", "Email cannot be empty"));
    }

    if email.len() > 254 {
        return Err(Error::validation("email", "Email address is too long (max 254 characters)"));
    }

    let Some((local_part, domain)) = email.split_once('@') else {
        return Err(Error::validation("email", "Invalid email format: must contain @ symbol"));
    };

    if domain.contains('@') {
        return Err(Error::validation("email", "Invalid email format: must contain exactly one @ symbol"));
    }

    if local_part.is_empty() || local_part.len() > 64 {
        return Err(Error::validation("email", "Invalid email format: bad local part"));
    }

    if domain.is_empty() || domain.len() > 253 || !domain.contains('.') {
        return Err(Error::validation("email", "Invalid email format: bad domain"));
    }

    if email.contains("..") {
        return Err(Error::validation("email", "Invalid email format: cannot contain consecutive dots"));
    }

    let invalid_chars = ['<', '>', '(', ')', '[', ']', '\\', ',', ';', ':', '"', ' '];
    if let Some(c) = invalid_chars.iter().find(|c| email.contains(**c)) {
        return Err(Error::validation("email", format!("Invalid email format: cannot contain '{}'", c)));
    }

    Ok(())
}

/// Validates password strength and format
pub fn validate_password(password: &str) -> Result<()> {
    if password.len() < 8 {
        return Err(Error::validation("password", "Password must be at least 8 characters long"));
    }

    if password.len() > 128 {
        return Err(Error::validation("password", "Password is too long (max 128 characters)"));
    }

    let lowered = password.to_lowercase();
    if ["password", "12345678", "qwerty123", "admin123"].contains(&lowered.as_str()) {
        return Err(Error::validation("password", "Password is too common and weak"));
    }

    if password.contains(' ') {
        return Err(Error::validation("password", "Password cannot contain spaces"));
    }

    Ok(())
}

/// Validates a display name (users and categories): trimmed, 1-100 chars,
/// no control characters. Returns the trimmed value.
pub fn validate_name(field: &str, name: &str) -> Result<String> {
    let name = validate_required_string(name, field)?;

    if name.chars().count() > 100 {
        return Err(Error::validation(field, format!("The {} must be at most 100 characters", field)));
    }

    if name.chars().any(|c| c.is_control()) {
        return Err(Error::validation(field, format!("The {} cannot contain control characters", field)));
    }

    Ok(name)
}

/// Validates optional free text, trimming it and folding blanks to `None`.
pub fn validate_optional_text(field: &str, value: Option<String>, max_chars: usize) -> Result<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };

    let value = sanitize_string(&value);
    if value.is_empty() {
        return Ok(None);
    }

    if value.chars().count() > max_chars {
        return Err(Error::validation(
            field,
            format!("The {} must be at most {} characters", field, max_chars),
        ));
    }

    Ok(Some(value))
}

/// Validates an IANA timezone name such as `Europe/Paris`.
pub fn validate_timezone(timezone: &str) -> Result<()> {
    timezone
        .parse::<chrono_tz::Tz>()
        .map(|_| ())
        .map_err(|_| Error::validation("timezone", "The timezone must be a valid IANA timezone"))
}

/// Sanitizes string input by trimming whitespace
pub fn sanitize_string(input: &str) -> String {
    input.trim().to_string()
}

/// Validates that a string is not empty after sanitization
pub fn validate_required_string(input: &str, field_name: &str) -> Result<String> {
    let sanitized = sanitize_string(input);

    if sanitized.is_empty() {
        return Err(Error::validation(field_name, format!("The {} field is required", field_name)));
    }

    Ok(sanitized)
}
