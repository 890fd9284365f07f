//! Validation helpers for create inputs and update payloads.

use crate::changeset::{ValidationCode, ValidationError, ValidationErrors};
use crate::update::UpdatePayload;
use crate::value::Value;
use rust_decimal::Decimal;
use std::sync::OnceLock;

/// Equity is a fraction in `[0, 1]` written as a decimal string.
pub fn is_equity(s: &str) -> bool {
    static EQUITY_RE: OnceLock<regex::Regex> = OnceLock::new();
    EQUITY_RE
        .get_or_init(|| {
            regex::Regex::new(r"^(0(\.\d+)?|1(\.0+)?)$").expect("invalid built-in equity regex")
        })
        .is_match(s)
}

pub fn is_url(s: &str) -> bool {
    url::Url::parse(s).is_ok()
}

pub(crate) fn check_non_empty(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(ValidationError::new(
            field,
            ValidationCode::Required,
            "must not be empty",
        ));
    }
}

pub(crate) fn check_non_negative(errors: &mut ValidationErrors, field: &str, n: i64) {
    if n < 0 {
        errors.push(ValidationError::new(field, ValidationCode::Range, "must be >= 0"));
    } else if i32::try_from(n).is_err() {
        errors.push(ValidationError::new(field, ValidationCode::Range, "is too large"));
    }
}

pub(crate) fn check_equity(errors: &mut ValidationErrors, field: &str, equity: &str) {
    if !is_equity(equity) {
        errors.push(ValidationError::new(
            field,
            ValidationCode::Regex,
            "must be a decimal between 0 and 1",
        ));
    }
}

pub(crate) fn check_url(errors: &mut ValidationErrors, field: &str, value: &str) {
    if !is_url(value) {
        errors.push(ValidationError::new(field, ValidationCode::Url, "must be a valid URL"));
    }
}

/// How an updatable field's value is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rule {
    Text,
    NonEmptyText,
    NonNegativeInt,
    Equity,
    Url,
}

/// An updatable field.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Field {
    pub name: &'static str,
    pub rule: Rule,
    pub nullable: bool,
}

impl Field {
    pub(crate) const fn new(name: &'static str, rule: Rule) -> Self {
        Self {
            name,
            rule,
            nullable: false,
        }
    }

    pub(crate) const fn nullable(name: &'static str, rule: Rule) -> Self {
        Self {
            name,
            rule,
            nullable: true,
        }
    }
}

fn type_error(errors: &mut ValidationErrors, field: &str, expected: &str, got: &Value) {
    errors.push(ValidationError::new(
        field,
        ValidationCode::Type,
        format!("expected {expected}, got {}", got.kind()),
    ));
}

fn check_value(errors: &mut ValidationErrors, field: &Field, value: &Value) {
    if value.is_null() {
        if !field.nullable {
            errors.push(ValidationError::new(
                field.name,
                ValidationCode::Required,
                "must not be null",
            ));
        }
        return;
    }

    match (field.rule, value) {
        (Rule::Text, Value::Text(_)) => {}
        (Rule::NonEmptyText, Value::Text(s)) => check_non_empty(errors, field.name, s),
        (Rule::Url, Value::Text(s)) => check_url(errors, field.name, s),
        (Rule::Text | Rule::NonEmptyText | Rule::Url, other) => {
            type_error(errors, field.name, "text", other)
        }
        (Rule::NonNegativeInt, Value::Int(n)) => check_non_negative(errors, field.name, *n),
        (Rule::NonNegativeInt, other) => type_error(errors, field.name, "integer", other),
        (Rule::Equity, Value::Text(s)) => check_equity(errors, field.name, s),
        (Rule::Equity, Value::Decimal(d)) => {
            if *d < Decimal::ZERO || *d > Decimal::ONE {
                check_equity(errors, field.name, &d.to_string());
            }
        }
        (Rule::Equity, Value::Int(n)) => {
            if !(0..=1).contains(n) {
                check_equity(errors, field.name, &n.to_string());
            }
        }
        (Rule::Equity, other) => type_error(errors, field.name, "decimal", other),
    }
}

/// Check every payload entry against `fields`; unknown keys are errors.
pub(crate) fn validate_update(
    payload: &UpdatePayload,
    fields: &[Field],
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    for (name, value) in payload.iter() {
        match fields.iter().find(|f| f.name == name) {
            Some(field) => check_value(&mut errors, field, value),
            None => errors.push(ValidationError::new(
                name,
                ValidationCode::Unknown,
                "is not an updatable field",
            )),
        }
    }
    errors.into_result()
}
