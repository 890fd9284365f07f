//! SQL fragments and positional placeholder numbering.
//!
//! Every builder in this crate produces a [`SqlFragment`]: SQL text containing
//! `$1, $2, ...` placeholders plus the values bound to them, in order. The
//! number of placeholders in the text always equals `values.len()`, and the
//! numbering is contiguous from the start index the builder was given.

use crate::error::{JoblyError, JoblyResult};
use crate::value::Value;
use std::fmt::Write as _;
use tokio_postgres::types::ToSql;

/// Placeholder counter shared by the builders.
///
/// Each call to [`Placeholders::bind`] records a value and returns the index of
/// the placeholder that refers to it.
#[derive(Debug, Clone)]
pub struct Placeholders {
    start: usize,
    next: usize,
    values: Vec<Value>,
}

impl Placeholders {
    /// Start numbering at `$1`.
    pub fn new() -> Self {
        Self {
            start: 1,
            next: 1,
            values: Vec::new(),
        }
    }

    /// Start numbering at `$start`. Placeholders are 1-based, so 0 is rejected.
    pub fn starting_at(start: usize) -> JoblyResult<Self> {
        if start == 0 {
            return Err(JoblyError::bad_request(
                "placeholder numbering starts at 1",
            ));
        }
        Ok(Self {
            start,
            next: start,
            values: Vec::new(),
        })
    }

    /// Record `value` and return its placeholder index.
    pub fn bind(&mut self, value: impl Into<Value>) -> usize {
        let idx = self.next;
        self.values.push(value.into());
        self.next += 1;
        idx
    }

    /// Record `value` and append its `$n` placeholder to `out`.
    pub fn push_bind(&mut self, out: &mut String, value: impl Into<Value>) {
        let idx = self.bind(value);
        // Writing to a String cannot fail.
        let _ = write!(out, "${idx}");
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Pair the collected values with `sql`.
    pub fn finish(self, sql: String) -> SqlFragment {
        SqlFragment {
            sql,
            values: self.values,
            start: self.start,
        }
    }
}

impl Default for Placeholders {
    fn default() -> Self {
        Self::new()
    }
}

/// SQL text plus its ordered positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFragment {
    pub sql: String,
    pub values: Vec<Value>,
    start: usize,
}

impl SqlFragment {
    /// Parameter references in the shape `tokio-postgres` expects.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
    }

    /// Index the next appended parameter should use.
    pub fn next_index(&self) -> usize {
        self.start + self.values.len()
    }

    /// Append a value and return its placeholder index.
    pub fn push_value(&mut self, value: impl Into<Value>) -> usize {
        let idx = self.next_index();
        self.values.push(value.into());
        idx
    }
}

/// Count `$n` placeholders in `sql`.
pub fn count_placeholders(sql: &str) -> usize {
    let bytes = sql.as_bytes();
    bytes
        .iter()
        .enumerate()
        .filter(|&(i, &b)| b == b'$' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))
        .count()
}
