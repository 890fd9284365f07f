//! Job search predicates.
//!
//! [`build_filter_query`] appends an optional `WHERE` clause and a fixed
//! `ORDER BY title` to a caller-supplied base query. The base query is expected
//! to alias the jobs table as `j` and to contain any joins the caller needs.

use crate::fragment::{Placeholders, SqlFragment};
use serde::Deserialize;

/// Optional job search criteria. `None` means no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FilterCriteria {
    pub min_salary: Option<i32>,
    pub has_equity: Option<bool>,
    pub title: Option<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_salary(mut self, salary: i32) -> Self {
        self.min_salary = Some(salary);
        self
    }

    pub fn has_equity(mut self, has_equity: bool) -> Self {
        self.has_equity = Some(has_equity);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Ordering appended to every search.
pub const ORDER_BY_TITLE: &str = " ORDER BY title ";

/// Escape `%`, `_` and `\` so `input` matches literally inside a LIKE pattern.
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Append the predicates active in `criteria` to `base`.
///
/// Predicates appear in a fixed order (salary, equity, title) joined by `AND`.
/// Only predicates that bind a value take a placeholder index.
pub fn build_filter_query(base: &str, criteria: &FilterCriteria) -> SqlFragment {
    let mut params = Placeholders::new();
    let mut predicates: Vec<String> = Vec::new();

    if let Some(min_salary) = criteria.min_salary {
        let mut p = String::from("j.salary >= ");
        params.push_bind(&mut p, min_salary);
        predicates.push(p);
    }

    if criteria.has_equity == Some(true) {
        predicates.push("j.equity > 0".to_string());
    }

    if let Some(title) = criteria.title.as_deref().filter(|t| !t.is_empty()) {
        let mut p = String::from("j.title ILIKE ");
        params.push_bind(&mut p, format!("%{}%", escape_like(title)));
        predicates.push(p);
    }

    let mut sql = String::with_capacity(base.len() + 64);
    sql.push_str(base);
    if !predicates.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&predicates.join(" AND "));
    }
    sql.push_str(ORDER_BY_TITLE);

    params.finish(sql)
}
