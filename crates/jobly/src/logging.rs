//! SQL debug logging via `tracing`.
//!
//! Repositories call [`log_sql`] right before executing a statement. Events go
//! to the `jobly.sql` target at `DEBUG`; the application decides whether a
//! subscriber (or the `log` bridge) picks them up.

/// Longest SQL (in bytes) included in an event.
pub const MAX_SQL_LENGTH: usize = 200;

/// Truncate `sql` to at most `max_bytes`, respecting UTF-8 boundaries.
pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Emit the statement about to run for `op` (e.g. `"jobs.update"`).
pub fn log_sql(op: &str, sql: &str, param_count: usize) {
    let truncated = sql.len() > MAX_SQL_LENGTH;
    let sql = truncate_sql_bytes(sql, MAX_SQL_LENGTH);
    tracing::debug!(target: "jobly.sql", op, param_count, truncated, sql = %sql);
}
