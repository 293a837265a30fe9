//! Dynamic `WHERE` clause builder for list and count queries.
//!
//! List endpoints accept a handful of optional filters. Each active filter
//! contributes one condition and one positional bind; the same builder then
//! binds its values onto both the page query and the count query so the two
//! never drift apart.

use marketplace_core::types::Timestamp;
use sqlx::postgres::PgArguments;
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::Postgres;

/// A typed value waiting to be bound to a positional parameter.
#[derive(Debug, Clone)]
pub enum BindValue {
    BigInt(i64),
    Text(String),
    Bool(bool),
    Timestamp(Timestamp),
}

/// Accumulates conditions joined with `AND`.
#[derive(Debug, Default)]
pub struct Filter {
    conditions: Vec<String>,
    binds: Vec<BindValue>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition with one bind. Every `?` in `template` is replaced by
    /// the same `$n` placeholder, so one value can feed several columns.
    pub fn push(&mut self, template: &str, value: BindValue) -> &mut Self {
        let placeholder = format!("${}", self.binds.len() + 1);
        self.conditions.push(template.replace('?', &placeholder));
        self.binds.push(value);
        self
    }

    /// Add a condition with no bind (e.g. `deleted_at IS NULL`).
    pub fn push_raw(&mut self, condition: &str) -> &mut Self {
        self.conditions.push(condition.to_string());
        self
    }

    /// Add `column = ?` when `value` is present.
    pub fn eq_i64(&mut self, column: &str, value: Option<i64>) -> &mut Self {
        if let Some(v) = value {
            self.push(&format!("{column} = ?"), BindValue::BigInt(v));
        }
        self
    }

    /// Add `column = ?` when `value` is present.
    pub fn eq_text(&mut self, column: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value {
            self.push(&format!("{column} = ?"), BindValue::Text(v.to_string()));
        }
        self
    }

    /// Case-insensitive substring match across `columns` when `term` is
    /// present and non-blank.
    pub fn search(&mut self, columns: &[&str], term: Option<&str>) -> &mut Self {
        if let Some(t) = term.map(str::trim).filter(|t| !t.is_empty()) {
            let clause = columns
                .iter()
                .map(|c| format!("{c} ILIKE ?"))
                .collect::<Vec<_>>()
                .join(" OR ");
            let pattern = format!("%{}%", escape_like(t));
            self.push(&format!("({clause})"), BindValue::Text(pattern));
        }
        self
    }

    /// Empty string when no conditions, otherwise `WHERE a AND b ...`.
    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// Index of the next free positional parameter (for LIMIT/OFFSET).
    pub fn next_index(&self) -> usize {
        self.binds.len() + 1
    }

    /// Bind all collected values onto a `query_as` query.
    pub fn bind_as<'q, O>(
        &'q self,
        mut q: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> QueryAs<'q, Postgres, O, PgArguments> {
        for value in &self.binds {
            q = match value {
                BindValue::BigInt(v) => q.bind(*v),
                BindValue::Text(v) => q.bind(v.as_str()),
                BindValue::Bool(v) => q.bind(*v),
                BindValue::Timestamp(v) => q.bind(*v),
            };
        }
        q
    }

    /// Bind all collected values onto a `query_scalar` query.
    pub fn bind_scalar<'q, O>(
        &'q self,
        mut q: QueryScalar<'q, Postgres, O, PgArguments>,
    ) -> QueryScalar<'q, Postgres, O, PgArguments> {
        for value in &self.binds {
            q = match value {
                BindValue::BigInt(v) => q.bind(*v),
                BindValue::Text(v) => q.bind(v.as_str()),
                BindValue::Bool(v) => q.bind(*v),
                BindValue::Timestamp(v) => q.bind(*v),
            };
        }
        q
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside ILIKE.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
