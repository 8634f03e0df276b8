//! Mods for SQLite `INSERT`.

use super::InsertQuery;
use crate::clause::{ConflictClause, Table};
use crate::expr::{Wrapped, op, quote};
use crate::expression::{Expr, IntoExpr};
use crate::mods::Mod;
use crate::query::{Query, SubQuery};

pub use super::{or_abort, or_fail, or_ignore, or_replace, or_rollback};
pub use crate::mods::{
    CteChain, Recursive, after_preload, contextual, hook, mapper_mod, preload, returning,
    with,
};

pub fn recursive(r: bool) -> Recursive {
    Recursive(r)
}

/// `INTO table`; replaces any earlier target.
#[derive(Debug, Clone)]
pub struct IntoTable(pub Table);

pub fn into(name: impl IntoExpr) -> IntoTable {
    IntoTable(Table::new(name.into_expr()))
}

/// `INTO table AS "alias" ("c1", "c2")`
pub fn into_as<I>(name: impl IntoExpr, alias: impl Into<String>, columns: I) -> IntoTable
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    IntoTable(Table::new(name.into_expr()).as_(alias, columns))
}

impl IntoTable {
    /// `("c1", "c2")` after the table name.
    pub fn columns<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.0.columns.extend(columns.into_iter().map(Into::into));
        self
    }
}

impl Mod<InsertQuery> for IntoTable {
    fn apply(&self, q: &mut InsertQuery) {
        q.table = self.0.clone();
    }
}

/// One row of `VALUES`.
#[derive(Debug, Clone)]
pub struct ValuesMod(pub Vec<Expr>);

pub fn values<I>(exprs: I) -> ValuesMod
where
    I: IntoIterator,
    I::Item: IntoExpr,
{
    ValuesMod(exprs.into_iter().map(IntoExpr::into_expr).collect())
}

impl Mod<InsertQuery> for ValuesMod {
    fn apply(&self, q: &mut InsertQuery) {
        q.values.append_values(self.0.clone());
    }
}

/// Several rows of `VALUES` at once.
#[derive(Debug, Clone)]
pub struct Rows(pub Vec<Vec<Expr>>);

pub fn rows<I>(rows: I) -> Rows
where
    I: IntoIterator,
    I::Item: IntoIterator,
    <I::Item as IntoIterator>::Item: IntoExpr,
{
    Rows(
        rows.into_iter()
            .map(|row| row.into_iter().map(IntoExpr::into_expr).collect())
            .collect(),
    )
}

impl Mod<InsertQuery> for Rows {
    fn apply(&self, q: &mut InsertQuery) {
        for row in &self.0 {
            q.values.append_values(row.clone());
        }
    }
}

/// `INSERT INTO t SELECT …`
#[derive(Debug, Clone)]
pub struct QueryMod(pub SubQuery);

pub fn query(q: impl Query + 'static) -> QueryMod {
    QueryMod(SubQuery::new(q))
}

impl Mod<InsertQuery> for QueryMod {
    fn apply(&self, q: &mut InsertQuery) {
        q.values.query = Some(self.0.clone());
    }
}

/// `ON CONFLICT …` under construction.
///
/// ```ignore
/// im::on_conflict(["did"]).do_update().set("dname", "EXCLUDED.dname")
/// ```
#[derive(Debug, Clone, Default)]
pub struct Conflict(pub ConflictClause);

/// Start an `ON CONFLICT` clause on `columns` (none for a bare `ON CONFLICT`).
///
/// Follow it with [`Conflict::do_nothing`] or [`Conflict::do_update`]; the
/// clause always writes `DO` and leaves it dangling without an action.
pub fn on_conflict<I>(columns: I) -> Conflict
where
    I: IntoIterator,
    I::Item: IntoExpr,
{
    let mut c = ConflictClause::default();
    c.target.columns = columns.into_iter().map(IntoExpr::into_expr).collect();
    Conflict(c)
}

impl Conflict {
    /// `WHERE` on the conflict target (partial index match).
    pub fn on_where(mut self, e: impl IntoExpr) -> Self {
        self.0.target.where_.push(e.into_expr());
        self
    }

    pub fn do_nothing(mut self) -> Self {
        self.0.action = "NOTHING".to_owned();
        self
    }

    pub fn do_update(mut self) -> Self {
        self.0.action = "UPDATE".to_owned();
        self
    }

    /// `col = value`, with `col` written as given.
    pub fn set(mut self, col: impl IntoExpr, value: impl IntoExpr) -> Self {
        self.0.set.set.push(op("=", col, value).into_expr());
        self
    }

    /// `"col" = EXCLUDED."col"` for each column.
    pub fn set_excluded<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        for col in columns {
            let col = col.into();
            if col.is_empty() {
                continue;
            }
            let excluded = Wrapped {
                prefix: "EXCLUDED.".to_owned(),
                expr: quote([col.clone()]).into_expr(),
                suffix: String::new(),
            };
            self.0.set.set.push(op("=", quote([col]), excluded).into_expr());
        }
        self
    }

    /// `WHERE` after `DO UPDATE SET`.
    pub fn where_(mut self, e: impl IntoExpr) -> Self {
        self.0.where_.conditions.push(e.into_expr());
        self
    }
}

impl Mod<InsertQuery> for Conflict {
    fn apply(&self, q: &mut InsertQuery) {
        q.conflict = Some(self.0.clone());
    }
}
