//! Mods for SQLite `UPDATE`.

use super::UpdateQuery;
use crate::expr::{op, quote};
use crate::expression::{Expr, IntoExpr};
use crate::mods::{HasSet, Mod};

pub use super::{FromChain, from, or_abort, or_fail, or_ignore, or_replace, or_rollback};
pub use crate::mods::{
    CteChain, JoinChain, Recursive, after_preload, contextual, cross_join, full_join, hook,
    inner_join, left_join, limit, mapper_mod, offset, preload, returning, right_join, where_,
    with,
};

pub fn recursive(r: bool) -> Recursive {
    Recursive(r)
}

/// Sets part of the table being updated.
#[derive(Debug, Clone)]
pub enum TableMod {
    Name(Expr),
    NameAs(Expr, String),
    IndexedBy(String),
    NotIndexed,
}

pub fn table(name: impl IntoExpr) -> TableMod {
    TableMod::Name(name.into_expr())
}

pub fn table_as(name: impl IntoExpr, alias: impl Into<String>) -> TableMod {
    TableMod::NameAs(name.into_expr(), alias.into())
}

pub fn table_indexed_by(index: impl Into<String>) -> TableMod {
    TableMod::IndexedBy(index.into())
}

pub fn table_not_indexed() -> TableMod {
    TableMod::NotIndexed
}

impl Mod<UpdateQuery> for TableMod {
    fn apply(&self, q: &mut UpdateQuery) {
        match self {
            TableMod::Name(name) => q.table.set_table(name.clone()),
            TableMod::NameAs(name, alias) => {
                q.table.set_table(name.clone());
                q.table.alias = alias.clone();
            }
            TableMod::IndexedBy(index) => q.table.set_indexed_by(Some(index.clone())),
            TableMod::NotIndexed => q.table.set_indexed_by(Some(String::new())),
        }
    }
}

/// Raw assignment expressions appended to `SET`.
#[derive(Debug, Clone)]
pub struct SetMod(pub Vec<Expr>);

pub fn set_exprs<I>(sets: I) -> SetMod
where
    I: IntoIterator,
    I::Item: IntoExpr,
{
    SetMod(sets.into_iter().map(IntoExpr::into_expr).collect())
}

/// `"col" = value`
pub fn set(col: impl Into<String>, value: impl IntoExpr) -> SetMod {
    set_col(col).to(value)
}

impl<Q: HasSet> Mod<Q> for SetMod {
    fn apply(&self, q: &mut Q) {
        q.set_mut().append_set(self.0.iter().cloned());
    }
}

/// A quoted column awaiting its new value: `set_col("kind").to(arg(["Drama"]))`.
#[derive(Debug, Clone)]
pub struct SetCol(String);

pub fn set_col(col: impl Into<String>) -> SetCol {
    SetCol(col.into())
}

impl SetCol {
    pub fn to(self, value: impl IntoExpr) -> SetMod {
        SetMod(vec![op("=", quote([self.0]), value).into_expr()])
    }

    /// Bind `value` as an arg.
    pub fn to_arg(self, value: impl Into<crate::value::Param>) -> SetMod {
        self.to(crate::expr::arg([value.into()]))
    }
}
