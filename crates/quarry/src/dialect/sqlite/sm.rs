//! Mods for SQLite `SELECT`.

use super::SelectQuery;
use crate::expression::{Expr, IntoExpr};
use crate::mods::Mod;

pub use super::{FromChain, from};
pub use crate::mods::{
    CteChain, JoinChain, Recursive, after_preload, contextual, cross_join, except, full_join,
    group_by, having, hook, inner_join, intersect, left_join, limit, mapper_mod, offset,
    order_by, preload, right_join, union, union_all, where_, window, with,
};

pub fn recursive(r: bool) -> Recursive {
    Recursive(r)
}

/// `SELECT DISTINCT`
#[derive(Debug, Clone, Copy)]
pub struct Distinct;

pub fn distinct() -> Distinct {
    Distinct
}

impl Mod<SelectQuery> for Distinct {
    fn apply(&self, q: &mut SelectQuery) {
        q.select.modifiers = vec!["DISTINCT".into_expr()];
    }
}

/// Append to the select list.
#[derive(Debug, Clone)]
pub struct Columns(pub Vec<Expr>);

pub fn columns<I>(columns: I) -> Columns
where
    I: IntoIterator,
    I::Item: IntoExpr,
{
    Columns(columns.into_iter().map(IntoExpr::into_expr).collect())
}

impl Mod<SelectQuery> for Columns {
    fn apply(&self, q: &mut SelectQuery) {
        q.select.append_select(self.0.iter().cloned());
    }
}
