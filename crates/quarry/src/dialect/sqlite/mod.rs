//! SQLite: `?N` placeholders, `:name` named placeholders, `"ident"` quoting.
//!
//! Statements are started with [`select`], [`insert`], [`update`],
//! [`delete`], [`values`] or [`raw`] and shaped with the mods in [`sm`],
//! [`im`], [`um`] and [`dm`].
//!
//! ```ignore
//! use quarry::dialect::sqlite::{self, sm};
//! use quarry::expr::{arg, x};
//!
//! let q = sqlite::select((
//!     sm::columns(["id", "name"]),
//!     sm::from("users"),
//!     sm::where_(x("id").in_([arg([100, 200, 300])])),
//! ));
//! let (sql, args) = q.build(&Default::default())?;
//! ```

mod delete;
mod insert;
mod select;
mod update;
mod values;
mod where_col;

pub mod dm;
pub mod im;
pub mod sm;
pub mod um;

#[cfg(test)]
mod tests;

pub use delete::DeleteQuery;
pub use insert::InsertQuery;
pub use select::SelectQuery;
pub use update::UpdateQuery;
pub use values::ValuesQuery;
pub use where_col::{WhereCol, where_col};

use super::{Dialect, NamedArgDialect, write_double_quoted};
use crate::clause::FromItem;
use crate::context::Context;
use crate::error::QuarryResult;
use crate::expr::{Clause, RawArg};
use crate::expression::{Expression, IntoExpr, express_if, express_slice};
use crate::mods::Mod;
use crate::query::{BaseQuery, QueryBody, QueryType};
use crate::value::Param;

#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

pub static DIALECT: Sqlite = Sqlite;

impl Dialect for Sqlite {
    fn write_arg(&self, w: &mut String, position: usize) {
        w.push('?');
        w.push_str(&position.to_string());
    }

    fn write_quoted(&self, w: &mut String, ident: &str) {
        write_double_quoted(w, ident);
    }

    fn named_args(&self) -> Option<&dyn NamedArgDialect> {
        Some(self)
    }
}

impl NamedArgDialect for Sqlite {
    fn write_named_arg(&self, w: &mut String, name: &str) {
        w.push(':');
        w.push_str(name);
    }
}

pub fn select(mods: impl Mod<SelectQuery>) -> BaseQuery<SelectQuery> {
    BaseQuery::new(SelectQuery::default(), &DIALECT, QueryType::Select).with(mods)
}

pub fn insert(mods: impl Mod<InsertQuery>) -> BaseQuery<InsertQuery> {
    BaseQuery::new(InsertQuery::default(), &DIALECT, QueryType::Insert).with(mods)
}

pub fn update(mods: impl Mod<UpdateQuery>) -> BaseQuery<UpdateQuery> {
    BaseQuery::new(UpdateQuery::default(), &DIALECT, QueryType::Update).with(mods)
}

pub fn delete(mods: impl Mod<DeleteQuery>) -> BaseQuery<DeleteQuery> {
    BaseQuery::new(DeleteQuery::default(), &DIALECT, QueryType::Delete).with(mods)
}

/// A standalone `VALUES (…), (…)` statement.
pub fn values<I>(rows: I) -> BaseQuery<ValuesQuery>
where
    I: IntoIterator,
    I::Item: IntoIterator,
    <I::Item as IntoIterator>::Item: IntoExpr,
{
    let mut q = ValuesQuery::default();
    for row in rows {
        q.append_values(row.into_iter().map(IntoExpr::into_expr).collect());
    }
    BaseQuery::new(q, &DIALECT, QueryType::Values)
}

/// A raw statement; see [`crate::expr::raw`] for the `?` rules.
pub fn raw<I>(query: impl Into<String>, args: I) -> BaseQuery<RawQuery>
where
    I: IntoIterator,
    I::Item: Into<RawArg>,
{
    BaseQuery::new(
        RawQuery(crate::expr::raw(query, args)),
        &DIALECT,
        QueryType::Unknown,
    )
}

/// A raw clause used as a whole statement.
#[derive(Debug, Clone)]
pub struct RawQuery(pub Clause);

impl Expression for RawQuery {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        self.0.write_sql(ctx, w, d, start)
    }
}

impl QueryBody for RawQuery {}

/// Statements with an `OR <action>` conflict resolution.
pub trait HasOr {
    fn set_or(&mut self, action: &'static str);
}

/// `INSERT OR …` / `UPDATE OR …`
#[derive(Debug, Clone, Copy)]
pub struct OrMod(pub &'static str);

impl<Q: HasOr> Mod<Q> for OrMod {
    fn apply(&self, q: &mut Q) {
        q.set_or(self.0);
    }
}

pub fn or_abort() -> OrMod {
    OrMod("ABORT")
}

pub fn or_fail() -> OrMod {
    OrMod("FAIL")
}

pub fn or_ignore() -> OrMod {
    OrMod("IGNORE")
}

pub fn or_replace() -> OrMod {
    OrMod("REPLACE")
}

pub fn or_rollback() -> OrMod {
    OrMod("ROLLBACK")
}

/// Statements with a primary table reference that [`FromChain`] can set.
pub trait Fromable {
    fn table_ref_mut(&mut self) -> &mut FromItem;
}

/// The primary table of a statement: `from("users").as_("u")`.
///
/// Applying it replaces the table, alias and index hint but keeps joins
/// already attached.
#[derive(Debug, Clone)]
pub struct FromChain(FromItem);

pub fn from(table: impl IntoExpr) -> FromChain {
    FromChain(FromItem::new(table.into_expr()))
}

impl FromChain {
    pub fn as_(mut self, alias: impl Into<String>) -> Self {
        self.0.alias = alias.into();
        self
    }

    /// `AS alias (col, …)`
    pub fn as_columns<I>(mut self, alias: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.0.set_table_alias(alias, columns);
        self
    }

    pub fn indexed_by(mut self, index: impl Into<String>) -> Self {
        self.0.indexed_by = Some(index.into());
        self
    }

    pub fn not_indexed(mut self) -> Self {
        self.0.indexed_by = Some(String::new());
        self
    }
}

impl<Q: Fromable> Mod<Q> for FromChain {
    fn apply(&self, q: &mut Q) {
        let target = q.table_ref_mut();
        target.table = self.0.table.clone();
        target.alias = self.0.alias.clone();
        target.columns = self.0.columns.clone();
        target.indexed_by = self.0.indexed_by.clone();
    }
}

/// Accumulates args while a statement writes its clauses in order.
pub(crate) struct StmtWriter<'a> {
    ctx: &'a Context,
    w: &'a mut String,
    d: &'a dyn Dialect,
    start: usize,
    args: Vec<Param>,
}

impl<'a> StmtWriter<'a> {
    pub(crate) fn new(ctx: &'a Context, w: &'a mut String, d: &'a dyn Dialect, start: usize) -> Self {
        Self {
            ctx,
            w,
            d,
            start,
            args: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, s: &str) {
        self.w.push_str(s);
    }

    pub(crate) fn write(&mut self, e: &dyn Expression) -> QuarryResult<()> {
        let args = e.write_sql(self.ctx, self.w, self.d, self.start + self.args.len())?;
        self.args.extend(args);
        Ok(())
    }

    pub(crate) fn write_if(
        &mut self,
        e: &dyn Expression,
        cond: bool,
        prefix: &str,
        suffix: &str,
    ) -> QuarryResult<()> {
        let start = self.start + self.args.len();
        let args = express_if(self.ctx, self.w, self.d, start, e, cond, prefix, suffix)?;
        self.args.extend(args);
        Ok(())
    }

    pub(crate) fn write_slice<E: Expression>(
        &mut self,
        items: &[E],
        prefix: &str,
        sep: &str,
        suffix: &str,
    ) -> QuarryResult<()> {
        let start = self.start + self.args.len();
        let args = express_slice(self.ctx, self.w, self.d, start, items, prefix, sep, suffix)?;
        self.args.extend(args);
        Ok(())
    }

    pub(crate) fn finish(self) -> Vec<Param> {
        self.args
    }
}

/// Implement capability traits by pointing each at a field.
macro_rules! capabilities {
    ($ty:ty { $($trait:ident :: $method:ident => $field:ident : $fty:ty),* $(,)? }) => {
        $(
            impl $trait for $ty {
                fn $method(&mut self) -> &mut $fty {
                    &mut self.$field
                }
            }
        )*
    };
}

pub(crate) use capabilities;
