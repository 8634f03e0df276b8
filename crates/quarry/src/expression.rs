//! The expression writer.
//!
//! Every SQL fragment implements [`Expression::write_sql`]: given a context,
//! a writer, a dialect and the 1-based index of its first placeholder, it
//! writes itself and returns the args it bound. A sibling rendered after an
//! expression that bound `n` args starts at `start + n`.

use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::QuarryResult;
use crate::value::Param;
use std::fmt;
use std::sync::Arc;

/// Anything that can render itself as SQL.
pub trait Expression: Send + Sync {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>>;
}

/// A shared, type-erased expression.
///
/// Installed expressions are immutable, so cloning only bumps a refcount.
#[derive(Clone)]
pub struct Expr(Arc<dyn Expression>);

impl Expr {
    pub fn new<E: Expression + 'static>(e: E) -> Self {
        Expr(Arc::new(e))
    }
}

impl Expression for Expr {
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

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Expr").field(&"<dyn Expression>").finish()
    }
}

/// Verbatim SQL text; binds nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSql(pub String);

impl Expression for RawSql {
    fn write_sql(
        &self,
        _ctx: &Context,
        w: &mut String,
        _d: &dyn Dialect,
        _start: usize,
    ) -> QuarryResult<Vec<Param>> {
        w.push_str(&self.0);
        Ok(Vec::new())
    }
}

/// Conversion into an [`Expr`].
///
/// Strings and byte buffers become verbatim SQL, native numbers are written
/// as literals, and any [`Expression`] is used as-is.
pub trait IntoExpr {
    fn into_expr(self) -> Expr;
}

impl<E: Expression + 'static> IntoExpr for E {
    fn into_expr(self) -> Expr {
        Expr::new(self)
    }
}

impl IntoExpr for &str {
    fn into_expr(self) -> Expr {
        Expr::new(RawSql(self.to_owned()))
    }
}

impl IntoExpr for String {
    fn into_expr(self) -> Expr {
        Expr::new(RawSql(self))
    }
}

impl IntoExpr for &String {
    fn into_expr(self) -> Expr {
        Expr::new(RawSql(self.clone()))
    }
}

impl IntoExpr for Vec<u8> {
    fn into_expr(self) -> Expr {
        Expr::new(RawSql(String::from_utf8_lossy(&self).into_owned()))
    }
}

macro_rules! literal_into_expr {
    ($($ty:ty),*) => {
        $(
            impl IntoExpr for $ty {
                fn into_expr(self) -> Expr {
                    Expr::new(RawSql(self.to_string()))
                }
            }
        )*
    };
}

literal_into_expr!(i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64, bool);

/// Collect anything iterable into a list of expressions.
pub fn exprs<I>(items: I) -> Vec<Expr>
where
    I: IntoIterator,
    I::Item: IntoExpr,
{
    items.into_iter().map(IntoExpr::into_expr).collect()
}

/// Render `e` at `start`.
pub fn express(
    ctx: &Context,
    w: &mut String,
    d: &dyn Dialect,
    start: usize,
    e: &dyn Expression,
) -> QuarryResult<Vec<Param>> {
    e.write_sql(ctx, w, d, start)
}

/// Render `prefix`, `e`, `suffix` when `cond` holds; otherwise write nothing.
#[allow(clippy::too_many_arguments)]
pub fn express_if(
    ctx: &Context,
    w: &mut String,
    d: &dyn Dialect,
    start: usize,
    e: &dyn Expression,
    cond: bool,
    prefix: &str,
    suffix: &str,
) -> QuarryResult<Vec<Param>> {
    if !cond {
        return Ok(Vec::new());
    }

    w.push_str(prefix);
    let args = e.write_sql(ctx, w, d, start)?;
    w.push_str(suffix);
    Ok(args)
}

/// [`express_if`] over an optional expression.
pub fn express_opt<E: Expression>(
    ctx: &Context,
    w: &mut String,
    d: &dyn Dialect,
    start: usize,
    e: Option<&E>,
    prefix: &str,
    suffix: &str,
) -> QuarryResult<Vec<Param>> {
    match e {
        Some(e) => express_if(ctx, w, d, start, e, true, prefix, suffix),
        None => Ok(Vec::new()),
    }
}

/// Render each element separated by `sep`, threading the running start.
/// An empty slice writes nothing, not even the prefix.
#[allow(clippy::too_many_arguments)]
pub fn express_slice<E: Expression>(
    ctx: &Context,
    w: &mut String,
    d: &dyn Dialect,
    start: usize,
    items: &[E],
    prefix: &str,
    sep: &str,
    suffix: &str,
) -> QuarryResult<Vec<Param>> {
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let mut args = Vec::new();
    w.push_str(prefix);
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            w.push_str(sep);
        }
        let new = item.write_sql(ctx, w, d, start + args.len())?;
        args.extend(new);
    }
    w.push_str(suffix);
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::sqlite::Sqlite;
    use crate::expr::arg;

    fn render(e: &dyn Expression, start: usize) -> (String, Vec<Param>) {
        let mut w = String::new();
        let args = express(&Context::new(), &mut w, &Sqlite, start, e).unwrap();
        (w, args)
    }

    #[test]
    fn strings_are_verbatim() {
        let (sql, args) = render(&"a.b".into_expr(), 1);
        assert_eq!(sql, "a.b");
        assert!(args.is_empty());
    }

    #[test]
    fn numbers_are_literals() {
        assert_eq!(render(&42_i64.into_expr(), 1).0, "42");
        assert_eq!(render(&1.5_f64.into_expr(), 1).0, "1.5");
    }

    #[test]
    fn express_if_skips_everything_when_false() {
        let mut w = String::new();
        let e = "x".into_expr();
        let args = express_if(&Context::new(), &mut w, &Sqlite, 1, &e, false, "(", ")").unwrap();
        assert_eq!(w, "");
        assert!(args.is_empty());
    }

    #[test]
    fn express_slice_threads_start() {
        let items = vec![
            arg([1, 2]).into_expr(),
            "x".into_expr(),
            arg([3]).into_expr(),
        ];
        let mut w = String::new();
        let args = express_slice(&Context::new(), &mut w, &Sqlite, 4, &items, "[", "; ", "]")
            .unwrap();
        assert_eq!(w, "[?4, ?5; x; ?6]");
        assert_eq!(args, vec![Param::from(1), Param::from(2), Param::from(3)]);
    }

    #[test]
    fn empty_slice_writes_no_prefix() {
        let items: Vec<Expr> = Vec::new();
        let mut w = String::new();
        express_slice(&Context::new(), &mut w, &Sqlite, 1, &items, "WHERE ", " AND ", "").unwrap();
        assert_eq!(w, "");
    }
}
