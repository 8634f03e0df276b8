//! Grouping, joining and operator expressions.

use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::QuarryResult;
use crate::expression::{Expr, Expression, IntoExpr, RawSql, express_if, express_slice};
use crate::value::Param;

/// `(e1, e2, …)`; an empty group renders as `(NULL)`.
#[derive(Debug, Clone)]
pub struct Group(pub Vec<Expr>);

pub fn group<I>(items: I) -> Group
where
    I: IntoIterator,
    I::Item: IntoExpr,
{
    Group(crate::expression::exprs(items))
}

impl Expression for Group {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        if self.0.is_empty() {
            let null = RawSql("NULL".into());
            return express_if(ctx, w, d, start, &null, true, "(", ")");
        }

        express_slice(ctx, w, d, start, &self.0, "(", ", ", ")")
    }
}

/// `(e)`
#[derive(Debug, Clone)]
pub struct Parens(pub Expr);

pub fn p(e: impl IntoExpr) -> Parens {
    Parens(e.into_expr())
}

impl Expression for Parens {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        express_if(ctx, w, d, start, &self.0, true, "(", ")")
    }
}

/// Expressions joined by an arbitrary separator (a space by default).
#[derive(Debug, Clone)]
pub struct Join {
    pub exprs: Vec<Expr>,
    pub sep: String,
}

pub fn join<I>(items: I, sep: impl Into<String>) -> Join
where
    I: IntoIterator,
    I::Item: IntoExpr,
{
    Join {
        exprs: crate::expression::exprs(items),
        sep: sep.into(),
    }
}

impl Expression for Join {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        let sep = if self.sep.is_empty() { " " } else { self.sep.as_str() };
        express_slice(ctx, w, d, start, &self.exprs, "", sep, "")
    }
}

/// `left op right`
#[derive(Debug, Clone)]
pub struct LeftRight {
    pub left: Expr,
    pub operator: String,
    pub right: Expr,
}

/// Generic binary operator.
pub fn op(operator: impl Into<String>, left: impl IntoExpr, right: impl IntoExpr) -> LeftRight {
    LeftRight {
        left: left.into_expr(),
        operator: operator.into(),
        right: right.into_expr(),
    }
}

impl Expression for LeftRight {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        let mut args = self.left.write_sql(ctx, w, d, start)?;

        w.push(' ');
        w.push_str(&self.operator);
        w.push(' ');

        let right = self.right.write_sql(ctx, w, d, start + args.len())?;
        args.extend(right);
        Ok(args)
    }
}

/// An expression with fixed text around it.
#[derive(Debug, Clone)]
pub struct Wrapped {
    pub prefix: String,
    pub expr: Expr,
    pub suffix: String,
}

impl Expression for Wrapped {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        express_if(ctx, w, d, start, &self.expr, true, &self.prefix, &self.suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::sqlite::Sqlite;
    use crate::expr::arg;

    fn render(e: &dyn Expression) -> (String, Vec<Param>) {
        let mut w = String::new();
        let args = e.write_sql(&Context::new(), &mut w, &Sqlite, 1).unwrap();
        (w, args)
    }

    #[test]
    fn empty_group_is_null() {
        assert_eq!(render(&group(Vec::<Expr>::new())).0, "(NULL)");
    }

    #[test]
    fn group_threads_args() {
        let g = Group(vec![arg([1]).into_expr(), "b".into_expr(), arg([2]).into_expr()]);
        let (sql, args) = render(&g);
        assert_eq!(sql, "(?1, b, ?2)");
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn join_defaults_to_space() {
        assert_eq!(render(&join(["a", "b"], "")).0, "a b");
        assert_eq!(render(&join(["a", "b"], " - ")).0, "a - b");
    }

    #[test]
    fn operator_is_space_padded() {
        let (sql, args) = render(&op("=", "a", arg(["x"])));
        assert_eq!(sql, "a = ?1");
        assert_eq!(args, vec![Param::from("x")]);
    }
}
