//! Fluent expression building.

use super::group::{Group, Join, LeftRight, Parens, Wrapped};
use super::quote::quote;
use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::QuarryResult;
use crate::expression::{Expr, Expression, IntoExpr, RawSql};
use crate::value::Param;

/// A fluent builder whose methods return a new chain with the prior
/// expression on the left.
///
/// Every combinator parenthesizes its result, so chains nest without
/// precedence surprises: `x("a").eq(1).or([x("b").eq(2)])` renders as
/// `((a = 1) OR (b = 2))`.
#[derive(Debug, Clone)]
pub struct Chain {
    base: Expr,
}

/// Start a chain from `e` without wrapping it.
pub fn x(e: impl IntoExpr) -> Chain {
    Chain { base: e.into_expr() }
}

impl Chain {
    fn wrap(e: impl Expression + 'static) -> Chain {
        Chain {
            base: Expr::new(Parens(Expr::new(e))),
        }
    }

    fn lr(&self, operator: &str, target: impl IntoExpr) -> Chain {
        Self::wrap(LeftRight {
            left: self.base.clone(),
            operator: operator.to_owned(),
            right: target.into_expr(),
        })
    }

    fn joined(&self, parts: Vec<Expr>, sep: &str) -> Chain {
        Self::wrap(Join {
            exprs: parts,
            sep: sep.to_owned(),
        })
    }

    fn with_tail(&self, tail: Vec<Expr>) -> Chain {
        let mut parts = Vec::with_capacity(tail.len() + 1);
        parts.push(self.base.clone());
        parts.extend(tail);
        self.joined(parts, " ")
    }

    fn with_rest<I>(&self, rest: I, sep: &str) -> Chain
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        let mut parts = vec![self.base.clone()];
        parts.extend(rest.into_iter().map(IntoExpr::into_expr));
        self.joined(parts, sep)
    }

    /// The expression built so far.
    pub fn base(&self) -> &Expr {
        &self.base
    }

    /// Generic binary operator.
    pub fn op(self, operator: &str, target: impl IntoExpr) -> Chain {
        self.lr(operator, target)
    }

    pub fn eq(self, target: impl IntoExpr) -> Chain {
        self.lr("=", target)
    }

    pub fn ne(self, target: impl IntoExpr) -> Chain {
        self.lr("<>", target)
    }

    pub fn lt(self, target: impl IntoExpr) -> Chain {
        self.lr("<", target)
    }

    pub fn lte(self, target: impl IntoExpr) -> Chain {
        self.lr("<=", target)
    }

    pub fn gt(self, target: impl IntoExpr) -> Chain {
        self.lr(">", target)
    }

    pub fn gte(self, target: impl IntoExpr) -> Chain {
        self.lr(">=", target)
    }

    pub fn minus(self, target: impl IntoExpr) -> Chain {
        self.lr("-", target)
    }

    pub fn like(self, target: impl IntoExpr) -> Chain {
        self.lr("LIKE", target)
    }

    /// `IN (v1, v2, …)`
    pub fn in_<I>(self, vals: I) -> Chain
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        self.lr("IN", super::group::group(vals))
    }

    /// `NOT IN (v1, v2, …)`
    pub fn not_in<I>(self, vals: I) -> Chain
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        self.lr("NOT IN", super::group::group(vals))
    }

    pub fn or<I>(self, targets: I) -> Chain
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        self.with_rest(targets, " OR ")
    }

    pub fn and<I>(self, targets: I) -> Chain
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        self.with_rest(targets, " AND ")
    }

    /// `a || b || …`
    pub fn concat<I>(self, targets: I) -> Chain
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        self.with_rest(targets, " || ")
    }

    pub fn between(self, a: impl IntoExpr, b: impl IntoExpr) -> Chain {
        self.with_tail(vec![raw("BETWEEN"), a.into_expr(), raw("AND"), b.into_expr()])
    }

    pub fn not_between(self, a: impl IntoExpr, b: impl IntoExpr) -> Chain {
        self.with_tail(vec![
            raw("NOT BETWEEN"),
            a.into_expr(),
            raw("AND"),
            b.into_expr(),
        ])
    }

    pub fn is_null(self) -> Chain {
        self.with_tail(vec![raw("IS NULL")])
    }

    pub fn is_not_null(self) -> Chain {
        self.with_tail(vec![raw("IS NOT NULL")])
    }

    pub fn is_distinct_from(self, e: impl IntoExpr) -> Chain {
        self.with_tail(vec![raw("IS DISTINCT FROM"), e.into_expr()])
    }

    pub fn is_not_distinct_from(self, e: impl IntoExpr) -> Chain {
        self.with_tail(vec![raw("IS NOT DISTINCT FROM"), e.into_expr()])
    }

    /// Quote the rendered base as one identifier: `x("user id").quote()`
    /// writes `"user id"`. Meant for plain names, not for expressions with args.
    pub fn quote(self) -> Chain {
        x(QuotedBase(self.base))
    }

    /// `expr AS "alias"`; ends the chain.
    pub fn as_(self, alias: &str) -> LeftRight {
        LeftRight {
            left: self.base,
            operator: "AS".to_owned(),
            right: Expr::new(quote([alias])),
        }
    }
}

#[derive(Debug)]
struct QuotedBase(Expr);

impl Expression for QuotedBase {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        let mut name = String::new();
        let args = self.0.write_sql(ctx, &mut name, d, start)?;
        d.write_quoted(w, &name);
        Ok(args)
    }
}

fn raw(s: &str) -> Expr {
    Expr::new(RawSql(s.to_owned()))
}

impl Expression for Chain {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        self.base.write_sql(ctx, w, d, start)
    }
}

/// `(NOT e)`
pub fn not(e: impl IntoExpr) -> Chain {
    Chain::wrap(Wrapped {
        prefix: "NOT ".to_owned(),
        expr: e.into_expr(),
        suffix: String::new(),
    })
}

/// `(a OR b OR …)`
pub fn or<I>(items: I) -> Chain
where
    I: IntoIterator,
    I::Item: IntoExpr,
{
    Chain::wrap(Join {
        exprs: crate::expression::exprs(items),
        sep: " OR ".to_owned(),
    })
}

/// `(a AND b AND …)`
pub fn and<I>(items: I) -> Chain
where
    I: IntoIterator,
    I::Item: IntoExpr,
{
    Chain::wrap(Join {
        exprs: crate::expression::exprs(items),
        sep: " AND ".to_owned(),
    })
}

/// `(a || b || …)`
pub fn concat<I>(items: I) -> Chain
where
    I: IntoIterator,
    I::Item: IntoExpr,
{
    Chain::wrap(Join {
        exprs: crate::expression::exprs(items),
        sep: " || ".to_owned(),
    })
}

/// A chain over a comma-separated group, for row-value comparisons.
pub fn group_chain<I>(items: I) -> Chain
where
    I: IntoIterator,
    I::Item: IntoExpr,
{
    x(Group(crate::expression::exprs(items)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::sqlite::Sqlite;
    use crate::expr::{arg, s};

    fn render(e: &dyn Expression) -> (String, Vec<Param>) {
        let mut w = String::new();
        let args = e.write_sql(&Context::new(), &mut w, &Sqlite, 1).unwrap();
        (w, args)
    }

    #[test]
    fn in_list_of_args() {
        let (sql, args) = render(&x("id").in_([arg([100, 200, 300])]));
        assert_eq!(sql, "(id IN (?1, ?2, ?3))");
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn or_nests_chains() {
        let e = x("a").eq(arg([1])).or([x("b").eq(arg([2]))]);
        assert_eq!(render(&e).0, "((a = ?1) OR (b = ?2))");
    }

    #[test]
    fn between_and_null_checks() {
        assert_eq!(render(&x("n").between(1, 5)).0, "(n BETWEEN 1 AND 5)");
        assert_eq!(render(&x("n").not_between(1, 5)).0, "(n NOT BETWEEN 1 AND 5)");
        assert_eq!(render(&x("n").is_null()).0, "(n IS NULL)");
        assert_eq!(render(&x("n").is_not_null()).0, "(n IS NOT NULL)");
        assert_eq!(
            render(&x("n").is_distinct_from("m")).0,
            "(n IS DISTINCT FROM m)"
        );
    }

    #[test]
    fn alias_is_quoted() {
        assert_eq!(render(&x("count(*)").as_("total")).0, "count(*) AS \"total\"");
    }

    #[test]
    fn quote_wraps_the_base_in_identifier_quotes() {
        assert_eq!(render(&x("user id").quote()).0, "\"user id\"");
        assert_eq!(render(&x("n").quote().eq(arg([1]))).0, "(\"n\" = ?1)");
    }

    #[test]
    fn concat_and_not() {
        let e = concat(["EXCLUDED.dname", "d.dname"]);
        assert_eq!(render(&e).0, "(EXCLUDED.dname || d.dname)");
        assert_eq!(render(&not(x("a").eq(s("b")))).0, "(NOT (a = 'b'))");
    }

    #[test]
    fn empty_in_list_is_null_group() {
        let (sql, _) = render(&x("id").not_in(Vec::<Expr>::new()));
        assert_eq!(sql, "(id NOT IN (NULL))");
    }
}
