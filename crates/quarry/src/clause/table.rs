use super::from::write_quoted_list;
use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::QuarryResult;
use crate::expression::{Expr, Expression};
use crate::value::Param;

/// The target of an INSERT: `table [AS "alias"] [("c1", "c2")]`.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub expr: Option<Expr>,
    pub alias: String,
    pub columns: Vec<String>,
}

impl Table {
    pub fn new(expr: Expr) -> Self {
        Self {
            expr: Some(expr),
            ..Default::default()
        }
    }

    pub fn as_<I>(mut self, alias: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.alias = alias.into();
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }
}

impl Expression for Table {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        let args = match &self.expr {
            Some(e) => e.write_sql(ctx, w, d, start)?,
            None => Vec::new(),
        };

        if !self.alias.is_empty() {
            w.push_str(" AS ");
            d.write_quoted(w, &self.alias);
        }

        write_quoted_list(w, d, &self.columns, " (");

        Ok(args)
    }
}
