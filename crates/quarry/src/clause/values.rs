use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::QuarryResult;
use crate::expression::{Expr, Expression, express_slice};
use crate::query::SubQuery;
use crate::value::Param;

/// The data of an INSERT: a query, rows of values or `DEFAULT VALUES`.
#[derive(Debug, Clone, Default)]
pub struct Values {
    pub query: Option<SubQuery>,
    pub rows: Vec<Row>,
}

/// One parenthesized row of `VALUES`.
#[derive(Debug, Clone, Default)]
pub struct Row(pub Vec<Expr>);

impl Expression for Row {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        express_slice(ctx, w, d, start, &self.0, "(", ", ", ")")
    }
}

impl Values {
    /// Add a row; an empty row is ignored.
    pub fn append_values(&mut self, vals: Vec<Expr>) {
        if vals.is_empty() {
            return;
        }
        self.rows.push(Row(vals));
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_none() && self.rows.is_empty()
    }
}

impl Expression for Values {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        if let Some(q) = &self.query {
            return q.write_query(ctx, w, start);
        }

        if !self.rows.is_empty() {
            return express_slice(ctx, w, d, start, &self.rows, "VALUES ", ", ", "");
        }

        w.push_str("DEFAULT VALUES");
        Ok(Vec::new())
    }
}
