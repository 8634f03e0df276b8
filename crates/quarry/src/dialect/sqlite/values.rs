use crate::clause::ValuesRow;
use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::{QuarryError, QuarryResult};
use crate::expression::{Expr, Expression, express_slice};
use crate::query::QueryBody;
use crate::value::Param;

/// A row-value list usable as a statement of its own.
///
/// <https://www.sqlite.org/rowvalue.html>
#[derive(Debug, Clone, Default)]
pub struct ValuesQuery {
    pub rows: Vec<ValuesRow>,
}

impl ValuesQuery {
    /// Append one row; an empty row is ignored.
    pub fn append_values(&mut self, vals: Vec<Expr>) {
        if vals.is_empty() {
            return;
        }
        self.rows.push(ValuesRow(vals));
    }
}

impl Expression for ValuesQuery {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        if self.rows.is_empty() {
            return Err(QuarryError::EmptyValues);
        }

        express_slice(ctx, w, d, start, &self.rows, "VALUES ", ", ", "")
    }
}

impl QueryBody for ValuesQuery {}
