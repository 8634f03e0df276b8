use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::QuarryResult;
use crate::expression::{Expr, Expression, express_slice};
use crate::value::Param;

/// `SELECT [modifiers] columns`; no columns renders `*`.
#[derive(Debug, Clone, Default)]
pub struct SelectList {
    pub columns: Vec<Expr>,
    /// Keywords between SELECT and the columns, e.g. `DISTINCT`.
    pub modifiers: Vec<Expr>,
}

impl SelectList {
    pub fn append_select<I>(&mut self, columns: I)
    where
        I: IntoIterator<Item = Expr>,
    {
        self.columns.extend(columns);
    }
}

impl Expression for SelectList {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        w.push_str("SELECT ");

        let mut args = express_slice(ctx, w, d, start, &self.modifiers, "", " ", " ")?;

        if self.columns.is_empty() {
            w.push('*');
        } else {
            let cols = express_slice(ctx, w, d, start + args.len(), &self.columns, "", ", ", "")?;
            args.extend(cols);
        }

        Ok(args)
    }
}
