use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::QuarryResult;
use crate::expression::{Expr, Expression, express_slice};
use crate::value::Param;

/// `RETURNING e1, e2 …`
#[derive(Debug, Clone, Default)]
pub struct Returning {
    pub exprs: Vec<Expr>,
}

impl Returning {
    pub fn has_returning(&self) -> bool {
        !self.exprs.is_empty()
    }

    pub fn append_returning<I>(&mut self, exprs: I)
    where
        I: IntoIterator<Item = Expr>,
    {
        self.exprs.extend(exprs);
    }
}

impl Expression for Returning {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        express_slice(ctx, w, d, start, &self.exprs, "RETURNING ", ", ", "")
    }
}
