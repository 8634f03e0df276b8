use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::{QuarryError, QuarryResult};
use crate::expression::{Expr, Expression, express_slice};
use crate::value::Param;

/// Assignments of an UPDATE or `DO UPDATE SET`, one per line.
#[derive(Debug, Clone, Default)]
pub struct Set {
    pub set: Vec<Expr>,
}

impl Set {
    pub fn append_set<I>(&mut self, exprs: I)
    where
        I: IntoIterator<Item = Expr>,
    {
        self.set.extend(exprs);
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

impl Expression for Set {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        if self.set.is_empty() {
            return Err(QuarryError::EmptySet);
        }

        express_slice(ctx, w, d, start, &self.set, "", ",\n", "")
    }
}
