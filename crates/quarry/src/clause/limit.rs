use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::QuarryResult;
use crate::expression::{Expr, Expression, express_opt};
use crate::value::Param;

/// `LIMIT n`; the count may be a literal or any expression.
#[derive(Debug, Clone, Default)]
pub struct Limit {
    pub count: Option<Expr>,
}

impl Limit {
    /// Replace the count; the last call wins.
    pub fn set_limit(&mut self, count: Expr) {
        self.count = Some(count);
    }
}

impl Expression for Limit {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        express_opt(ctx, w, d, start, self.count.as_ref(), "LIMIT ", "")
    }
}

/// `OFFSET n`
#[derive(Debug, Clone, Default)]
pub struct Offset {
    pub count: Option<Expr>,
}

impl Offset {
    pub fn set_offset(&mut self, count: Expr) {
        self.count = Some(count);
    }
}

impl Expression for Offset {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        express_opt(ctx, w, d, start, self.count.as_ref(), "OFFSET ", "")
    }
}
