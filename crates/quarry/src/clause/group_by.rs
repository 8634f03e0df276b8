use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::QuarryResult;
use crate::expression::{Expr, Expression, express_slice};
use crate::value::Param;

/// `GROUP BY [DISTINCT] g1, g2 [WITH ROLLUP|CUBE]`
#[derive(Debug, Clone, Default)]
pub struct GroupBy {
    pub groups: Vec<Expr>,
    pub distinct: bool,
    pub with: String,
}

impl GroupBy {
    pub fn append_group(&mut self, e: Expr) {
        self.groups.push(e);
    }
}

impl Expression for GroupBy {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        if self.groups.is_empty() {
            return Ok(Vec::new());
        }

        w.push_str("GROUP BY ");
        if self.distinct {
            w.push_str("DISTINCT ");
        }

        let args = express_slice(ctx, w, d, start, &self.groups, "", ", ", "")?;

        if !self.with.is_empty() {
            w.push_str(" WITH ");
            w.push_str(&self.with);
        }

        Ok(args)
    }
}
