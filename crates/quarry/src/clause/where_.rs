use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::QuarryResult;
use crate::expression::{Expr, Expression, express_slice};
use crate::value::Param;

/// `WHERE c1 AND c2 …`
#[derive(Debug, Clone, Default)]
pub struct Where {
    pub conditions: Vec<Expr>,
}

impl Where {
    pub fn append_where<I>(&mut self, conditions: I)
    where
        I: IntoIterator<Item = Expr>,
    {
        self.conditions.extend(conditions);
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl Expression for Where {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        express_slice(ctx, w, d, start, &self.conditions, "WHERE ", " AND ", "")
    }
}

/// `HAVING c1 AND c2 …`
#[derive(Debug, Clone, Default)]
pub struct Having {
    pub conditions: Vec<Expr>,
}

impl Having {
    pub fn append_having<I>(&mut self, conditions: I)
    where
        I: IntoIterator<Item = Expr>,
    {
        self.conditions.extend(conditions);
    }
}

impl Expression for Having {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        express_slice(ctx, w, d, start, &self.conditions, "HAVING ", " AND ", "")
    }
}
