use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::QuarryResult;
use crate::expression::{Expr, Expression, IntoExpr, express_slice};
use crate::value::Param;

/// `ORDER BY o1, o2 …`
#[derive(Debug, Clone, Default)]
pub struct OrderBy {
    pub exprs: Vec<OrderDef>,
}

impl OrderBy {
    pub fn set_order_by(&mut self, orders: Vec<OrderDef>) {
        self.exprs = orders;
    }

    pub fn append_order(&mut self, order: OrderDef) {
        self.exprs.push(order);
    }
}

impl Expression for OrderBy {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        express_slice(ctx, w, d, start, &self.exprs, "ORDER BY ", ", ", "")
    }
}

/// `expr [COLLATE c] [ASC|DESC] [NULLS FIRST|LAST]`
#[derive(Debug, Clone)]
pub struct OrderDef {
    pub expr: Expr,
    pub direction: String,
    pub nulls: String,
    pub collation: String,
}

pub fn order_def(e: impl IntoExpr) -> OrderDef {
    OrderDef {
        expr: e.into_expr(),
        direction: String::new(),
        nulls: String::new(),
        collation: String::new(),
    }
}

impl OrderDef {
    pub fn asc(mut self) -> Self {
        self.direction = "ASC".into();
        self
    }

    pub fn desc(mut self) -> Self {
        self.direction = "DESC".into();
        self
    }

    pub fn nulls_first(mut self) -> Self {
        self.nulls = "FIRST".into();
        self
    }

    pub fn nulls_last(mut self) -> Self {
        self.nulls = "LAST".into();
        self
    }

    pub fn collate(mut self, collation: impl Into<String>) -> Self {
        self.collation = collation.into();
        self
    }
}

impl Expression for OrderDef {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        let args = self.expr.write_sql(ctx, w, d, start)?;

        if !self.collation.is_empty() {
            w.push_str(" COLLATE ");
            w.push_str(&self.collation);
        }

        if !self.direction.is_empty() {
            w.push(' ');
            w.push_str(&self.direction);
        }

        if !self.nulls.is_empty() {
            w.push_str(" NULLS ");
            w.push_str(&self.nulls);
        }

        Ok(args)
    }
}
