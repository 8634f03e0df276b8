use crate::expr::{arg, x};
use crate::expression::{Expr, IntoExpr};
use crate::mods::WhereMod;
use crate::value::Param;

/// Typed column filters: `where_col("id").eq(5)` binds `5` as an arg.
#[derive(Debug, Clone)]
pub struct WhereCol(Expr);

pub fn where_col(column: impl IntoExpr) -> WhereCol {
    WhereCol(column.into_expr())
}

impl WhereCol {
    fn cmp(&self, op: &str, val: impl Into<Param>) -> WhereMod {
        WhereMod(x(self.0.clone()).op(op, arg([val.into()])).into_expr())
    }

    pub fn eq(&self, val: impl Into<Param>) -> WhereMod {
        self.cmp("=", val)
    }

    pub fn ne(&self, val: impl Into<Param>) -> WhereMod {
        self.cmp("<>", val)
    }

    pub fn lt(&self, val: impl Into<Param>) -> WhereMod {
        self.cmp("<", val)
    }

    pub fn lte(&self, val: impl Into<Param>) -> WhereMod {
        self.cmp("<=", val)
    }

    pub fn gt(&self, val: impl Into<Param>) -> WhereMod {
        self.cmp(">", val)
    }

    pub fn gte(&self, val: impl Into<Param>) -> WhereMod {
        self.cmp(">=", val)
    }

    pub fn in_<I>(&self, vals: I) -> WhereMod
    where
        I: IntoIterator,
        I::Item: Into<Param>,
    {
        WhereMod(x(self.0.clone()).in_([arg(vals)]).into_expr())
    }

    pub fn not_in<I>(&self, vals: I) -> WhereMod
    where
        I: IntoIterator,
        I::Item: Into<Param>,
    {
        WhereMod(x(self.0.clone()).not_in([arg(vals)]).into_expr())
    }

    pub fn is_null(&self) -> WhereMod {
        WhereMod(x(self.0.clone()).is_null().into_expr())
    }

    pub fn is_not_null(&self) -> WhereMod {
        WhereMod(x(self.0.clone()).is_not_null().into_expr())
    }
}
