//! Function calls, including aggregates and window functions.

use crate::clause::{OrderDef, Window};
use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::QuarryResult;
use crate::expression::{Expr, Expression, IntoExpr, express_slice};
use crate::value::Param;

/// `name([DISTINCT] args [ORDER BY …]) [FILTER (WHERE …)] [OVER (…)]`
///
/// Used as a FROM source it may also carry an alias and a column
/// definition list: `json_each(?1) AS "j" (key TEXT, value TEXT)`.
#[derive(Debug, Clone, Default)]
pub struct Function {
    name: String,
    args: Vec<Expr>,
    distinct: bool,
    order_by: Vec<OrderDef>,
    filter: Vec<Expr>,
    over: Option<Window>,
    alias: String,
    columns: Vec<ColumnDef>,
}

/// `name(args…)`
pub fn func<I>(name: impl Into<String>, args: I) -> Function
where
    I: IntoIterator,
    I::Item: IntoExpr,
{
    Function {
        name: name.into(),
        args: crate::expression::exprs(args),
        ..Default::default()
    }
}

impl Function {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Ordering inside the argument list, as aggregates like `group_concat` use.
    pub fn order_by(mut self, order: OrderDef) -> Self {
        self.order_by.push(order);
        self
    }

    /// Conditions for `FILTER (WHERE …)`, joined with AND.
    pub fn filter<I>(mut self, conditions: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        self.filter.extend(conditions.into_iter().map(IntoExpr::into_expr));
        self
    }

    /// Make this a window function call.
    pub fn over(mut self, window: Window) -> Self {
        self.over = Some(window);
        self
    }

    /// Alias used when the function is a FROM source.
    pub fn as_(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    /// Add a column definition, `name type`.
    pub fn col(mut self, name: impl Into<String>, data_type: impl Into<String>) -> Self {
        self.columns.push(ColumnDef {
            name: name.into(),
            data_type: data_type.into(),
        });
        self
    }
}

impl Expression for Function {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        if self.name.is_empty() {
            return Ok(Vec::new());
        }

        w.push_str(&self.name);
        w.push('(');
        if self.distinct {
            w.push_str("DISTINCT ");
        }

        let mut args = express_slice(ctx, w, d, start, &self.args, "", ", ", "")?;

        let order = express_slice(
            ctx,
            w,
            d,
            start + args.len(),
            &self.order_by,
            " ORDER BY ",
            ", ",
            "",
        )?;
        args.extend(order);
        w.push(')');

        let filter = express_slice(
            ctx,
            w,
            d,
            start + args.len(),
            &self.filter,
            " FILTER (WHERE ",
            " AND ",
            ")",
        )?;
        args.extend(filter);

        if let Some(window) = &self.over {
            w.push_str(" OVER (");
            let wargs = window.write_sql(ctx, w, d, start + args.len())?;
            args.extend(wargs);
            w.push(')');
        }

        if !self.alias.is_empty() || !self.columns.is_empty() {
            w.push_str(" AS");
        }

        if !self.alias.is_empty() {
            w.push(' ');
            d.write_quoted(w, &self.alias);
        }

        let cols = express_slice(ctx, w, d, start + args.len(), &self.columns, " (", ", ", ")")?;
        args.extend(cols);

        Ok(args)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnDef {
    name: String,
    data_type: String,
}

impl Expression for ColumnDef {
    fn write_sql(
        &self,
        _ctx: &Context,
        w: &mut String,
        _d: &dyn Dialect,
        _start: usize,
    ) -> QuarryResult<Vec<Param>> {
        w.push_str(&self.name);
        w.push(' ');
        w.push_str(&self.data_type);
        Ok(Vec::new())
    }
}
