use super::order_by::OrderDef;
use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::{QuarryError, QuarryResult};
use crate::expression::{Expr, Expression, IntoExpr, RawSql, express_slice};
use crate::value::Param;

/// A window definition, as used by `OVER (…)` and `WINDOW name AS (…)`.
#[derive(Debug, Clone, Default)]
pub struct Window {
    /// Name of an existing window to build on.
    pub from: String,
    pub partition_by: Vec<Expr>,
    pub order_by: Vec<OrderDef>,
    pub frame: Frame,
}

impl Window {
    /// A window based on the named one.
    pub fn named(from: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            ..Default::default()
        }
    }

    pub fn partition_by<I>(mut self, exprs: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        self.add_partition_by(crate::expression::exprs(exprs));
        self
    }

    pub fn order_by(mut self, order: OrderDef) -> Self {
        self.add_order_by(order);
        self
    }

    pub fn frame(mut self, frame: Frame) -> Self {
        self.frame = frame;
        self
    }

    pub fn set_from(&mut self, from: impl Into<String>) {
        self.from = from.into();
    }

    pub fn add_partition_by(&mut self, exprs: Vec<Expr>) {
        self.partition_by.extend(exprs);
    }

    pub fn add_order_by(&mut self, order: OrderDef) {
        self.order_by.push(order);
    }
}

impl Expression for Window {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        let mut args = Vec::new();
        let mut sep = "";

        if !self.from.is_empty() {
            w.push_str(&self.from);
            sep = " ";
        }

        if !self.partition_by.is_empty() {
            w.push_str(sep);
            let part = express_slice(ctx, w, d, start, &self.partition_by, "PARTITION BY ", ", ", "")?;
            args.extend(part);
            sep = " ";
        }

        if !self.order_by.is_empty() {
            w.push_str(sep);
            let order = express_slice(ctx, w, d, start + args.len(), &self.order_by, "ORDER BY ", ", ", "")?;
            args.extend(order);
            sep = " ";
        }

        if self.frame.defined {
            w.push_str(sep);
            let frame = self.frame.write_sql(ctx, w, d, start + args.len())?;
            args.extend(frame);
        }

        Ok(args)
    }
}

/// `RANGE|ROWS|GROUPS [BETWEEN] start [AND end] [EXCLUDE …]`
///
/// The mode defaults to `RANGE` and the start to `UNBOUNDED PRECEDING`.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub defined: bool,
    pub mode: String,
    pub start: Option<Expr>,
    pub end: Option<Expr>,
    pub exclusion: String,
}

impl Frame {
    pub fn range() -> Self {
        Self::with_mode("RANGE")
    }

    pub fn rows() -> Self {
        Self::with_mode("ROWS")
    }

    pub fn groups() -> Self {
        Self::with_mode("GROUPS")
    }

    fn with_mode(mode: &str) -> Self {
        let mut f = Self::default();
        f.set_mode(mode);
        f
    }

    pub fn start(mut self, start: impl IntoExpr) -> Self {
        self.set_start(start.into_expr());
        self
    }

    pub fn end(mut self, end: impl IntoExpr) -> Self {
        self.set_end(end.into_expr());
        self
    }

    /// `CURRENT ROW`, `GROUP`, `TIES` or `NO OTHERS`.
    pub fn exclude(mut self, exclusion: impl Into<String>) -> Self {
        self.set_exclusion(exclusion);
        self
    }

    pub fn set_mode(&mut self, mode: impl Into<String>) {
        self.defined = true;
        self.mode = mode.into();
    }

    pub fn set_start(&mut self, start: Expr) {
        self.defined = true;
        self.start = Some(start);
    }

    pub fn set_end(&mut self, end: Expr) {
        self.defined = true;
        self.end = Some(end);
    }

    pub fn set_exclusion(&mut self, exclusion: impl Into<String>) {
        self.defined = true;
        self.exclusion = exclusion.into();
    }
}

impl Expression for Frame {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        let mode = if self.mode.is_empty() { "RANGE" } else { self.mode.as_str() };
        if !matches!(mode, "RANGE" | "ROWS" | "GROUPS") {
            return Err(QuarryError::InvalidFrame(format!("unknown mode {mode:?}")));
        }

        w.push_str(mode);
        w.push(' ');

        if self.end.is_some() {
            w.push_str("BETWEEN ");
        }

        let mut args = match &self.start {
            Some(s) => s.write_sql(ctx, w, d, start)?,
            None => RawSql("UNBOUNDED PRECEDING".into()).write_sql(ctx, w, d, start)?,
        };

        if let Some(end) = &self.end {
            w.push_str(" AND ");
            let e = end.write_sql(ctx, w, d, start + args.len())?;
            args.extend(e);
        }

        if !self.exclusion.is_empty() {
            w.push_str(" EXCLUDE ");
            w.push_str(&self.exclusion);
        }

        Ok(args)
    }
}

/// `name AS (definition)`
#[derive(Debug, Clone)]
pub struct NamedWindow {
    pub name: String,
    pub definition: Window,
}

impl Expression for NamedWindow {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        w.push_str(&self.name);
        w.push_str(" AS (");
        let args = self.definition.write_sql(ctx, w, d, start)?;
        w.push(')');
        Ok(args)
    }
}

/// `WINDOW w1 AS (…), w2 AS (…)`
#[derive(Debug, Clone, Default)]
pub struct Windows {
    pub windows: Vec<NamedWindow>,
}

impl Windows {
    pub fn append_window(&mut self, window: NamedWindow) {
        self.windows.push(window);
    }
}

impl Expression for Windows {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        express_slice(ctx, w, d, start, &self.windows, "WINDOW ", ", ", "")
    }
}
