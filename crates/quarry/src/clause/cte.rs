use super::from::write_quoted_list;
use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::QuarryResult;
use crate::expression::{Expr, Expression, express_slice};
use crate::query::SubQuery;
use crate::value::Param;

pub const SEARCH_BREADTH: &str = "BREADTH";
pub const SEARCH_DEPTH: &str = "DEPTH";

/// A common table expression, `name(cols) AS [[NOT] MATERIALIZED] (query)`.
#[derive(Debug, Clone, Default)]
pub struct Cte {
    pub name: String,
    pub columns: Vec<String>,
    pub materialized: Option<bool>,
    pub query: Option<SubQuery>,
    pub search: CteSearch,
    pub cycle: CteCycle,
}

impl Expression for Cte {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        w.push_str(&self.name);
        write_quoted_list(w, d, &self.columns, "(");
        w.push_str(" AS ");

        match self.materialized {
            None => {}
            Some(true) => w.push_str("MATERIALIZED "),
            Some(false) => w.push_str("NOT MATERIALIZED "),
        }

        w.push('(');
        let mut args = match &self.query {
            Some(q) => q.write_query(ctx, w, start)?,
            None => Vec::new(),
        };
        w.push(')');

        if !self.search.columns.is_empty() {
            w.push('\n');
            let s = self.search.write_sql(ctx, w, d, start + args.len())?;
            args.extend(s);
        }

        if !self.cycle.columns.is_empty() {
            w.push('\n');
            let c = self.cycle.write_sql(ctx, w, d, start + args.len())?;
            args.extend(c);
        }

        Ok(args)
    }
}

/// `SEARCH BREADTH|DEPTH FIRST BY cols SET column`
#[derive(Debug, Clone, Default)]
pub struct CteSearch {
    pub order: String,
    pub columns: Vec<String>,
    pub set: String,
}

impl Expression for CteSearch {
    fn write_sql(
        &self,
        _ctx: &Context,
        w: &mut String,
        _d: &dyn Dialect,
        _start: usize,
    ) -> QuarryResult<Vec<Param>> {
        w.push_str("SEARCH ");
        w.push_str(&self.order);
        w.push_str(" FIRST BY ");
        w.push_str(&self.columns.join(", "));
        w.push_str(" SET ");
        w.push_str(&self.set);
        Ok(Vec::new())
    }
}

/// `CYCLE cols SET column [TO value DEFAULT value] USING path`
#[derive(Debug, Clone, Default)]
pub struct CteCycle {
    pub columns: Vec<String>,
    pub set: String,
    pub using: String,
    pub set_val: Option<Expr>,
    pub default_val: Option<Expr>,
}

impl Expression for CteCycle {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        w.push_str("CYCLE ");
        w.push_str(&self.columns.join(", "));
        w.push_str(" SET ");
        w.push_str(&self.set);

        let mut args = Vec::new();
        if let Some(v) = &self.set_val {
            w.push_str(" TO ");
            args.extend(v.write_sql(ctx, w, d, start)?);
        }

        if let Some(v) = &self.default_val {
            w.push_str(" DEFAULT ");
            let more = v.write_sql(ctx, w, d, start + args.len())?;
            args.extend(more);
        }

        w.push_str(" USING ");
        w.push_str(&self.using);

        Ok(args)
    }
}

/// `WITH [RECURSIVE] cte1, cte2 …`
#[derive(Debug, Clone, Default)]
pub struct With {
    pub recursive: bool,
    pub ctes: Vec<Cte>,
}

impl With {
    pub fn append_cte(&mut self, cte: Cte) {
        self.ctes.push(cte);
    }

    pub fn set_recursive(&mut self, recursive: bool) {
        self.recursive = recursive;
    }

    pub fn is_empty(&self) -> bool {
        self.ctes.is_empty()
    }
}

impl Expression for With {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        let prefix = if self.recursive {
            "WITH RECURSIVE\n"
        } else {
            "WITH\n"
        };
        express_slice(ctx, w, d, start, &self.ctes, prefix, ",\n", "")
    }
}
