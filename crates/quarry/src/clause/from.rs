use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::QuarryResult;
use crate::expression::{Expr, Expression, express_slice};
use crate::value::Param;

pub const INNER_JOIN: &str = "INNER JOIN";
pub const LEFT_JOIN: &str = "LEFT JOIN";
pub const RIGHT_JOIN: &str = "RIGHT JOIN";
pub const FULL_JOIN: &str = "FULL JOIN";
pub const CROSS_JOIN: &str = "CROSS JOIN";
pub const STRAIGHT_JOIN: &str = "STRAIGHT_JOIN";

/// A FROM item: a table, sub-query or function, with its joins.
#[derive(Debug, Clone, Default)]
pub struct FromItem {
    pub table: Option<Expr>,
    pub alias: String,
    pub columns: Vec<String>,
    /// `Some("")` renders `NOT INDEXED`, `Some(name)` renders `INDEXED BY name`.
    pub indexed_by: Option<String>,
    pub joins: Vec<Join>,
}

impl FromItem {
    pub fn new(table: Expr) -> Self {
        Self {
            table: Some(table),
            ..Default::default()
        }
    }

    pub fn set_table(&mut self, table: Expr) {
        self.table = Some(table);
    }

    pub fn set_table_alias<I>(&mut self, alias: impl Into<String>, columns: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.alias = alias.into();
        self.columns = columns.into_iter().map(Into::into).collect();
    }

    pub fn set_indexed_by(&mut self, index: Option<String>) {
        self.indexed_by = index;
    }

    pub fn append_join(&mut self, join: Join) {
        self.joins.push(join);
    }
}

impl Expression for FromItem {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        let Some(table) = &self.table else {
            return Ok(Vec::new());
        };

        let mut args = table.write_sql(ctx, w, d, start)?;

        if !self.alias.is_empty() {
            w.push_str(" AS ");
            d.write_quoted(w, &self.alias);
        }

        write_quoted_list(w, d, &self.columns, "(");

        match self.indexed_by.as_deref() {
            None => {}
            Some("") => w.push_str(" NOT INDEXED"),
            Some(index) => {
                w.push_str(" INDEXED BY ");
                w.push_str(index);
            }
        }

        let joins = express_slice(ctx, w, d, start + args.len(), &self.joins, "\n", "\n", "")?;
        args.extend(joins);

        Ok(args)
    }
}

/// `[NATURAL] <type> <to> [ON …] [USING (…)]`
#[derive(Debug, Clone, Default)]
pub struct Join {
    pub kind: String,
    pub to: FromItem,
    pub natural: bool,
    pub on: Vec<Expr>,
    pub using: Vec<String>,
}

impl Join {
    pub fn new(kind: impl Into<String>, to: Expr) -> Self {
        Self {
            kind: kind.into(),
            to: FromItem::new(to),
            ..Default::default()
        }
    }
}

impl Expression for Join {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        if self.natural {
            w.push_str("NATURAL ");
        }

        w.push_str(&self.kind);
        w.push(' ');

        let mut args = self.to.write_sql(ctx, w, d, start)?;

        let on = express_slice(ctx, w, d, start + args.len(), &self.on, " ON ", " AND ", "")?;
        args.extend(on);

        if !self.using.is_empty() {
            w.push_str(" USING");
            write_quoted_list(w, d, &self.using, "(");
        }

        Ok(args)
    }
}

pub(super) fn write_quoted_list(w: &mut String, d: &dyn Dialect, names: &[String], open: &str) {
    if names.is_empty() {
        return;
    }

    w.push_str(open);
    for (k, name) in names.iter().enumerate() {
        if k != 0 {
            w.push_str(", ");
        }
        d.write_quoted(w, name);
    }
    w.push(')');
}
