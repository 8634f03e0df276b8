use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::QuarryResult;
use crate::expression::{Expr, Expression, IntoExpr, express_if};
use crate::value::Param;

/// `CAST(e AS type)`
#[derive(Debug, Clone)]
pub struct Cast {
    expr: Expr,
    type_name: String,
}

pub fn cast(e: impl IntoExpr, type_name: impl Into<String>) -> Cast {
    Cast {
        expr: e.into_expr(),
        type_name: type_name.into(),
    }
}

impl Expression for Cast {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        let suffix = format!(" AS {})", self.type_name);
        express_if(ctx, w, d, start, &self.expr, true, "CAST(", &suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::sqlite::Sqlite;
    use crate::expr::arg;

    #[test]
    fn wraps_the_expression() {
        let mut w = String::new();
        let args = cast(arg(["12"]), "INTEGER")
            .write_sql(&Context::new(), &mut w, &Sqlite, 3)
            .unwrap();
        assert_eq!(w, "CAST(?3 AS INTEGER)");
        assert_eq!(args.len(), 1);
    }
}
