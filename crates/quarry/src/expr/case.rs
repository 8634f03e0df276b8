use super::chain::{Chain, x};
use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::{QuarryError, QuarryResult};
use crate::expression::{Expr, Expression, IntoExpr};
use crate::value::Param;

/// `CASE WHEN c THEN t … [ELSE e] END`
#[derive(Debug, Clone, Default)]
pub struct Case {
    whens: Vec<(Expr, Expr)>,
    otherwise: Option<Expr>,
}

pub fn case() -> Case {
    Case::default()
}

impl Case {
    pub fn when(mut self, condition: impl IntoExpr, then: impl IntoExpr) -> Self {
        self.whens.push((condition.into_expr(), then.into_expr()));
        self
    }

    /// Add the ELSE branch and continue as a chain.
    pub fn else_(mut self, then: impl IntoExpr) -> Chain {
        self.otherwise = Some(then.into_expr());
        x(self)
    }

    pub fn end(self) -> Chain {
        x(self)
    }
}

impl Expression for Case {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        if self.whens.is_empty() {
            return Err(QuarryError::EmptyCase);
        }

        let mut args = Vec::new();
        w.push_str("CASE");
        for (condition, then) in &self.whens {
            w.push_str(" WHEN ");
            let c = condition.write_sql(ctx, w, d, start + args.len())?;
            args.extend(c);

            w.push_str(" THEN ");
            let t = then.write_sql(ctx, w, d, start + args.len())?;
            args.extend(t);
        }

        if let Some(otherwise) = &self.otherwise {
            w.push_str(" ELSE ");
            let e = otherwise.write_sql(ctx, w, d, start + args.len())?;
            args.extend(e);
        }
        w.push_str(" END");

        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::sqlite::Sqlite;
    use crate::expr::arg;

    #[test]
    fn branches_thread_args() {
        let c = case()
            .when(x("a").eq(arg([1])), arg(["one"]))
            .when(x("a").eq(arg([2])), "'two'")
            .else_(arg(["many"]));

        let mut w = String::new();
        let args = c.write_sql(&Context::new(), &mut w, &Sqlite, 1).unwrap();
        assert_eq!(
            w,
            "CASE WHEN (a = ?1) THEN ?2 WHEN (a = ?3) THEN 'two' ELSE ?4 END"
        );
        assert_eq!(args.len(), 4);
    }

    #[test]
    fn no_when_is_an_error() {
        let mut w = String::new();
        let err = case().end().write_sql(&Context::new(), &mut w, &Sqlite, 1);
        assert!(matches!(err, Err(QuarryError::EmptyCase)));
    }
}
