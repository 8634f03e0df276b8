use super::set::Set;
use super::where_::Where;
use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::QuarryResult;
use crate::expression::{Expr, Expression, express_slice};
use crate::value::Param;

/// `ON CONFLICT [target] DO NOTHING | DO UPDATE SET … [WHERE …]`
#[derive(Debug, Clone, Default)]
pub struct ConflictClause {
    /// `NOTHING` or `UPDATE`.
    pub action: String,
    pub target: ConflictTarget,
    pub set: Set,
    pub where_: Where,
}

impl Expression for ConflictClause {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        w.push_str("ON CONFLICT");

        let mut args = self.target.write_sql(ctx, w, d, start)?;

        w.push_str(" DO ");
        w.push_str(&self.action);

        if !self.set.is_empty() {
            w.push_str(" SET\n");
            let set = self.set.write_sql(ctx, w, d, start + args.len())?;
            args.extend(set);
        }

        if !self.where_.is_empty() {
            w.push('\n');
            let wh = self.where_.write_sql(ctx, w, d, start + args.len())?;
            args.extend(wh);
        }

        Ok(args)
    }
}

/// ` ON CONSTRAINT name` or ` (cols) [WHERE …]`; empty when unset.
#[derive(Debug, Clone, Default)]
pub struct ConflictTarget {
    pub constraint: String,
    pub columns: Vec<Expr>,
    pub where_: Vec<Expr>,
}

impl Expression for ConflictTarget {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        if !self.constraint.is_empty() {
            w.push_str(" ON CONSTRAINT ");
            w.push_str(&self.constraint);
            return Ok(Vec::new());
        }

        let mut args = express_slice(ctx, w, d, start, &self.columns, " (", ", ", ")")?;
        let wh = express_slice(ctx, w, d, start + args.len(), &self.where_, " WHERE ", " AND ", "")?;
        args.extend(wh);

        Ok(args)
    }
}
