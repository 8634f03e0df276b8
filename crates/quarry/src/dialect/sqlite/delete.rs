use super::{Fromable, StmtWriter, capabilities};
use crate::clause::{FromItem, Limit, Offset, OrderBy, Returning, Where, With};
use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::QuarryResult;
use crate::expression::Expression;
use crate::hooks::EmbeddedHook;
use crate::load::Load;
use crate::mods::{
    ContextualModdable, HasContextualMods, HasHooks, HasLimit, HasLoad, HasOffset, HasOrderBy,
    HasReturning, HasWhere, HasWith,
};
use crate::query::QueryBody;
use crate::value::Param;

/// The parts of a SQLite `DELETE`.
///
/// <https://www.sqlite.org/lang_delete.html>
#[derive(Debug, Clone, Default)]
pub struct DeleteQuery {
    pub with: With,
    pub table: FromItem,
    pub where_: Where,
    pub returning: Returning,
    pub order_by: OrderBy,
    pub limit: Limit,
    pub offset: Offset,

    pub load: Load,
    pub hooks: EmbeddedHook,
    pub contextual_mods: ContextualModdable<DeleteQuery>,
}

impl DeleteQuery {
    fn write_parts(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        let mut sw = StmtWriter::new(ctx, w, d, start);

        sw.write_if(&self.with, !self.with.is_empty(), "", "\n")?;
        sw.push("DELETE FROM ");
        sw.write(&self.table)?;
        sw.write_if(&self.where_, !self.where_.is_empty(), "\n", "")?;
        sw.write_if(&self.returning, self.returning.has_returning(), "\n", "")?;
        sw.write_if(&self.order_by, !self.order_by.exprs.is_empty(), "\n", "")?;
        sw.write_if(&self.limit, self.limit.count.is_some(), "\n", "")?;
        sw.write_if(&self.offset, self.offset.count.is_some(), "\n", "")?;

        Ok(sw.finish())
    }
}

impl Expression for DeleteQuery {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        if self.contextual_mods.is_empty() {
            return self.write_parts(ctx, w, d, start);
        }

        let mut q = self.clone();
        let ctx = self.contextual_mods.run(ctx.clone(), &mut q)?;
        q.write_parts(&ctx, w, d, start)
    }
}

impl QueryBody for DeleteQuery {
    fn hooks(&self) -> Option<&EmbeddedHook> {
        Some(&self.hooks)
    }

    fn load(&self) -> Option<&Load> {
        Some(&self.load)
    }
}

capabilities!(DeleteQuery {
    HasWith::with_mut => with: With,
    Fromable::table_ref_mut => table: FromItem,
    HasWhere::where_mut => where_: Where,
    HasReturning::returning_mut => returning: Returning,
    HasOrderBy::order_by_mut => order_by: OrderBy,
    HasLimit::limit_mut => limit: Limit,
    HasOffset::offset_mut => offset: Offset,
    HasLoad::load_mut => load: Load,
    HasHooks::hooks_mut => hooks: EmbeddedHook,
});

impl HasContextualMods for DeleteQuery {
    fn contextual_mods_mut(&mut self) -> &mut ContextualModdable<Self> {
        &mut self.contextual_mods
    }
}
