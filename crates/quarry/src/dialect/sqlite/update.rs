use super::{Fromable, HasOr, StmtWriter, capabilities};
use crate::clause::{FromItem, Limit, Offset, Returning, Set, Where, With};
use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::QuarryResult;
use crate::expression::Expression;
use crate::hooks::EmbeddedHook;
use crate::load::Load;
use crate::mods::{
    ContextualModdable, HasContextualMods, HasFrom, HasHooks, HasLimit, HasLoad, HasOffset,
    HasReturning, HasSet, HasWhere, HasWith,
};
use crate::query::QueryBody;
use crate::value::Param;

/// The parts of a SQLite `UPDATE`.
///
/// `table` is the row source being updated; `from` is the optional
/// `UPDATE … FROM` source that joins attach to.
///
/// <https://www.sqlite.org/lang_update.html>
#[derive(Debug, Clone, Default)]
pub struct UpdateQuery {
    pub with: With,
    pub or: &'static str,
    pub table: FromItem,
    pub set: Set,
    pub from: FromItem,
    pub where_: Where,
    pub returning: Returning,
    pub limit: Limit,
    pub offset: Offset,

    pub load: Load,
    pub hooks: EmbeddedHook,
    pub contextual_mods: ContextualModdable<UpdateQuery>,
}

impl UpdateQuery {
    fn write_parts(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        let mut sw = StmtWriter::new(ctx, w, d, start);

        sw.write_if(&self.with, !self.with.is_empty(), "", "\n")?;
        sw.push("UPDATE");
        if !self.or.is_empty() {
            sw.push(" OR ");
            sw.push(self.or);
        }
        sw.push(" ");
        sw.write(&self.table)?;
        sw.push(" SET\n");
        sw.write(&self.set)?;
        sw.write_if(&self.from, self.from.table.is_some(), "\nFROM ", "")?;
        sw.write_if(&self.where_, !self.where_.is_empty(), "\n", "")?;
        sw.write_if(&self.returning, self.returning.has_returning(), "\n", "")?;
        sw.write_if(&self.limit, self.limit.count.is_some(), "\n", "")?;
        sw.write_if(&self.offset, self.offset.count.is_some(), "\n", "")?;

        Ok(sw.finish())
    }
}

impl Expression for UpdateQuery {
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

impl QueryBody for UpdateQuery {
    fn hooks(&self) -> Option<&EmbeddedHook> {
        Some(&self.hooks)
    }

    fn load(&self) -> Option<&Load> {
        Some(&self.load)
    }
}

impl HasOr for UpdateQuery {
    fn set_or(&mut self, action: &'static str) {
        self.or = action;
    }
}

capabilities!(UpdateQuery {
    HasWith::with_mut => with: With,
    HasSet::set_mut => set: Set,
    Fromable::table_ref_mut => from: FromItem,
    HasFrom::from_mut => from: FromItem,
    HasWhere::where_mut => where_: Where,
    HasReturning::returning_mut => returning: Returning,
    HasLimit::limit_mut => limit: Limit,
    HasOffset::offset_mut => offset: Offset,
    HasLoad::load_mut => load: Load,
    HasHooks::hooks_mut => hooks: EmbeddedHook,
});

impl HasContextualMods for UpdateQuery {
    fn contextual_mods_mut(&mut self) -> &mut ContextualModdable<Self> {
        &mut self.contextual_mods
    }
}
