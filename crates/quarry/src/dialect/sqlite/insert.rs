use super::{HasOr, StmtWriter, capabilities};
use crate::clause::{ConflictClause, Returning, Table, Values, With};
use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::QuarryResult;
use crate::expression::Expression;
use crate::hooks::EmbeddedHook;
use crate::load::Load;
use crate::mods::{ContextualModdable, HasContextualMods, HasHooks, HasLoad, HasReturning, HasWith};
use crate::query::QueryBody;
use crate::value::Param;

/// The parts of a SQLite `INSERT`.
///
/// <https://www.sqlite.org/lang_insert.html>
#[derive(Debug, Clone, Default)]
pub struct InsertQuery {
    pub with: With,
    pub or: &'static str,
    pub table: Table,
    pub values: Values,
    pub conflict: Option<ConflictClause>,
    pub returning: Returning,

    pub load: Load,
    pub hooks: EmbeddedHook,
    pub contextual_mods: ContextualModdable<InsertQuery>,
}

impl InsertQuery {
    fn write_parts(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        let mut sw = StmtWriter::new(ctx, w, d, start);

        sw.write_if(&self.with, !self.with.is_empty(), "", "\n")?;
        sw.push("INSERT");
        if !self.or.is_empty() {
            sw.push(" OR ");
            sw.push(self.or);
        }
        sw.push(" INTO ");
        sw.write(&self.table)?;
        sw.push("\n");
        sw.write(&self.values)?;
        if let Some(conflict) = &self.conflict {
            sw.push("\n");
            sw.write(conflict)?;
        }
        sw.write_if(&self.returning, self.returning.has_returning(), "\n", "")?;

        Ok(sw.finish())
    }
}

impl Expression for InsertQuery {
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

impl QueryBody for InsertQuery {
    fn hooks(&self) -> Option<&EmbeddedHook> {
        Some(&self.hooks)
    }

    fn load(&self) -> Option<&Load> {
        Some(&self.load)
    }
}

impl HasOr for InsertQuery {
    fn set_or(&mut self, action: &'static str) {
        self.or = action;
    }
}

capabilities!(InsertQuery {
    HasWith::with_mut => with: With,
    HasReturning::returning_mut => returning: Returning,
    HasLoad::load_mut => load: Load,
    HasHooks::hooks_mut => hooks: EmbeddedHook,
});

impl HasContextualMods for InsertQuery {
    fn contextual_mods_mut(&mut self) -> &mut ContextualModdable<Self> {
        &mut self.contextual_mods
    }
}
