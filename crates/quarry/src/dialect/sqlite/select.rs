use super::{Fromable, StmtWriter, capabilities};
use crate::clause::{
    Combine, FromItem, GroupBy, Having, Limit, Offset, OrderBy, SelectList, Where, Windows, With,
};
use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::QuarryResult;
use crate::expression::Expression;
use crate::hooks::EmbeddedHook;
use crate::load::Load;
use crate::mods::{
    ContextualModdable, HasCombines, HasContextualMods, HasFrom, HasGroupBy, HasHaving, HasHooks,
    HasLimit, HasLoad, HasOffset, HasOrderBy, HasWhere, HasWindows, HasWith,
};
use crate::query::QueryBody;
use crate::value::Param;

/// The parts of a SQLite `SELECT`.
///
/// <https://www.sqlite.org/lang_select.html>
#[derive(Debug, Clone, Default)]
pub struct SelectQuery {
    pub with: With,
    pub select: SelectList,
    pub from: FromItem,
    pub where_: Where,
    pub group_by: GroupBy,
    pub having: Having,
    pub windows: Windows,
    pub combines: Vec<Combine>,
    pub order_by: OrderBy,
    pub limit: Limit,
    pub offset: Offset,

    pub load: Load,
    pub hooks: EmbeddedHook,
    pub contextual_mods: ContextualModdable<SelectQuery>,
}

impl SelectQuery {
    fn write_parts(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        let mut sw = StmtWriter::new(ctx, w, d, start);

        sw.write_if(&self.with, !self.with.is_empty(), "", "\n")?;
        sw.write(&self.select)?;
        sw.write_if(&self.from, self.from.table.is_some(), "\nFROM ", "")?;
        sw.write_if(&self.where_, !self.where_.is_empty(), "\n", "")?;
        sw.write_if(&self.group_by, !self.group_by.groups.is_empty(), "\n", "")?;
        sw.write_if(&self.having, !self.having.conditions.is_empty(), "\n", "")?;
        sw.write_if(&self.windows, !self.windows.windows.is_empty(), "\n", "")?;
        sw.write_slice(&self.combines, "\n", "\n", "")?;
        sw.write_if(&self.order_by, !self.order_by.exprs.is_empty(), "\n", "")?;
        sw.write_if(&self.limit, self.limit.count.is_some(), "\n", "")?;
        sw.write_if(&self.offset, self.offset.count.is_some(), "\n", "")?;

        Ok(sw.finish())
    }
}

impl Expression for SelectQuery {
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

impl QueryBody for SelectQuery {
    fn hooks(&self) -> Option<&EmbeddedHook> {
        Some(&self.hooks)
    }

    fn load(&self) -> Option<&Load> {
        Some(&self.load)
    }
}

capabilities!(SelectQuery {
    HasWith::with_mut => with: With,
    Fromable::table_ref_mut => from: FromItem,
    HasFrom::from_mut => from: FromItem,
    HasWhere::where_mut => where_: Where,
    HasGroupBy::group_by_mut => group_by: GroupBy,
    HasHaving::having_mut => having: Having,
    HasWindows::windows_mut => windows: Windows,
    HasCombines::combines_mut => combines: Vec<Combine>,
    HasOrderBy::order_by_mut => order_by: OrderBy,
    HasLimit::limit_mut => limit: Limit,
    HasOffset::offset_mut => offset: Offset,
    HasLoad::load_mut => load: Load,
    HasHooks::hooks_mut => hooks: EmbeddedHook,
});

impl HasContextualMods for SelectQuery {
    fn contextual_mods_mut(&mut self) -> &mut ContextualModdable<Self> {
        &mut self.contextual_mods
    }
}
