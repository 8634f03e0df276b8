//! Mods: the only way to change a clause container.
//!
//! A mod is a value that applies one change to a container. Mods compose:
//! tuples, arrays, vectors and [`Mods`] apply their members in order, so the
//! last mod that sets a slot wins.
//!
//! Most mods here are generic over a capability trait (`HasWhere`,
//! `HasLimit`, …) and work with any container that exposes that clause.

use crate::clause::{
    Combine, Cte, FromItem, GroupBy, Having, Join, Limit, NamedWindow, Offset, OrderBy, OrderDef,
    Returning, Set, Where, Window, Windows, With,
};
use crate::context::{Context, SkipContextualMods};
use crate::error::QuarryResult;
use crate::expression::{Expr, IntoExpr};
use crate::hooks::{EmbeddedHook, QueryHook};
use crate::load::{AfterPreloader, Load, Loader};
use crate::query::{Query, SubQuery};
use crate::row::MapperMod;
use std::fmt;
use std::sync::Arc;

/// Something that modifies a `Q`.
pub trait Mod<Q>: Send + Sync {
    fn apply(&self, q: &mut Q);
}

impl<Q> Mod<Q> for () {
    fn apply(&self, _q: &mut Q) {}
}

impl<Q, M: Mod<Q> + ?Sized> Mod<Q> for &M {
    fn apply(&self, q: &mut Q) {
        (**self).apply(q);
    }
}

impl<Q, M: Mod<Q> + ?Sized> Mod<Q> for Box<M> {
    fn apply(&self, q: &mut Q) {
        (**self).apply(q);
    }
}

impl<Q, M: Mod<Q> + ?Sized> Mod<Q> for Arc<M> {
    fn apply(&self, q: &mut Q) {
        (**self).apply(q);
    }
}

impl<Q, M: Mod<Q>> Mod<Q> for Option<M> {
    fn apply(&self, q: &mut Q) {
        if let Some(m) = self {
            m.apply(q);
        }
    }
}

impl<Q, M: Mod<Q>> Mod<Q> for Vec<M> {
    fn apply(&self, q: &mut Q) {
        for m in self {
            m.apply(q);
        }
    }
}

impl<Q, M: Mod<Q>, const N: usize> Mod<Q> for [M; N] {
    fn apply(&self, q: &mut Q) {
        for m in self {
            m.apply(q);
        }
    }
}

macro_rules! tuple_mod {
    ($($name:ident),+) => {
        impl<Q, $($name: Mod<Q>),+> Mod<Q> for ($($name,)+) {
            #[allow(non_snake_case)]
            fn apply(&self, q: &mut Q) {
                let ($($name,)+) = self;
                $($name.apply(q);)+
            }
        }
    };
}

tuple_mod!(A);
tuple_mod!(A, B);
tuple_mod!(A, B, C);
tuple_mod!(A, B, C, D);
tuple_mod!(A, B, C, D, E);
tuple_mod!(A, B, C, D, E, F);
tuple_mod!(A, B, C, D, E, F, G);
tuple_mod!(A, B, C, D, E, F, G, H);
tuple_mod!(A, B, C, D, E, F, G, H, I);
tuple_mod!(A, B, C, D, E, F, G, H, I, J);
tuple_mod!(A, B, C, D, E, F, G, H, I, J, K);
tuple_mod!(A, B, C, D, E, F, G, H, I, J, K, L);

/// A closure used as a mod.
#[derive(Clone, Copy)]
pub struct ModFn<F>(pub F);

pub fn mod_fn<Q, F>(f: F) -> ModFn<F>
where
    F: Fn(&mut Q) + Send + Sync,
{
    ModFn(f)
}

impl<Q, F> Mod<Q> for ModFn<F>
where
    F: Fn(&mut Q) + Send + Sync,
{
    fn apply(&self, q: &mut Q) {
        (self.0)(q);
    }
}

impl<F> fmt::Debug for ModFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ModFn")
    }
}

/// A heterogeneous, growable list of mods.
pub struct Mods<Q>(Vec<Box<dyn Mod<Q>>>);

impl<Q> Mods<Q> {
    pub fn new() -> Self {
        Mods(Vec::new())
    }

    pub fn push(&mut self, m: impl Mod<Q> + 'static) -> &mut Self {
        self.0.push(Box::new(m));
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<Q> Default for Mods<Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q> Mod<Q> for Mods<Q> {
    fn apply(&self, q: &mut Q) {
        for m in &self.0 {
            m.apply(q);
        }
    }
}

impl<Q> fmt::Debug for Mods<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Mods").field(&self.0.len()).finish()
    }
}

/// A mod that runs while the query is being rendered and may derive a new
/// context for the rest of the build.
pub trait ContextualMod<Q>: Send + Sync {
    fn apply(&self, ctx: Context, q: &mut Q) -> QuarryResult<Context>;
}

/// A closure used as a contextual mod.
pub struct ContextualModFn<F>(pub F);

impl<Q, F> ContextualMod<Q> for ContextualModFn<F>
where
    F: Fn(Context, &mut Q) -> QuarryResult<Context> + Send + Sync,
{
    fn apply(&self, ctx: Context, q: &mut Q) -> QuarryResult<Context> {
        (self.0)(ctx, q)
    }
}

/// The contextual mods installed on a container.
pub struct ContextualModdable<Q> {
    pub mods: Vec<Arc<dyn ContextualMod<Q>>>,
}

impl<Q> ContextualModdable<Q> {
    pub fn append_contextual_mod(&mut self, m: Arc<dyn ContextualMod<Q>>) {
        self.mods.push(m);
    }

    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }

    /// Apply every mod in order, threading the context.
    ///
    /// Does nothing when the context carries [`SkipContextualMods`].
    pub fn run(&self, mut ctx: Context, q: &mut Q) -> QuarryResult<Context> {
        if ctx.flag::<SkipContextualMods>() {
            return Ok(ctx);
        }

        for m in &self.mods {
            ctx = m.apply(ctx, q)?;
        }
        Ok(ctx)
    }
}

impl<Q> Default for ContextualModdable<Q> {
    fn default() -> Self {
        Self { mods: Vec::new() }
    }
}

impl<Q> Clone for ContextualModdable<Q> {
    fn clone(&self) -> Self {
        Self {
            mods: self.mods.clone(),
        }
    }
}

impl<Q> fmt::Debug for ContextualModdable<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextualModdable")
            .field("mods", &self.mods.len())
            .finish()
    }
}

macro_rules! capability {
    ($($(#[$meta:meta])* $trait:ident :: $method:ident -> $ty:ty;)*) => {
        $(
            $(#[$meta])*
            pub trait $trait {
                fn $method(&mut self) -> &mut $ty;
            }
        )*
    };
}

capability! {
    HasWhere::where_mut -> Where;
    HasHaving::having_mut -> Having;
    HasGroupBy::group_by_mut -> GroupBy;
    HasOrderBy::order_by_mut -> OrderBy;
    HasLimit::limit_mut -> Limit;
    HasOffset::offset_mut -> Offset;
    HasReturning::returning_mut -> Returning;
    HasWith::with_mut -> With;
    HasCombines::combines_mut -> Vec<Combine>;
    HasWindows::windows_mut -> Windows;
    /// The FROM item that joins attach to.
    HasFrom::from_mut -> FromItem;
    HasSet::set_mut -> Set;
    HasLoad::load_mut -> Load;
    HasHooks::hooks_mut -> EmbeddedHook;
}

/// Containers that accept contextual mods.
pub trait HasContextualMods: Sized {
    fn contextual_mods_mut(&mut self) -> &mut ContextualModdable<Self>;
}

/// `WHERE e` (ANDed with existing conditions).
#[derive(Debug, Clone)]
pub struct WhereMod(pub Expr);

pub fn where_(e: impl IntoExpr) -> WhereMod {
    WhereMod(e.into_expr())
}

impl<Q: HasWhere> Mod<Q> for WhereMod {
    fn apply(&self, q: &mut Q) {
        q.where_mut().conditions.push(self.0.clone());
    }
}

#[derive(Debug, Clone)]
pub struct HavingMod(pub Expr);

pub fn having(e: impl IntoExpr) -> HavingMod {
    HavingMod(e.into_expr())
}

impl<Q: HasHaving> Mod<Q> for HavingMod {
    fn apply(&self, q: &mut Q) {
        q.having_mut().conditions.push(self.0.clone());
    }
}

#[derive(Debug, Clone)]
pub struct GroupByMod(pub Expr);

pub fn group_by(e: impl IntoExpr) -> GroupByMod {
    GroupByMod(e.into_expr())
}

impl<Q: HasGroupBy> Mod<Q> for GroupByMod {
    fn apply(&self, q: &mut Q) {
        q.group_by_mut().append_group(self.0.clone());
    }
}

#[derive(Debug, Clone)]
pub struct OrderByMod(pub OrderDef);

/// Start an ORDER BY term; refine it with `asc`, `desc`, `nulls_first`, …
pub fn order_by(e: impl IntoExpr) -> OrderByMod {
    OrderByMod(crate::clause::order_def(e))
}

impl OrderByMod {
    pub fn asc(self) -> Self {
        OrderByMod(self.0.asc())
    }

    pub fn desc(self) -> Self {
        OrderByMod(self.0.desc())
    }

    pub fn nulls_first(self) -> Self {
        OrderByMod(self.0.nulls_first())
    }

    pub fn nulls_last(self) -> Self {
        OrderByMod(self.0.nulls_last())
    }

    pub fn collate(self, collation: impl Into<String>) -> Self {
        OrderByMod(self.0.collate(collation))
    }
}

impl<Q: HasOrderBy> Mod<Q> for OrderByMod {
    fn apply(&self, q: &mut Q) {
        q.order_by_mut().append_order(self.0.clone());
    }
}

#[derive(Debug, Clone)]
pub struct LimitMod(pub Expr);

pub fn limit(count: impl IntoExpr) -> LimitMod {
    LimitMod(count.into_expr())
}

impl<Q: HasLimit> Mod<Q> for LimitMod {
    fn apply(&self, q: &mut Q) {
        q.limit_mut().set_limit(self.0.clone());
    }
}

#[derive(Debug, Clone)]
pub struct OffsetMod(pub Expr);

pub fn offset(count: impl IntoExpr) -> OffsetMod {
    OffsetMod(count.into_expr())
}

impl<Q: HasOffset> Mod<Q> for OffsetMod {
    fn apply(&self, q: &mut Q) {
        q.offset_mut().set_offset(self.0.clone());
    }
}

#[derive(Debug, Clone)]
pub struct ReturningMod(pub Vec<Expr>);

pub fn returning<I>(exprs: I) -> ReturningMod
where
    I: IntoIterator,
    I::Item: IntoExpr,
{
    ReturningMod(crate::expression::exprs(exprs))
}

impl<Q: HasReturning> Mod<Q> for ReturningMod {
    fn apply(&self, q: &mut Q) {
        q.returning_mut().append_returning(self.0.iter().cloned());
    }
}

/// A CTE under construction: `with("name").columns(…).as_(query)`.
#[derive(Debug, Clone)]
pub struct CteChain(Cte);

pub fn with(name: impl Into<String>) -> CteChain {
    CteChain(Cte {
        name: name.into(),
        ..Default::default()
    })
}

impl CteChain {
    pub fn columns<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.0.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn as_(mut self, q: impl Query + 'static) -> Self {
        self.0.query = Some(SubQuery::new(q));
        self
    }

    pub fn materialized(mut self) -> Self {
        self.0.materialized = Some(true);
        self
    }

    pub fn not_materialized(mut self) -> Self {
        self.0.materialized = Some(false);
        self
    }

    /// `SEARCH BREADTH|DEPTH FIRST BY cols SET set`
    pub fn search<I>(mut self, order: &str, columns: I, set: impl Into<String>) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.0.search = crate::clause::CteSearch {
            order: order.to_owned(),
            columns: columns.into_iter().map(Into::into).collect(),
            set: set.into(),
        };
        self
    }

    /// `CYCLE cols SET set USING using`
    pub fn cycle<I>(mut self, columns: I, set: impl Into<String>, using: impl Into<String>) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.0.cycle.columns = columns.into_iter().map(Into::into).collect();
        self.0.cycle.set = set.into();
        self.0.cycle.using = using.into();
        self
    }

    /// `TO mark DEFAULT default` for the CYCLE clause.
    pub fn cycle_value(mut self, mark: impl IntoExpr, default: impl IntoExpr) -> Self {
        self.0.cycle.set_val = Some(mark.into_expr());
        self.0.cycle.default_val = Some(default.into_expr());
        self
    }
}

impl<Q: HasWith> Mod<Q> for CteChain {
    fn apply(&self, q: &mut Q) {
        q.with_mut().append_cte(self.0.clone());
    }
}

/// Mark the WITH clause `RECURSIVE`.
#[derive(Debug, Clone, Copy)]
pub struct Recursive(pub bool);

impl<Q: HasWith> Mod<Q> for Recursive {
    fn apply(&self, q: &mut Q) {
        q.with_mut().set_recursive(self.0);
    }
}

#[derive(Debug, Clone)]
pub struct CombineMod(pub Combine);

pub fn union(q: impl Query + 'static) -> CombineMod {
    CombineMod(Combine::new(crate::clause::UNION, SubQuery::new(q), false))
}

pub fn union_all(q: impl Query + 'static) -> CombineMod {
    CombineMod(Combine::new(crate::clause::UNION, SubQuery::new(q), true))
}

pub fn intersect(q: impl Query + 'static) -> CombineMod {
    CombineMod(Combine::new(crate::clause::INTERSECT, SubQuery::new(q), false))
}

pub fn except(q: impl Query + 'static) -> CombineMod {
    CombineMod(Combine::new(crate::clause::EXCEPT, SubQuery::new(q), false))
}

impl<Q: HasCombines> Mod<Q> for CombineMod {
    fn apply(&self, q: &mut Q) {
        q.combines_mut().push(self.0.clone());
    }
}

/// `WINDOW name AS (definition)`
#[derive(Debug, Clone)]
pub struct WindowMod(pub NamedWindow);

pub fn window(name: impl Into<String>, definition: Window) -> WindowMod {
    WindowMod(NamedWindow {
        name: name.into(),
        definition,
    })
}

impl<Q: HasWindows> Mod<Q> for WindowMod {
    fn apply(&self, q: &mut Q) {
        q.windows_mut().append_window(self.0.clone());
    }
}

/// A join under construction: `left_join("posts").as_("p").on(…)`.
#[derive(Debug, Clone)]
pub struct JoinChain(pub Join);

impl JoinChain {
    pub fn new(kind: &str, to: impl IntoExpr) -> Self {
        JoinChain(Join::new(kind, to.into_expr()))
    }

    pub fn as_(mut self, alias: impl Into<String>) -> Self {
        self.0.to.alias = alias.into();
        self
    }

    pub fn natural(mut self) -> Self {
        self.0.natural = true;
        self
    }

    pub fn indexed_by(mut self, index: impl Into<String>) -> Self {
        self.0.to.indexed_by = Some(index.into());
        self
    }

    pub fn not_indexed(mut self) -> Self {
        self.0.to.indexed_by = Some(String::new());
        self
    }

    pub fn on<I>(mut self, conditions: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        self.0.on.extend(conditions.into_iter().map(IntoExpr::into_expr));
        self
    }

    /// `ON left = right`
    pub fn on_eq(mut self, left: impl IntoExpr, right: impl IntoExpr) -> Self {
        self.0
            .on
            .push(crate::expr::x(left).eq(right).into_expr());
        self
    }

    pub fn using<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.0.using.extend(columns.into_iter().map(Into::into));
        self
    }
}

impl<Q: HasFrom> Mod<Q> for JoinChain {
    fn apply(&self, q: &mut Q) {
        q.from_mut().append_join(self.0.clone());
    }
}

pub fn inner_join(to: impl IntoExpr) -> JoinChain {
    JoinChain::new(crate::clause::INNER_JOIN, to)
}

pub fn left_join(to: impl IntoExpr) -> JoinChain {
    JoinChain::new(crate::clause::LEFT_JOIN, to)
}

pub fn right_join(to: impl IntoExpr) -> JoinChain {
    JoinChain::new(crate::clause::RIGHT_JOIN, to)
}

pub fn full_join(to: impl IntoExpr) -> JoinChain {
    JoinChain::new(crate::clause::FULL_JOIN, to)
}

pub fn cross_join(to: impl IntoExpr) -> JoinChain {
    JoinChain::new(crate::clause::CROSS_JOIN, to)
}

pub fn straight_join(to: impl IntoExpr) -> JoinChain {
    JoinChain::new(crate::clause::STRAIGHT_JOIN, to)
}

/// Attach a loader to the query.
#[derive(Clone)]
pub struct Preload(pub Arc<dyn Loader>);

pub fn preload(loader: impl Loader + 'static) -> Preload {
    Preload(Arc::new(loader))
}

impl<Q: HasLoad> Mod<Q> for Preload {
    fn apply(&self, q: &mut Q) {
        q.load_mut().append_loader(self.0.clone());
    }
}

/// Attach an [`AfterPreloader`] as both mapper mod and loader, so its
/// loaders run over the query's mapped values once the query is done.
pub struct AfterPreload<T>(pub Arc<AfterPreloader<T>>);

impl<T> Clone for AfterPreload<T> {
    fn clone(&self) -> Self {
        AfterPreload(self.0.clone())
    }
}

pub fn after_preload<T>(p: AfterPreloader<T>) -> AfterPreload<T>
where
    T: Send + 'static,
{
    AfterPreload(Arc::new(p))
}

impl<Q: HasLoad, T> Mod<Q> for AfterPreload<T>
where
    T: Send + 'static,
{
    fn apply(&self, q: &mut Q) {
        q.load_mut().append_after_preloader(self.0.clone());
    }
}

/// Attach a mapper mod to the query.
#[derive(Clone)]
pub struct MapperModMod(pub Arc<dyn MapperMod>);

pub fn mapper_mod(m: impl MapperMod + 'static) -> MapperModMod {
    MapperModMod(Arc::new(m))
}

impl<Q: HasLoad> Mod<Q> for MapperModMod {
    fn apply(&self, q: &mut Q) {
        q.load_mut().append_mapper_mod(self.0.clone());
    }
}

/// Attach a query-level hook.
#[derive(Clone)]
pub struct HookMod(pub Arc<dyn QueryHook>);

pub fn hook(h: impl QueryHook + 'static) -> HookMod {
    HookMod(Arc::new(h))
}

impl<Q: HasHooks> Mod<Q> for HookMod {
    fn apply(&self, q: &mut Q) {
        q.hooks_mut().append_hook(self.0.clone());
    }
}

/// Install a contextual mod.
pub struct ContextualModMod<Q>(pub Arc<dyn ContextualMod<Q>>);

/// Install a closure that runs at build time, see [`ContextualMod`].
pub fn contextual<Q, F>(f: F) -> ContextualModMod<Q>
where
    Q: 'static,
    F: Fn(Context, &mut Q) -> QuarryResult<Context> + Send + Sync + 'static,
{
    ContextualModMod(Arc::new(ContextualModFn(f)))
}

impl<Q: HasContextualMods> Mod<Q> for ContextualModMod<Q> {
    fn apply(&self, q: &mut Q) {
        q.contextual_mods_mut().append_contextual_mod(self.0.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::Limit;
    use crate::context::Context;
    use crate::dialect::sqlite::Sqlite;
    use crate::expression::Expression;

    #[derive(Default)]
    struct Probe {
        where_: Where,
        limit: Limit,
        seen: Vec<&'static str>,
    }

    impl HasWhere for Probe {
        fn where_mut(&mut self) -> &mut Where {
            &mut self.where_
        }
    }

    impl HasLimit for Probe {
        fn limit_mut(&mut self) -> &mut Limit {
            &mut self.limit
        }
    }

    fn render(e: &dyn Expression) -> String {
        let mut w = String::new();
        e.write_sql(&Context::new(), &mut w, &Sqlite, 1).unwrap();
        w
    }

    #[test]
    fn tuples_apply_in_order() {
        let mut q = Probe::default();
        (
            mod_fn(|q: &mut Probe| q.seen.push("a")),
            where_("x = 1"),
            mod_fn(|q: &mut Probe| q.seen.push("b")),
        )
            .apply(&mut q);
        assert_eq!(q.seen, vec!["a", "b"]);
        assert_eq!(render(&q.where_), "WHERE x = 1");
    }

    #[test]
    fn last_limit_wins() {
        let mut q = Probe::default();
        [limit(10), limit(20)].apply(&mut q);
        assert_eq!(render(&q.limit), "LIMIT 20");
    }

    #[test]
    fn mods_list_and_option() {
        let mut mods = Mods::<Probe>::new();
        mods.push(where_("a")).push(None::<WhereMod>).push(Some(where_("b")));
        assert_eq!(mods.len(), 3);

        let mut q = Probe::default();
        mods.apply(&mut q);
        assert_eq!(render(&q.where_), "WHERE a AND b");
    }

    #[test]
    fn contextual_mods_can_be_skipped() {
        let mut cm = ContextualModdable::<Probe>::default();
        cm.append_contextual_mod(Arc::new(ContextualModFn(|ctx: Context, q: &mut Probe| -> QuarryResult<Context> {
            q.seen.push("ran");
            Ok(ctx)
        })));

        let mut q = Probe::default();
        cm.run(crate::context::skip_contextual_mods(&Context::new()), &mut q)
            .unwrap();
        assert!(q.seen.is_empty());

        cm.run(Context::new(), &mut q).unwrap();
        assert_eq!(q.seen, vec!["ran"]);
    }
}
