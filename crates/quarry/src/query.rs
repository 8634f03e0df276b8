//! Queries: statements that know their own dialect.

use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::QuarryResult;
use crate::exec::Executor;
use crate::expression::Expression;
use crate::hooks::EmbeddedHook;
use crate::load::{Load, Loader};
use crate::mods::Mod;
use crate::row::MapperMod;
use crate::value::Param;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// The kind of statement a query renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryType {
    #[default]
    Unknown,
    Select,
    Insert,
    Update,
    Delete,
    Values,
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QueryType::Unknown => "UNKNOWN",
            QueryType::Select => "SELECT",
            QueryType::Insert => "INSERT",
            QueryType::Update => "UPDATE",
            QueryType::Delete => "DELETE",
            QueryType::Values => "VALUES",
        };
        f.write_str(s)
    }
}

/// A complete statement.
///
/// Besides rendering, a query may carry per-query hooks, loaders and mapper
/// mods; the defaults have none of them.
#[async_trait]
pub trait Query: Expression {
    /// Render the statement in its own dialect.
    fn write_query(&self, ctx: &Context, w: &mut String, start: usize)
    -> QuarryResult<Vec<Param>>;

    fn query_type(&self) -> QueryType {
        QueryType::Unknown
    }

    /// Run the query's own hooks, returning the context to execute with.
    async fn run_hooks(&self, ctx: Context, _exec: &dyn Executor) -> QuarryResult<Context> {
        Ok(ctx)
    }

    fn loaders(&self) -> Vec<Arc<dyn Loader>> {
        Vec::new()
    }

    fn mapper_mods(&self) -> Vec<Arc<dyn MapperMod>> {
        Vec::new()
    }
}

/// Render `q` with placeholders numbered from 1.
pub fn build(ctx: &Context, q: &dyn Query) -> QuarryResult<(String, Vec<Param>)> {
    build_n(ctx, q, 1)
}

/// Render `q` with placeholders numbered from `start`.
pub fn build_n(ctx: &Context, q: &dyn Query, start: usize) -> QuarryResult<(String, Vec<Param>)> {
    let mut w = String::new();
    let args = q.write_query(ctx, &mut w, start)?;
    Ok((w, args))
}

/// A clause container that [`BaseQuery`] can wrap.
pub trait QueryBody: Expression + Clone + 'static {
    fn hooks(&self) -> Option<&EmbeddedHook> {
        None
    }

    fn load(&self) -> Option<&Load> {
        None
    }
}

/// A clause container paired with the dialect it renders in.
///
/// Used as a sub-expression of another query it still renders with its own
/// dialect, so already-dialected fragments compose across dialects.
#[derive(Clone)]
pub struct BaseQuery<E> {
    pub expression: E,
    pub dialect: &'static dyn Dialect,
    pub query_type: QueryType,
}

impl<E: fmt::Debug> fmt::Debug for BaseQuery<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseQuery")
            .field("expression", &self.expression)
            .field("dialect", &self.dialect)
            .field("query_type", &self.query_type)
            .finish()
    }
}

impl<E: QueryBody> BaseQuery<E> {
    pub fn new(expression: E, dialect: &'static dyn Dialect, query_type: QueryType) -> Self {
        Self {
            expression,
            dialect,
            query_type,
        }
    }

    /// Apply mods to the wrapped container in place.
    pub fn apply(&mut self, mods: impl Mod<E>) -> &mut Self {
        mods.apply(&mut self.expression);
        self
    }

    /// Consuming form of [`apply`](Self::apply).
    pub fn with(mut self, mods: impl Mod<E>) -> Self {
        mods.apply(&mut self.expression);
        self
    }

    pub fn build(&self, ctx: &Context) -> QuarryResult<(String, Vec<Param>)> {
        self.build_n(ctx, 1)
    }

    pub fn build_n(&self, ctx: &Context, start: usize) -> QuarryResult<(String, Vec<Param>)> {
        build_n(ctx, self, start)
    }

    /// # Panics
    ///
    /// Panics if the query fails to render. Meant for statements built once
    /// at startup.
    pub fn must_build(&self, ctx: &Context) -> (String, Vec<Param>) {
        self.must_build_n(ctx, 1)
    }

    /// # Panics
    ///
    /// See [`must_build`](Self::must_build).
    pub fn must_build_n(&self, ctx: &Context, start: usize) -> (String, Vec<Param>) {
        match self.build_n(ctx, start) {
            Ok(built) => built,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<E: QueryBody> Expression for BaseQuery<E> {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        _d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        self.expression.write_sql(ctx, w, self.dialect, start)
    }
}

#[async_trait]
impl<E: QueryBody> Query for BaseQuery<E> {
    fn write_query(
        &self,
        ctx: &Context,
        w: &mut String,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        self.expression.write_sql(ctx, w, self.dialect, start)
    }

    fn query_type(&self) -> QueryType {
        self.query_type
    }

    async fn run_hooks(&self, ctx: Context, exec: &dyn Executor) -> QuarryResult<Context> {
        match self.expression.hooks() {
            Some(hooks) => hooks.run_hooks(ctx, exec).await,
            None => Ok(ctx),
        }
    }

    fn loaders(&self) -> Vec<Arc<dyn Loader>> {
        self.expression
            .load()
            .map(|l| l.loaders.clone())
            .unwrap_or_default()
    }

    fn mapper_mods(&self) -> Vec<Arc<dyn MapperMod>> {
        self.expression
            .load()
            .map(|l| l.mapper_mods.clone())
            .unwrap_or_default()
    }
}

/// A shared query used inside another statement (CTEs, combines, VALUES).
#[derive(Clone)]
pub struct SubQuery(Arc<dyn Query>);

impl SubQuery {
    pub fn new(q: impl Query + 'static) -> Self {
        SubQuery(Arc::new(q))
    }

    pub fn write_query(
        &self,
        ctx: &Context,
        w: &mut String,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        self.0.write_query(ctx, w, start)
    }
}

impl fmt::Debug for SubQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SubQuery")
            .field(&self.0.query_type())
            .finish()
    }
}

impl Expression for SubQuery {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        self.0.write_sql(ctx, w, d, start)
    }
}
