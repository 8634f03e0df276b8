//! Prepared statements.
//!
//! [`prepare`] builds a query once, leaving its named args as slots, and
//! asks a [`Preparer`] for a persistent statement. Each call then only
//! binds a record through the [`Binder`] planned at prepare time.

use crate::bind::{BindArg, Binder};
use crate::context::Context;
use crate::error::{QuarryError, QuarryResult};
use crate::exec::{
    Cursor, ExecResult, ExecSettings, Executor, all_from_rows, log_query, one_from_rows,
};
use crate::load::{Loader, Retrieved, run_loaders};
use crate::query::{Query, QueryType, build};
use crate::row::{Mapper, MapperMod, Rows};
use crate::value::Value;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// A server-side prepared statement.
#[async_trait]
pub trait Statement: Send + Sync {
    async fn execute(&self, ctx: &Context, args: &[Value]) -> QuarryResult<ExecResult>;

    async fn query(&self, ctx: &Context, args: &[Value]) -> QuarryResult<Box<dyn Rows>>;

    async fn close(&self) -> QuarryResult<()>;
}

/// An executor that can prepare statements.
#[async_trait]
pub trait Preparer: Executor {
    async fn prepare(&self, ctx: &Context, sql: &str) -> QuarryResult<Box<dyn Statement>>;
}

/// An open transaction; itself an executor.
#[async_trait]
pub trait Transaction: Executor {
    async fn commit(&self) -> QuarryResult<()>;

    async fn rollback(&self) -> QuarryResult<()>;

    /// A transaction-specific handle for a statement prepared elsewhere.
    async fn stmt(&self, ctx: &Context, stmt: &dyn Statement)
    -> QuarryResult<Box<dyn Statement>>;
}

/// An executor that can start transactions.
#[async_trait]
pub trait Transactor: Executor {
    type Tx: Transaction + 'static;

    async fn begin(&self, ctx: &Context) -> QuarryResult<Self::Tx>;
}

/// A prepared statement that binds records of type `A`.
pub struct Stmt<A> {
    stmt: Arc<dyn Statement>,
    exec: Arc<dyn Executor>,
    binder: Binder<A>,
    loaders: Vec<Arc<dyn Loader>>,
    sql: String,
    query_type: QueryType,
}

impl<A> fmt::Debug for Stmt<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stmt")
            .field("sql", &self.sql)
            .field("query_type", &self.query_type)
            .field("binder", &self.binder)
            .field("loaders", &self.loaders.len())
            .finish()
    }
}

/// Build `q`, plan the binder for `A` and prepare the SQL on `exec`.
///
/// Query hooks are not run; a binder mismatch fails before anything is
/// prepared.
pub async fn prepare<A, P>(ctx: &Context, exec: Arc<P>, q: &dyn Query) -> QuarryResult<Stmt<A>>
where
    A: BindArg,
    P: Preparer + 'static,
{
    let (sql, args) = build(ctx, q)?;
    let binder = Binder::<A>::new(&args)?;
    let stmt = exec.prepare(ctx, &sql).await?;

    #[cfg(feature = "tracing")]
    tracing::debug!(
        target: "quarry.sql",
        query_type = %q.query_type(),
        params = binder.len(),
        sql = %sql,
        "prepared statement"
    );

    Ok(Stmt {
        stmt: Arc::from(stmt),
        exec,
        binder,
        loaders: q.loaders(),
        sql,
        query_type: q.query_type(),
    })
}

impl<A: BindArg> Stmt<A> {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Names the statement binds, in placeholder order.
    pub fn names(&self) -> Vec<String> {
        self.binder.names()
    }

    /// Execute with args bound from `arg`.
    pub async fn exec(&self, ctx: &Context, arg: &A) -> QuarryResult<ExecResult> {
        let args = self.binder.to_args(arg);
        self.exec_args(ctx, &args).await
    }

    /// Execute with a full positional arg list.
    pub async fn exec_args(&self, ctx: &Context, args: &[Value]) -> QuarryResult<ExecResult> {
        self.check_len(args)?;
        log_query(self.query_type, &self.sql, args);

        let result = self.stmt.execute(ctx, args).await?;
        run_loaders(ctx, self.exec.as_ref(), &self.loaders, Retrieved::Nothing).await?;
        Ok(result)
    }

    fn check_len(&self, args: &[Value]) -> QuarryResult<()> {
        if args.len() != self.binder.len() {
            return Err(QuarryError::MismatchedArgs {
                expected: self.binder.len(),
                got: args.len(),
            });
        }
        Ok(())
    }

    async fn open(&self, ctx: &Context, args: &[Value]) -> QuarryResult<Box<dyn Rows>> {
        self.check_len(args)?;
        log_query(self.query_type, &self.sql, args);
        self.stmt.query(ctx, args).await
    }

    /// The same statement re-homed to `tx`.
    pub async fn in_tx<T>(&self, ctx: &Context, tx: Arc<T>) -> QuarryResult<Stmt<A>>
    where
        T: Transaction + 'static,
    {
        let stmt = tx.stmt(ctx, self.stmt.as_ref()).await?;
        Ok(Stmt {
            stmt: Arc::from(stmt),
            exec: tx,
            binder: self.binder.clone(),
            loaders: self.loaders.clone(),
            sql: self.sql.clone(),
            query_type: self.query_type,
        })
    }

    pub async fn close(&self) -> QuarryResult<()> {
        self.stmt.close().await
    }
}

/// A prepared statement that returns rows mapped to `T`.
pub struct QueryStmt<A, T> {
    stmt: Stmt<A>,
    mapper: Arc<dyn Mapper<T>>,
    mods: Vec<Arc<dyn MapperMod>>,
    settings: ExecSettings<T>,
}

impl<A, T> fmt::Debug for QueryStmt<A, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryStmt")
            .field("stmt", &self.stmt)
            .field("mods", &self.mods.len())
            .field("settings", &self.settings)
            .finish()
    }
}

pub async fn prepare_query<A, T, P>(
    ctx: &Context,
    exec: Arc<P>,
    q: &dyn Query,
    m: impl Mapper<T> + 'static,
) -> QuarryResult<QueryStmt<A, T>>
where
    A: BindArg,
    T: Send + 'static,
    P: Preparer + 'static,
{
    prepare_query_with(ctx, exec, q, m, ExecSettings::default()).await
}

/// Like [`prepare_query`] with per-statement [`ExecSettings`].
pub async fn prepare_query_with<A, T, P>(
    ctx: &Context,
    exec: Arc<P>,
    q: &dyn Query,
    m: impl Mapper<T> + 'static,
    settings: ExecSettings<T>,
) -> QuarryResult<QueryStmt<A, T>>
where
    A: BindArg,
    T: Send + 'static,
    P: Preparer + 'static,
{
    let stmt = prepare(ctx, exec, q).await?;
    Ok(QueryStmt {
        stmt,
        mapper: Arc::new(m),
        mods: q.mapper_mods(),
        settings,
    })
}

impl<A: BindArg, T: Send + 'static> QueryStmt<A, T> {
    pub fn stmt(&self) -> &Stmt<A> {
        &self.stmt
    }

    pub async fn one(&self, ctx: &Context, arg: &A) -> QuarryResult<T> {
        let args = self.stmt.binder.to_args(arg);
        self.one_args(ctx, &args).await
    }

    pub async fn one_args(&self, ctx: &Context, args: &[Value]) -> QuarryResult<T> {
        let rows = self.stmt.open(ctx, args).await?;
        one_from_rows(
            ctx,
            self.stmt.exec.as_ref(),
            rows,
            self.mapper.as_ref(),
            &self.mods,
            &self.stmt.loaders,
            &self.settings,
        )
        .await
    }

    pub async fn all(&self, ctx: &Context, arg: &A) -> QuarryResult<Vec<T>> {
        let args = self.stmt.binder.to_args(arg);
        self.all_args(ctx, &args).await
    }

    pub async fn all_args(&self, ctx: &Context, args: &[Value]) -> QuarryResult<Vec<T>> {
        let rows = self.stmt.open(ctx, args).await?;
        all_from_rows(
            ctx,
            self.stmt.exec.as_ref(),
            rows,
            self.mapper.as_ref(),
            &self.mods,
            &self.stmt.loaders,
            &self.settings,
        )
        .await
    }

    pub async fn cursor(&self, ctx: &Context, arg: &A) -> QuarryResult<Cursor<'_, T>> {
        let args = self.stmt.binder.to_args(arg);
        let rows = self.stmt.open(ctx, &args).await?;
        Cursor::from_parts(
            ctx.clone(),
            self.stmt.exec.as_ref(),
            rows,
            self.mapper.as_ref(),
            self.mods.clone(),
            self.stmt.loaders.clone(),
            self.settings.clone(),
        )
        .await
    }

    /// The same statement re-homed to `tx`.
    pub async fn in_tx<Tx>(&self, ctx: &Context, tx: Arc<Tx>) -> QuarryResult<QueryStmt<A, T>>
    where
        Tx: Transaction + 'static,
    {
        Ok(QueryStmt {
            stmt: self.stmt.in_tx(ctx, tx).await?,
            mapper: self.mapper.clone(),
            mods: self.mods.clone(),
            settings: self.settings.clone(),
        })
    }

    pub async fn close(&self) -> QuarryResult<()> {
        self.stmt.close().await
    }
}
