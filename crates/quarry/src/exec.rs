//! Query execution: build, run hooks, dispatch, map, load.

use crate::context::{Context, SkipModelHooks};
use crate::error::{QuarryError, QuarryResult};
use crate::load::{Loader, Retrieved, run_loaders};
use crate::query::{Query, QueryType, build};
use crate::row::{Mapper, MapperMod, Row, RowMapper, Rows, map_row};
use crate::value::{Value, resolve_params};
use async_trait::async_trait;
use futures_core::Stream;
use futures_util::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

/// Outcome of a statement that returns no rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    pub last_insert_id: Option<i64>,
}

/// The database capability every execution entry point runs against.
///
/// Errors from the driver should be wrapped with
/// [`QuarryError::database`] and are passed through unchanged.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, ctx: &Context, sql: &str, args: &[Value]) -> QuarryResult<ExecResult>;

    async fn query(&self, ctx: &Context, sql: &str, args: &[Value])
    -> QuarryResult<Box<dyn Rows>>;
}

#[async_trait]
impl<E: Executor + ?Sized> Executor for &E {
    async fn execute(&self, ctx: &Context, sql: &str, args: &[Value]) -> QuarryResult<ExecResult> {
        (**self).execute(ctx, sql, args).await
    }

    async fn query(
        &self,
        ctx: &Context,
        sql: &str,
        args: &[Value],
    ) -> QuarryResult<Box<dyn Rows>> {
        (**self).query(ctx, sql, args).await
    }
}

#[async_trait]
impl<E: Executor + ?Sized> Executor for Arc<E> {
    async fn execute(&self, ctx: &Context, sql: &str, args: &[Value]) -> QuarryResult<ExecResult> {
        (**self).execute(ctx, sql, args).await
    }

    async fn query(
        &self,
        ctx: &Context,
        sql: &str,
        args: &[Value],
    ) -> QuarryResult<Box<dyn Rows>> {
        (**self).query(ctx, sql, args).await
    }
}

/// Callback run after rows were mapped and loaded.
pub type AfterSelectFn<T> =
    Arc<dyn for<'a> Fn(&'a Context, &'a [T]) -> BoxFuture<'a, QuarryResult<()>> + Send + Sync>;

/// Per-call execution options.
pub struct ExecSettings<T> {
    after_select: Option<AfterSelectFn<T>>,
}

impl<T> ExecSettings<T> {
    pub fn new() -> Self {
        Self { after_select: None }
    }

    /// Run `f` over the mapped values once loading is done.
    ///
    /// `one` and each cursor step pass a single-element slice. Skipped when
    /// the context carries [`SkipModelHooks`].
    pub fn after_select<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&'a Context, &'a [T]) -> BoxFuture<'a, QuarryResult<()>>
            + Send
            + Sync
            + 'static,
    {
        self.after_select = Some(Arc::new(f));
        self
    }

    async fn run_after_select(&self, ctx: &Context, items: &[T]) -> QuarryResult<()> {
        match &self.after_select {
            Some(f) if !ctx.flag::<SkipModelHooks>() => f(ctx, items).await,
            _ => Ok(()),
        }
    }
}

impl<T> Default for ExecSettings<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ExecSettings<T> {
    fn clone(&self) -> Self {
        Self {
            after_select: self.after_select.clone(),
        }
    }
}

impl<T> fmt::Debug for ExecSettings<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecSettings")
            .field("after_select", &self.after_select.is_some())
            .finish()
    }
}

#[cfg(feature = "tracing")]
pub(crate) fn log_query(query_type: QueryType, sql: &str, args: &[Value]) {
    tracing::debug!(
        target: "quarry.sql",
        query_type = %query_type,
        params = args.len(),
        sql = %sql,
        "executing query"
    );
}

#[cfg(not(feature = "tracing"))]
pub(crate) fn log_query(_query_type: QueryType, _sql: &str, _args: &[Value]) {}

/// Run the query's hooks, then build it with the context they returned.
async fn prepare(
    ctx: &Context,
    exec: &dyn Executor,
    q: &dyn Query,
) -> QuarryResult<(Context, String, Vec<Value>)> {
    let ctx = q.run_hooks(ctx.clone(), exec).await?;
    let (sql, params) = build(&ctx, q)?;
    let args = resolve_params(params)?;
    log_query(q.query_type(), &sql, &args);
    Ok((ctx, sql, args))
}

/// Execute a statement that returns no rows.
pub async fn exec(ctx: &Context, exec: &dyn Executor, q: &dyn Query) -> QuarryResult<ExecResult> {
    let (ctx, sql, args) = prepare(ctx, exec, q).await?;
    let result = exec.execute(&ctx, &sql, &args).await?;
    run_loaders(&ctx, exec, &q.loaders(), Retrieved::Nothing).await?;
    Ok(result)
}

/// Fetch the first row, or [`QuarryError::NotFound`] when there is none.
pub async fn one<T: Send + 'static>(
    ctx: &Context,
    exec: &dyn Executor,
    q: &dyn Query,
    m: &dyn Mapper<T>,
) -> QuarryResult<T> {
    one_with(ctx, exec, q, m, &ExecSettings::default()).await
}

pub async fn one_with<T: Send + 'static>(
    ctx: &Context,
    exec: &dyn Executor,
    q: &dyn Query,
    m: &dyn Mapper<T>,
    settings: &ExecSettings<T>,
) -> QuarryResult<T> {
    let (ctx, sql, args) = prepare(ctx, exec, q).await?;
    let rows = exec.query(&ctx, &sql, &args).await?;
    one_from_rows(&ctx, exec, rows, m, &q.mapper_mods(), &q.loaders(), settings).await
}

/// Map the first row of `rows`, then load it and run `after_select`.
pub(crate) async fn one_from_rows<T: Send + 'static>(
    ctx: &Context,
    exec: &dyn Executor,
    mut rows: Box<dyn Rows>,
    m: &dyn Mapper<T>,
    mods: &[Arc<dyn MapperMod>],
    loaders: &[Arc<dyn Loader>],
    settings: &ExecSettings<T>,
) -> QuarryResult<T> {
    let columns: Arc<[String]> = rows.columns().into();
    let first = match m.prepare(&columns) {
        Ok(mut mapper) => match rows.next().await {
            Ok(Some(values)) => map_row(&mut mapper, mods, &Row::new(columns, values)).map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    };
    rows.close().await?;

    let mut value = first?.ok_or_else(|| QuarryError::not_found("no rows in result set"))?;
    run_loaders(ctx, exec, loaders, Retrieved::One(&mut value)).await?;
    settings
        .run_after_select(ctx, std::slice::from_ref(&value))
        .await?;
    Ok(value)
}

/// Fetch every row.
pub async fn all<T: Send + 'static>(
    ctx: &Context,
    exec: &dyn Executor,
    q: &dyn Query,
    m: &dyn Mapper<T>,
) -> QuarryResult<Vec<T>> {
    all_with(ctx, exec, q, m, &ExecSettings::default()).await
}

pub async fn all_with<T: Send + 'static>(
    ctx: &Context,
    exec: &dyn Executor,
    q: &dyn Query,
    m: &dyn Mapper<T>,
    settings: &ExecSettings<T>,
) -> QuarryResult<Vec<T>> {
    let (ctx, sql, args) = prepare(ctx, exec, q).await?;
    let rows = exec.query(&ctx, &sql, &args).await?;
    all_from_rows(&ctx, exec, rows, m, &q.mapper_mods(), &q.loaders(), settings).await
}

/// Map every row of `rows`, then load the batch and run `after_select`.
pub(crate) async fn all_from_rows<T: Send + 'static>(
    ctx: &Context,
    exec: &dyn Executor,
    mut rows: Box<dyn Rows>,
    m: &dyn Mapper<T>,
    mods: &[Arc<dyn MapperMod>],
    loaders: &[Arc<dyn Loader>],
    settings: &ExecSettings<T>,
) -> QuarryResult<Vec<T>> {
    let mapped = collect_rows(rows.as_mut(), m, mods).await;
    rows.close().await?;

    let mut values = mapped?;
    run_loaders(ctx, exec, loaders, Retrieved::All(&mut values)).await?;
    settings.run_after_select(ctx, &values).await?;
    Ok(values)
}

async fn collect_rows<T: Send + 'static>(
    rows: &mut dyn Rows,
    m: &dyn Mapper<T>,
    mods: &[Arc<dyn MapperMod>],
) -> QuarryResult<Vec<T>> {
    let columns: Arc<[String]> = rows.columns().into();
    let mut mapper = m.prepare(&columns)?;
    let mut values = Vec::new();
    while let Some(cells) = rows.next().await? {
        values.push(map_row(&mut mapper, mods, &Row::new(columns.clone(), cells))?);
    }
    Ok(values)
}

/// Open a lazy cursor over the result rows.
pub async fn cursor<'a, T: Send + 'static>(
    ctx: &Context,
    exec: &'a dyn Executor,
    q: &dyn Query,
    m: &dyn Mapper<T>,
) -> QuarryResult<Cursor<'a, T>> {
    cursor_with(ctx, exec, q, m, ExecSettings::default()).await
}

pub async fn cursor_with<'a, T: Send + 'static>(
    ctx: &Context,
    exec: &'a dyn Executor,
    q: &dyn Query,
    m: &dyn Mapper<T>,
    settings: ExecSettings<T>,
) -> QuarryResult<Cursor<'a, T>> {
    let (ctx, sql, args) = prepare(ctx, exec, q).await?;
    let rows = exec.query(&ctx, &sql, &args).await?;
    Cursor::from_parts(ctx, exec, rows, m, q.mapper_mods(), q.loaders(), settings).await
}

/// A lazily mapped result set.
///
/// Every row is mapped, loaded and passed to `after_select` on its own.
pub struct Cursor<'a, T> {
    ctx: Context,
    exec: &'a dyn Executor,
    rows: Box<dyn Rows>,
    columns: Arc<[String]>,
    mapper: RowMapper<T>,
    mods: Vec<Arc<dyn MapperMod>>,
    loaders: Vec<Arc<dyn Loader>>,
    settings: ExecSettings<T>,
    done: bool,
}

impl<'a, T: Send + 'static> Cursor<'a, T> {
    /// Wrap open rows; the rows are closed again if the mapper rejects
    /// their columns.
    pub(crate) async fn from_parts(
        ctx: Context,
        exec: &'a dyn Executor,
        mut rows: Box<dyn Rows>,
        m: &dyn Mapper<T>,
        mods: Vec<Arc<dyn MapperMod>>,
        loaders: Vec<Arc<dyn Loader>>,
        settings: ExecSettings<T>,
    ) -> QuarryResult<Self> {
        let columns: Arc<[String]> = rows.columns().into();
        let mapper = match m.prepare(&columns) {
            Ok(mapper) => mapper,
            Err(e) => {
                rows.close().await?;
                return Err(e);
            }
        };

        Ok(Self {
            ctx,
            exec,
            rows,
            columns,
            mapper,
            mods,
            loaders,
            settings,
            done: false,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The next mapped value, or `None` once the rows are exhausted.
    ///
    /// The underlying rows are closed on exhaustion and on the first error;
    /// the cursor yields `None` afterwards.
    pub async fn next(&mut self) -> QuarryResult<Option<T>> {
        if self.done {
            return Ok(None);
        }

        match self.step().await {
            Ok(Some(value)) => Ok(Some(value)),
            Ok(None) => {
                self.done = true;
                self.rows.close().await?;
                Ok(None)
            }
            Err(e) => {
                self.done = true;
                // the step error wins over a failing close
                let _ = self.rows.close().await;
                Err(e)
            }
        }
    }

    async fn step(&mut self) -> QuarryResult<Option<T>> {
        let Some(cells) = self.rows.next().await? else {
            return Ok(None);
        };

        let row = Row::new(self.columns.clone(), cells);
        let mut value = map_row(&mut self.mapper, &self.mods, &row)?;
        run_loaders(&self.ctx, self.exec, &self.loaders, Retrieved::One(&mut value)).await?;
        self.settings
            .run_after_select(&self.ctx, std::slice::from_ref(&value))
            .await?;
        Ok(Some(value))
    }

    /// Release the rows early.
    pub async fn close(mut self) -> QuarryResult<()> {
        if self.done {
            return Ok(());
        }
        self.done = true;
        self.rows.close().await
    }

    pub fn into_stream(self) -> impl Stream<Item = QuarryResult<T>> + 'a
    where
        T: 'a,
    {
        futures_util::stream::try_unfold(self, |mut cursor| async move {
            let next = cursor.next().await?;
            Ok::<_, QuarryError>(next.map(|value| (value, cursor)))
        })
    }
}

impl<T> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("columns", &self.columns)
            .field("done", &self.done)
            .finish()
    }
}
