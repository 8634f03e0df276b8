//! Pre-rendered queries.

use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::{QuarryError, QuarryResult};
use crate::exec::Executor;
use crate::expression::Expression;
use crate::load::Load;
use crate::query::{BaseQuery, Query, QueryBody};
use crate::value::Param;
use std::fmt;

/// SQL and args captured by [`cache`], replayable only at the start index
/// they were rendered with.
#[derive(Clone)]
pub struct Cached {
    sql: String,
    args: Vec<Param>,
    start: usize,
    load: Load,
}

impl Cached {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn args(&self) -> &[Param] {
        &self.args
    }

    pub fn start(&self) -> usize {
        self.start
    }
}

impl fmt::Debug for Cached {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cached")
            .field("sql", &self.sql)
            .field("args", &self.args)
            .field("start", &self.start)
            .finish()
    }
}

impl Expression for Cached {
    fn write_sql(
        &self,
        _ctx: &Context,
        w: &mut String,
        _d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        if start != self.start {
            return Err(QuarryError::WrongStart {
                expected: self.start,
                got: start,
            });
        }

        w.push_str(&self.sql);
        Ok(self.args.clone())
    }
}

impl QueryBody for Cached {
    fn load(&self) -> Option<&Load> {
        Some(&self.load)
    }
}

/// Run the query's hooks and render it once, numbering from 1.
pub async fn cache<E: QueryBody>(
    ctx: &Context,
    exec: &dyn Executor,
    q: &BaseQuery<E>,
) -> QuarryResult<BaseQuery<Cached>> {
    cache_n(ctx, exec, q, 1).await
}

/// Like [`cache`], numbering placeholders from `start`.
///
/// The result keeps the query's loaders and mapper mods; its own hooks are
/// not run again when it executes.
pub async fn cache_n<E: QueryBody>(
    ctx: &Context,
    exec: &dyn Executor,
    q: &BaseQuery<E>,
    start: usize,
) -> QuarryResult<BaseQuery<Cached>> {
    let ctx = q.run_hooks(ctx.clone(), exec).await?;
    let (sql, args) = q.build_n(&ctx, start)?;

    let mut load = Load::default();
    load.set_loaders(q.loaders());
    load.set_mapper_mods(q.mapper_mods());

    Ok(BaseQuery::new(
        Cached {
            sql,
            args,
            start,
            load,
        },
        q.dialect,
        q.query_type,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Context, skip_query_hooks};
    use crate::dialect::sqlite::{self, sm};
    use crate::exec::test_support::RecordingExecutor;
    use crate::expr::{arg, x};
    use crate::hooks::query_hook_fn;
    use crate::load::loader_fn;
    use crate::query::{QueryType, build_n};
    use crate::value::Value;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn tenant_query(calls: Arc<AtomicUsize>) -> BaseQuery<sqlite::SelectQuery> {
        sqlite::select((
            sm::columns(["id"]),
            sm::from("users"),
            sm::where_(x("id").eq(arg([7]))),
            sm::hook(query_hook_fn(move |ctx: Context| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(ctx)
            })),
            sm::preload(loader_fn("noop", |_ctx: &Context, _retrieved| Ok(()))),
        ))
    }

    #[tokio::test]
    async fn caches_sql_args_and_loaders() {
        let calls = Arc::new(AtomicUsize::new(0));
        let exec = RecordingExecutor::default();
        let q = tenant_query(calls.clone());

        let cached = cache(&Context::new(), &exec, &q).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cached.query_type, QueryType::Select);
        assert_eq!(cached.expression.start(), 1);
        assert_eq!(cached.loaders().len(), 1);

        let (sql, args) = cached.build(&Context::new()).unwrap();
        let (fresh_sql, fresh_args) = q.build(&Context::new()).unwrap();
        assert_eq!(sql, fresh_sql);
        assert_eq!(args, fresh_args);
        assert_eq!(args, vec![Param::Value(Value::Int(7))]);
    }

    #[tokio::test]
    async fn replay_at_other_start_fails() {
        let exec = RecordingExecutor::default();
        let q = tenant_query(Arc::new(AtomicUsize::new(0)));

        let cached = cache_n(&Context::new(), &exec, &q, 2).await.unwrap();
        let err = build_n(&Context::new(), &cached, 1).unwrap_err();
        assert!(matches!(
            err,
            QuarryError::WrongStart {
                expected: 2,
                got: 1
            }
        ));
        assert!(cached.build_n(&Context::new(), 2).is_ok());
    }

    #[tokio::test]
    async fn skipped_hooks_are_not_run() {
        let calls = Arc::new(AtomicUsize::new(0));
        let exec = RecordingExecutor::default();
        let q = tenant_query(calls.clone());

        cache(&skip_query_hooks(&Context::new()), &exec, &q)
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
