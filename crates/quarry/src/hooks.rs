//! Lifecycle hooks.
//!
//! A hook receives the context and returns the one to continue with, so a
//! hook can attach values for later hooks, loaders and the executor.

use crate::context::{Context, Flag, SkipQueryHooks};
use crate::error::QuarryResult;
use crate::exec::Executor;
use async_trait::async_trait;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, PoisonError, RwLock};

/// A hook over a subject of type `T`, usually a model or a slice of models.
#[async_trait]
pub trait Hook<T: Send + ?Sized>: Send + Sync {
    async fn run(&self, ctx: Context, exec: &dyn Executor, subject: &mut T)
    -> QuarryResult<Context>;
}

/// A synchronous closure used as a [`Hook`].
pub struct HookFn<F>(pub F);

pub fn hook_fn<T, F>(f: F) -> HookFn<F>
where
    T: Send + ?Sized,
    F: Fn(Context, &mut T) -> QuarryResult<Context> + Send + Sync,
{
    HookFn(f)
}

#[async_trait]
impl<T, F> Hook<T> for HookFn<F>
where
    T: Send + ?Sized,
    F: Fn(Context, &mut T) -> QuarryResult<Context> + Send + Sync,
{
    async fn run(
        &self,
        ctx: Context,
        _exec: &dyn Executor,
        subject: &mut T,
    ) -> QuarryResult<Context> {
        (self.0)(ctx, subject)
    }
}

/// A shared, growable set of hooks for one family.
///
/// `K` is the context flag that suppresses the whole family, e.g.
/// [`SkipModelHooks`](crate::SkipModelHooks). Appends take the write lock;
/// runs take a snapshot under the read lock and never hold it across an
/// await.
pub struct Hooks<T: Send + ?Sized, K> {
    hooks: RwLock<Vec<Arc<dyn Hook<T>>>>,
    _key: PhantomData<fn() -> K>,
}

impl<T: Send + ?Sized, K: Flag> Hooks<T, K> {
    pub fn new() -> Self {
        Self {
            hooks: RwLock::new(Vec::new()),
            _key: PhantomData,
        }
    }

    pub fn append_hooks<I>(&self, hooks: I)
    where
        I: IntoIterator<Item = Arc<dyn Hook<T>>>,
    {
        let mut guard = self.hooks.write().unwrap_or_else(PoisonError::into_inner);
        guard.extend(hooks);
    }

    pub fn append_hook(&self, hook: impl Hook<T> + 'static) {
        self.append_hooks([Arc::new(hook) as Arc<dyn Hook<T>>]);
    }

    /// A snapshot of the registered hooks.
    pub fn get_hooks(&self) -> Vec<Arc<dyn Hook<T>>> {
        self.hooks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.hooks.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every hook in order, stopping at the first error.
    ///
    /// Returns `ctx` untouched when the family's skip flag is set.
    pub async fn run_hooks(
        &self,
        ctx: Context,
        exec: &dyn Executor,
        subject: &mut T,
    ) -> QuarryResult<Context> {
        if ctx.flag::<K>() {
            return Ok(ctx);
        }

        let hooks = self.get_hooks();
        let mut ctx = ctx;
        for hook in hooks {
            ctx = hook.run(ctx, exec, subject).await?;
        }
        Ok(ctx)
    }
}

impl<T: Send + ?Sized, K: Flag> Default for Hooks<T, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + ?Sized, K> fmt::Debug for Hooks<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self
            .hooks
            .read()
            .map(|h| h.len())
            .unwrap_or_default();
        f.debug_struct("Hooks").field("hooks", &n).finish()
    }
}

/// A hook attached to a single query.
#[async_trait]
pub trait QueryHook: Send + Sync {
    async fn run(&self, ctx: Context, exec: &dyn Executor) -> QuarryResult<Context>;
}

/// A synchronous closure used as a [`QueryHook`].
pub struct QueryHookFn<F>(pub F);

pub fn query_hook_fn<F>(f: F) -> QueryHookFn<F>
where
    F: Fn(Context) -> QuarryResult<Context> + Send + Sync,
{
    QueryHookFn(f)
}

#[async_trait]
impl<F> QueryHook for QueryHookFn<F>
where
    F: Fn(Context) -> QuarryResult<Context> + Send + Sync,
{
    async fn run(&self, ctx: Context, _exec: &dyn Executor) -> QuarryResult<Context> {
        (self.0)(ctx)
    }
}

/// The per-query hooks embedded in every clause container.
#[derive(Clone, Default)]
pub struct EmbeddedHook {
    pub hooks: Vec<Arc<dyn QueryHook>>,
}

impl EmbeddedHook {
    pub fn set_hooks(&mut self, hooks: Vec<Arc<dyn QueryHook>>) {
        self.hooks = hooks;
    }

    pub fn append_hook(&mut self, hook: Arc<dyn QueryHook>) {
        self.hooks.push(hook);
    }

    /// Run the hooks in order unless the context carries [`SkipQueryHooks`].
    pub async fn run_hooks(&self, ctx: Context, exec: &dyn Executor) -> QuarryResult<Context> {
        if self.hooks.is_empty() || ctx.flag::<SkipQueryHooks>() {
            return Ok(ctx);
        }

        let mut ctx = ctx;
        for hook in &self.hooks {
            ctx = hook.run(ctx, exec).await?;
        }
        Ok(ctx)
    }
}

impl fmt::Debug for EmbeddedHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedHook")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{SkipModelHooks, skip_hooks, skip_model_hooks};
    use crate::error::QuarryError;
    use crate::exec::test_support::RecordingExecutor;

    #[derive(Debug, Clone, PartialEq)]
    struct Tag(&'static str);

    #[tokio::test]
    async fn hooks_thread_context_and_mutate_subject() {
        let hooks: Hooks<Vec<String>, SkipModelHooks> = Hooks::new();
        hooks.append_hook(hook_fn(|ctx: Context, names: &mut Vec<String>| {
            names.push("first".into());
            Ok(ctx.with(Tag("first")))
        }));
        hooks.append_hook(hook_fn(|ctx: Context, names: &mut Vec<String>| {
            let seen = ctx.get::<Tag>().map(|t| t.0).unwrap_or("none");
            names.push(format!("second saw {seen}"));
            Ok(ctx)
        }));

        let exec = RecordingExecutor::default();
        let mut names = Vec::new();
        let ctx = hooks.run_hooks(Context::new(), &exec, &mut names).await.unwrap();

        assert_eq!(names, vec!["first", "second saw first"]);
        assert_eq!(ctx.get::<Tag>(), Some(&Tag("first")));
    }

    #[tokio::test]
    async fn skip_flag_short_circuits() {
        let hooks: Hooks<u32, SkipModelHooks> = Hooks::default();
        hooks.append_hook(hook_fn(|_ctx: Context, _n: &mut u32| {
            Err(QuarryError::Hook("must not run".into()))
        }));

        let exec = RecordingExecutor::default();
        let mut n = 0;
        assert!(hooks.run_hooks(skip_model_hooks(&Context::new()), &exec, &mut n).await.is_ok());
        assert!(hooks.run_hooks(Context::new(), &exec, &mut n).await.is_err());
    }

    #[tokio::test]
    async fn embedded_hooks_obey_skip_query_hooks() {
        let mut embedded = EmbeddedHook::default();
        embedded.append_hook(Arc::new(query_hook_fn(|_ctx| {
            Err(QuarryError::Hook("stop".into()))
        })));

        let exec = RecordingExecutor::default();
        let err = embedded.run_hooks(Context::new(), &exec).await.unwrap_err();
        assert_eq!(err.to_string(), "Hook error: stop");

        let ok = embedded.run_hooks(skip_hooks(&Context::new()), &exec).await;
        assert!(ok.is_ok());
    }
}
