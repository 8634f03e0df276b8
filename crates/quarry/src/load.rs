//! Loaders: work that runs after a query has been mapped.
//!
//! A loader sees what the query retrieved and typically issues follow-up
//! queries through the same executor to fill in related data.

use crate::context::Context;
use crate::error::{QuarryError, QuarryResult};
use crate::exec::Executor;
use crate::row::MapperMod;
use async_trait::async_trait;
use std::any::{Any, type_name};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// What a query handed to its loaders.
pub enum Retrieved<'a> {
    /// An exec-style query; nothing was mapped.
    Nothing,
    /// A single mapped value of the query's row type.
    One(&'a mut (dyn Any + Send + 'static)),
    /// A `Vec` of mapped values of the query's row type.
    All(&'a mut (dyn Any + Send + 'static)),
}

impl Retrieved<'_> {
    /// A shorter-lived copy that can be handed to one loader.
    pub fn reborrow(&mut self) -> Retrieved<'_> {
        match self {
            Retrieved::Nothing => Retrieved::Nothing,
            Retrieved::One(v) => Retrieved::One(&mut **v),
            Retrieved::All(v) => Retrieved::All(&mut **v),
        }
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, Retrieved::Nothing)
    }

    /// The single value, if this is `One` and holds a `T`.
    pub fn one<T: 'static>(&mut self) -> Option<&mut T> {
        match self {
            Retrieved::One(v) => v.downcast_mut::<T>(),
            _ => None,
        }
    }

    /// The value list, if this is `All` and holds a `Vec<T>`.
    pub fn all<T: 'static>(&mut self) -> Option<&mut Vec<T>> {
        match self {
            Retrieved::All(v) => v.downcast_mut::<Vec<T>>(),
            _ => None,
        }
    }
}

impl fmt::Debug for Retrieved<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Retrieved::Nothing => f.write_str("Nothing"),
            Retrieved::One(_) => f.write_str("One(..)"),
            Retrieved::All(_) => f.write_str("All(..)"),
        }
    }
}

#[async_trait]
pub trait Loader: Send + Sync {
    async fn load(
        &self,
        ctx: &Context,
        exec: &dyn Executor,
        retrieved: Retrieved<'_>,
    ) -> QuarryResult<()>;

    /// Name used when wrapping this loader's errors.
    fn name(&self) -> &str {
        type_name::<Self>()
    }
}

/// A synchronous closure used as a [`Loader`].
pub struct LoaderFn<F> {
    name: String,
    f: F,
}

pub fn loader_fn<F>(name: impl Into<String>, f: F) -> LoaderFn<F>
where
    F: for<'a> Fn(&Context, Retrieved<'a>) -> QuarryResult<()> + Send + Sync,
{
    LoaderFn {
        name: name.into(),
        f,
    }
}

#[async_trait]
impl<F> Loader for LoaderFn<F>
where
    F: for<'a> Fn(&Context, Retrieved<'a>) -> QuarryResult<()> + Send + Sync,
{
    async fn load(
        &self,
        ctx: &Context,
        _exec: &dyn Executor,
        retrieved: Retrieved<'_>,
    ) -> QuarryResult<()> {
        (self.f)(ctx, retrieved)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Run `loaders` in order, wrapping any failure with the loader's name.
pub(crate) async fn run_loaders(
    ctx: &Context,
    exec: &dyn Executor,
    loaders: &[Arc<dyn Loader>],
    mut retrieved: Retrieved<'_>,
) -> QuarryResult<()> {
    for loader in loaders {
        loader
            .load(ctx, exec, retrieved.reborrow())
            .await
            .map_err(|e| QuarryError::loader(loader.name(), e))?;
    }
    Ok(())
}

/// Loaders and mapper mods carried by a clause container.
#[derive(Clone, Default)]
pub struct Load {
    pub loaders: Vec<Arc<dyn Loader>>,
    pub mapper_mods: Vec<Arc<dyn MapperMod>>,
}

impl Load {
    pub fn set_loaders(&mut self, loaders: Vec<Arc<dyn Loader>>) {
        self.loaders = loaders;
    }

    pub fn append_loader(&mut self, loader: Arc<dyn Loader>) {
        self.loaders.push(loader);
    }

    pub fn set_mapper_mods(&mut self, mods: Vec<Arc<dyn MapperMod>>) {
        self.mapper_mods = mods;
    }

    pub fn append_mapper_mod(&mut self, m: Arc<dyn MapperMod>) {
        self.mapper_mods.push(m);
    }

    /// Register an [`AfterPreloader`] both as a mapper mod and a loader.
    pub fn append_after_preloader<T>(&mut self, p: Arc<AfterPreloader<T>>)
    where
        T: Send + 'static,
    {
        self.mapper_mods.push(p.clone());
        self.loaders.push(p);
    }
}

impl fmt::Debug for Load {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Load")
            .field("loaders", &self.loaders.len())
            .field("mapper_mods", &self.mapper_mods.len())
            .finish()
    }
}

/// Hands the values a query mapped as `T` to its own loaders once the query
/// is done, so nested loads can fan out from them.
///
/// The loaders work on the caller's values in place: a single value is
/// passed as [`Retrieved::One`], several as [`Retrieved::All`] over the
/// `Vec<T>`. As a mapper mod it only checks that every mapped value is a `T`.
pub struct AfterPreloader<T> {
    loaders: Vec<Arc<dyn Loader>>,
    _row: PhantomData<fn() -> T>,
}

impl<T: Send + 'static> AfterPreloader<T> {
    pub fn new() -> Self {
        Self {
            loaders: Vec::new(),
            _row: PhantomData,
        }
    }

    pub fn append_loader(&mut self, loader: Arc<dyn Loader>) {
        self.loaders.push(loader);
    }

    pub fn with_loader(mut self, loader: impl Loader + 'static) -> Self {
        self.loaders.push(Arc::new(loader));
        self
    }

    /// Fail unless `value` is a `T`. Always passes while no loader is registered.
    pub fn collect(&self, value: &dyn Any) -> QuarryResult<()> {
        if self.loaders.is_empty() || value.is::<T>() {
            Ok(())
        } else {
            Err(mismatch::<T>())
        }
    }
}

fn mismatch<T>() -> QuarryError {
    QuarryError::HookableTypeMismatch {
        expected: type_name::<T>(),
    }
}

impl<T: Send + 'static> Default for AfterPreloader<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> MapperMod for AfterPreloader<T> {
    fn after(&self, value: &dyn Any) -> QuarryResult<()> {
        self.collect(value)
    }
}

#[async_trait]
impl<T: Send + 'static> Loader for AfterPreloader<T> {
    async fn load(
        &self,
        ctx: &Context,
        exec: &dyn Executor,
        retrieved: Retrieved<'_>,
    ) -> QuarryResult<()> {
        if self.loaders.is_empty() {
            return Ok(());
        }

        match retrieved {
            Retrieved::Nothing => Ok(()),
            Retrieved::One(v) => {
                let one = v.downcast_mut::<T>().ok_or_else(mismatch::<T>)?;
                run_loaders(ctx, exec, &self.loaders, Retrieved::One(one)).await
            }
            Retrieved::All(v) => {
                let all = v.downcast_mut::<Vec<T>>().ok_or_else(mismatch::<Vec<T>>)?;
                match all.len() {
                    0 => Ok(()),
                    1 => run_loaders(ctx, exec, &self.loaders, Retrieved::One(&mut all[0])).await,
                    _ => run_loaders(ctx, exec, &self.loaders, Retrieved::All(all)).await,
                }
            }
        }
    }
}
