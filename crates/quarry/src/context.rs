//! Request-scoped values threaded through building, hooks and execution.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// An immutable, cheaply cloned map of typed values.
///
/// Each key is a type; [`Context::with`] returns a new context and leaves the
/// original untouched, so hooks and contextual mods hand back a derived
/// context instead of mutating a shared one.
#[derive(Clone, Default)]
pub struct Context {
    values: Arc<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy of this context carrying `value` under its type.
    pub fn with<T: Any + Send + Sync>(&self, value: T) -> Self {
        let mut values = (*self.values).clone();
        values.insert(TypeId::of::<T>(), Arc::new(value));
        Self {
            values: Arc::new(values),
        }
    }

    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<T>())
    }

    /// True when a boolean flag key is present and set.
    pub fn flag<K: Flag>(&self) -> bool {
        self.get::<K>().is_some_and(|k| k.is_set())
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("values", &self.values.len())
            .finish()
    }
}

/// A boolean context key.
pub trait Flag: Any + Send + Sync {
    fn is_set(&self) -> bool;
}

macro_rules! flag_key {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
            pub struct $name(pub bool);

            impl Flag for $name {
                fn is_set(&self) -> bool {
                    self.0
                }
            }
        )*
    };
}

flag_key! {
    /// Suppresses query-level hooks.
    SkipQueryHooks,
    /// Suppresses per-row (model) hooks.
    SkipModelHooks,
    /// Suppresses build-time contextual mods.
    SkipContextualMods,
}

/// Schema override for generated table helpers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtxUseSchema(pub String);

/// Skip both query and model hooks.
pub fn skip_hooks(ctx: &Context) -> Context {
    ctx.with(SkipQueryHooks(true)).with(SkipModelHooks(true))
}

pub fn skip_query_hooks(ctx: &Context) -> Context {
    ctx.with(SkipQueryHooks(true))
}

pub fn skip_model_hooks(ctx: &Context) -> Context {
    ctx.with(SkipModelHooks(true))
}

pub fn skip_contextual_mods(ctx: &Context) -> Context {
    ctx.with(SkipContextualMods(true))
}

/// Retarget the default schema for collaborators that honour [`CtxUseSchema`].
pub fn use_schema(ctx: &Context, schema: impl Into<String>) -> Context {
    ctx.with(CtxUseSchema(schema.into()))
}

/// The schema override carried by `ctx`, if any.
pub fn schema_of(ctx: &Context) -> Option<&str> {
    ctx.get::<CtxUseSchema>().map(|s| s.0.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_does_not_touch_parent() {
        let base = Context::new();
        let child = skip_query_hooks(&base);
        assert!(!base.flag::<SkipQueryHooks>());
        assert!(child.flag::<SkipQueryHooks>());
        assert!(!child.flag::<SkipModelHooks>());
    }

    #[test]
    fn skip_hooks_sets_both_families() {
        let ctx = skip_hooks(&Context::new());
        assert!(ctx.flag::<SkipQueryHooks>());
        assert!(ctx.flag::<SkipModelHooks>());
        assert!(!ctx.flag::<SkipContextualMods>());
    }

    #[test]
    fn false_flag_is_not_set() {
        let ctx = Context::new().with(SkipContextualMods(false));
        assert!(!ctx.flag::<SkipContextualMods>());
    }

    #[test]
    fn schema_override() {
        let ctx = use_schema(&Context::new(), "tenant_1");
        assert_eq!(schema_of(&ctx), Some("tenant_1"));
    }
}
