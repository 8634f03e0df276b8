//! # quarry
//!
//! Dialect-aware SQL query construction and execution.
//!
//! ## Features
//!
//! - **Composable mods**: a statement is a clause container changed by small
//!   [`Mod`] values, so fragments can be built and reused independently
//! - **Exact placeholders**: every expression writes its own SQL and args;
//!   placeholders are numbered across the whole statement
//! - **Named args**: leave slots in a query and fill them later from a map
//!   or a [`Record`]
//! - **Execution pipeline**: hooks, row mapping, loaders and `after_select`
//!   callbacks around any [`Executor`]
//! - **Prepared statements**: prepare once, bind a record per call
//!
//! ## Building
//!
//! ```ignore
//! use quarry::dialect::sqlite::{self, sm};
//! use quarry::expr::{arg, x};
//!
//! let q = sqlite::select((
//!     sm::columns(["id", "name"]),
//!     sm::from("users"),
//!     sm::where_(x("id").in_([arg([100, 200, 300])])),
//! ));
//!
//! let (sql, args) = q.build(&quarry::Context::new())?;
//! // SELECT id, name FROM users WHERE (id IN (?1, ?2, ?3))
//! ```
//!
//! ## Executing
//!
//! ```ignore
//! let users: Vec<User> = quarry::all(&ctx, &db, &q, &quarry::struct_mapper()).await?;
//! ```

extern crate self as quarry;

pub mod bind;
pub mod cached;
pub mod clause;
pub mod context;
#[cfg(feature = "tracing")]
pub mod debug;
pub mod dialect;
pub mod error;
pub mod exec;
pub mod expr;
pub mod expression;
pub mod hooks;
pub mod load;
pub mod mapping;
pub mod mods;
pub mod prelude;
pub mod query;
pub mod row;
pub mod stmt;
pub mod value;

pub use bind::{BindArg, BindShape, Binder, BoundQuery, bind_args, bind_named, record_shape};
pub use cached::{Cached, cache, cache_n};
pub use context::{
    Context, CtxUseSchema, Flag, SkipContextualMods, SkipModelHooks, SkipQueryHooks, schema_of,
    skip_contextual_mods, skip_hooks, skip_model_hooks, skip_query_hooks, use_schema,
};
#[cfg(feature = "tracing")]
pub use debug::{DebugConfig, DebugExecutor, debug};
pub use dialect::{Dialect, NamedArgDialect};
pub use error::{BoxError, QuarryError, QuarryResult};
pub use exec::{
    Cursor, ExecResult, ExecSettings, Executor, all, all_with, cursor, cursor_with, exec, one,
    one_with,
};
pub use expression::{
    Expr, Expression, IntoExpr, RawSql, express, express_if, express_opt, express_slice, exprs,
};
pub use hooks::{EmbeddedHook, Hook, Hooks, QueryHook, hook_fn, query_hook_fn};
pub use load::{AfterPreloader, Load, Loader, Retrieved, loader_fn};
pub use mapping::{Column, Mapping, Record, get_mappings};
pub use mods::{Mod, Mods, mod_fn};
pub use query::{BaseQuery, Query, QueryBody, QueryType, SubQuery, build, build_n};
pub use row::{
    FromRow, Mapper, MapperMod, MemoryRows, Row, Rows, column_mapper, map_fn,
    struct_mapper,
};
pub use stmt::{
    Preparer, QueryStmt, Statement, Stmt, Transaction, Transactor, prepare, prepare_query,
    prepare_query_with,
};
pub use value::{FromValue, Param, Value, resolve_params};

#[cfg(feature = "derive")]
pub use quarry_derive::{FromRow, Record};
