//! Convenient imports for typical `quarry` usage.
//!
//! ```ignore
//! use quarry::prelude::*;
//! ```

pub use crate::{
    BaseQuery, BindArg, Context, Executor, Expression, FromRow, IntoExpr, Mod, Param, QuarryError,
    QuarryResult, Query, Record, Value,
};

pub use crate::expr::{and, arg, named, named_arg, or, p, quote, raw, s, x};
pub use crate::{all, cursor, exec, one};
pub use crate::{column_mapper, struct_mapper};
