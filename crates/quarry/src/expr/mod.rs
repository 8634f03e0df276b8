//! The expression library.
//!
//! Small composable [`Expression`](crate::Expression) values. Strings passed
//! where an expression is expected are written verbatim; values meant to be
//! bound go through [`arg`].
//!
//! ```ignore
//! use quarry::expr::{arg, x};
//!
//! let cond = x("id").in_([arg([100, 200, 300])]);
//! // (id IN (?1, ?2, ?3))
//! ```

mod arg;
mod case;
mod cast;
mod chain;
mod function;
mod group;
mod quote;
mod raw;

pub use arg::{Args, Named, NamedArg, arg, arg_group, named, named_arg, named_group, placeholder};
pub use case::{Case, case};
pub use cast::{Cast, cast};
pub use chain::{Chain, and, concat, group_chain, not, or, x};
pub use function::{Function, func};
pub use group::{Group, Join, LeftRight, Parens, Wrapped, group, join, op, p};
pub use quote::{Literal, Quoted, quote, s};
pub use raw::{Clause, RawArg, raw};
