//! Placeholder-producing expressions.

use crate::context::Context;
use crate::dialect::{Dialect, write_named_arg};
use crate::error::QuarryResult;
use crate::expression::Expression;
use crate::value::Param;

/// Positional placeholders, one per bound value.
///
/// With no values this writes `NULL` and binds nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    vals: Vec<Param>,
    grouped: bool,
}

/// `?n, ?n+1, …` binding each value.
pub fn arg<I>(vals: I) -> Args
where
    I: IntoIterator,
    I::Item: Into<Param>,
{
    Args {
        vals: vals.into_iter().map(Into::into).collect(),
        grouped: false,
    }
}

/// Like [`arg`], wrapped in parentheses.
pub fn arg_group<I>(vals: I) -> Args
where
    I: IntoIterator,
    I::Item: Into<Param>,
{
    Args {
        grouped: true,
        ..arg(vals)
    }
}

/// `n` placeholders whose values are supplied at execution time.
pub fn placeholder(n: usize) -> Args {
    arg(std::iter::repeat_n(crate::value::Value::Null, n))
}

impl Args {
    pub fn values(&self) -> &[Param] {
        &self.vals
    }
}

impl Expression for Args {
    fn write_sql(
        &self,
        _ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        if self.grouped {
            w.push('(');
        }

        if self.vals.is_empty() {
            w.push_str("NULL");
        }

        for k in 0..self.vals.len() {
            if k > 0 {
                w.push_str(", ");
            }
            d.write_arg(w, start + k);
        }

        if self.grouped {
            w.push(')');
        }

        Ok(self.vals.clone())
    }
}

/// Positional placeholders whose values are resolved later by name.
///
/// Only meaningful for prepared or bound queries; executing the raw build
/// fails with [`QuarryError::RawNamedArg`](crate::QuarryError::RawNamedArg).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Named {
    names: Vec<String>,
    grouped: bool,
}

pub fn named<I>(names: I) -> Named
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    Named {
        names: names.into_iter().map(Into::into).collect(),
        grouped: false,
    }
}

/// Like [`named`], wrapped in parentheses.
pub fn named_group<I>(names: I) -> Named
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    Named {
        grouped: true,
        ..named(names)
    }
}

impl Expression for Named {
    fn write_sql(
        &self,
        _ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        if self.names.is_empty() {
            return Ok(Vec::new());
        }

        if self.grouped {
            w.push('(');
        }

        let mut args = Vec::with_capacity(self.names.len());
        for (k, name) in self.names.iter().enumerate() {
            if k > 0 {
                w.push_str(", ");
            }
            d.write_arg(w, start + k);
            args.push(Param::Named(name.clone()));
        }

        if self.grouped {
            w.push(')');
        }

        Ok(args)
    }
}

/// A named placeholder written in the dialect's own syntax (`:name`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedArg(pub String);

pub fn named_arg(name: impl Into<String>) -> NamedArg {
    NamedArg(name.into())
}

impl Expression for NamedArg {
    fn write_sql(
        &self,
        _ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        _start: usize,
    ) -> QuarryResult<Vec<Param>> {
        write_named_arg(d, w, &self.0)?;
        Ok(vec![Param::Named(self.0.clone())])
    }
}

/// Heterogeneous [`arg`]: `arg![1, "x", Param::named("id")]`.
#[macro_export]
macro_rules! arg {
    ($($v:expr),* $(,)?) => {
        $crate::expr::arg(::std::vec![$($crate::Param::from($v)),*])
    };
}

/// Heterogeneous [`arg_group`].
#[macro_export]
macro_rules! arg_group {
    ($($v:expr),* $(,)?) => {
        $crate::expr::arg_group(::std::vec![$($crate::Param::from($v)),*])
    };
}

/// Heterogeneous [`raw`](crate::expr::raw): `raw!("a = ? AND b IN ?", 1, arg_group![2, 3])`.
#[macro_export]
macro_rules! raw {
    ($q:expr $(, $a:expr)* $(,)?) => {
        $crate::expr::raw($q, ::std::vec![$($crate::expr::RawArg::from($a)),*])
    };
}
