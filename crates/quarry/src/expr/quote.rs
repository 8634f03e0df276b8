//! Quoted identifiers and string literals.

use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::QuarryResult;
use crate::expression::Expression;
use crate::value::Param;

/// Dot-joined quoted identifier, e.g. `"users"."id"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quoted(Vec<String>);

/// Quote each non-empty part and join them with dots.
pub fn quote<I>(parts: I) -> Quoted
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    Quoted(
        parts
            .into_iter()
            .map(Into::into)
            .filter(|p: &String| !p.is_empty())
            .collect(),
    )
}

impl Expression for Quoted {
    fn write_sql(
        &self,
        _ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        _start: usize,
    ) -> QuarryResult<Vec<Param>> {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                w.push('.');
            }
            d.write_quoted(w, part);
        }
        Ok(Vec::new())
    }
}

/// A single-quoted string literal. The text is not escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal(pub String);

/// `'text'`
pub fn s(text: impl Into<String>) -> Literal {
    Literal(text.into())
}

impl Expression for Literal {
    fn write_sql(
        &self,
        _ctx: &Context,
        w: &mut String,
        _d: &dyn Dialect,
        _start: usize,
    ) -> QuarryResult<Vec<Param>> {
        w.push('\'');
        w.push_str(&self.0);
        w.push('\'');
        Ok(Vec::new())
    }
}
