//! Raw SQL clauses with `?` placeholders.

use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::{QuarryError, QuarryResult};
use crate::expression::{Expr, Expression, IntoExpr};
use crate::value::Param;

/// One argument to [`raw`]: a bound value or an inline expression.
#[derive(Debug, Clone)]
pub enum RawArg {
    Param(Param),
    Expr(Expr),
}

impl<E: Expression + 'static> From<E> for RawArg {
    fn from(e: E) -> Self {
        RawArg::Expr(e.into_expr())
    }
}

impl From<Param> for RawArg {
    fn from(p: Param) -> Self {
        RawArg::Param(p)
    }
}

macro_rules! raw_arg_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for RawArg {
                fn from(v: $ty) -> Self {
                    RawArg::Param(Param::from(v))
                }
            }
        )*
    };
}

raw_arg_from!(
    crate::value::Value,
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    String,
    &str,
    &String,
    Vec<u8>,
    &[u8],
    chrono::NaiveDate,
    chrono::NaiveDateTime,
    chrono::DateTime<chrono::Utc>,
    uuid::Uuid,
    serde_json::Value,
);

/// A SQL fragment whose `?` marks are replaced by dialect placeholders.
///
/// `\?` writes a literal `?` and consumes no arg. An expression arg is
/// expanded in place of its `?` and advances the numbering by the number of
/// args it binds.
#[derive(Debug, Clone)]
pub struct Clause {
    query: String,
    args: Vec<RawArg>,
}

impl Clause {
    pub fn new(query: impl Into<String>, args: Vec<RawArg>) -> Self {
        Self {
            query: query.into(),
            args,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

/// Build a raw clause; see [`Clause`].
pub fn raw<I>(query: impl Into<String>, args: I) -> Clause
where
    I: IntoIterator,
    I::Item: Into<RawArg>,
{
    Clause::new(query, args.into_iter().map(Into::into).collect())
}

impl Expression for Clause {
    /// # Panics
    ///
    /// Panics when `start` is 0; placeholder positions are 1-based.
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        assert!(start != 0, "Not a valid start number.");

        let placeholders = count_placeholders(&self.query);
        if placeholders != self.args.len() {
            return Err(QuarryError::RawArgCount {
                placeholders,
                args: self.args.len(),
                clause: self.query.clone(),
            });
        }

        let mut args = Vec::with_capacity(self.args.len());
        let mut next = self.args.iter();
        let mut rest = self.query.as_str();

        while let Some(idx) = rest.find('?') {
            if rest[..idx].ends_with('\\') {
                w.push_str(&rest[..idx - 1]);
                w.push('?');
                rest = &rest[idx + 1..];
                continue;
            }

            w.push_str(&rest[..idx]);
            rest = &rest[idx + 1..];

            match next.next() {
                Some(RawArg::Expr(e)) => {
                    let eargs = e.write_sql(ctx, w, d, start + args.len())?;
                    args.extend(eargs);
                }
                Some(RawArg::Param(p)) => {
                    d.write_arg(w, start + args.len());
                    args.push(p.clone());
                }
                None => break,
            }
        }
        w.push_str(rest);

        Ok(args)
    }
}

fn count_placeholders(query: &str) -> usize {
    let bytes = query.as_bytes();
    bytes
        .iter()
        .enumerate()
        .filter(|&(i, &b)| b == b'?' && (i == 0 || bytes[i - 1] != b'\\'))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::sqlite::Sqlite;
    use crate::expr::arg_group;

    fn render(c: &Clause, start: usize) -> QuarryResult<(String, Vec<Param>)> {
        let mut w = String::new();
        let args = c.write_sql(&Context::new(), &mut w, &Sqlite, start)?;
        Ok((w, args))
    }

    #[test]
    fn escape_and_inline_expression() {
        let c = raw(
            r"SELECT a FROM t WHERE x = \? AND y = ? AND z IN ?",
            [RawArg::from(42), arg_group([1, 2, 3]).into()],
        );
        let (sql, args) = render(&c, 1).unwrap();
        assert_eq!(sql, "SELECT a FROM t WHERE x = ? AND y = ?1 AND z IN (?2, ?3, ?4)");
        assert_eq!(
            args,
            vec![Param::from(42), Param::from(1), Param::from(2), Param::from(3)]
        );
    }

    #[test]
    fn numbering_continues_from_start() {
        let c = raw("a = ? AND b = ?", [1, 2]);
        let (sql, _) = render(&c, 5).unwrap();
        assert_eq!(sql, "a = ?5 AND b = ?6");
    }

    #[test]
    fn count_mismatch_reports_both_numbers() {
        let c = raw("a = ? AND b = ?", [1]);
        let err = render(&c, 1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bad Statement: has 2 placeholders but 1 args: a = ? AND b = ?"
        );
    }

    #[test]
    fn escapes_consume_no_args() {
        let c = raw(r"\?\?", Vec::<RawArg>::new());
        assert_eq!(render(&c, 1).unwrap().0, "??");
    }

    #[test]
    #[should_panic(expected = "Not a valid start number.")]
    fn start_zero_panics() {
        let c = raw("a = ?", [1]);
        let _ = render(&c, 0);
    }
}
