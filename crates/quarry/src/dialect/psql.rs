//! PostgreSQL-style placeholders (`$1`, `$2`, …).
//!
//! Only the writer is provided; fragments rendered through it can be mixed
//! into queries of other dialects.

use super::{Dialect, write_double_quoted};

#[derive(Debug, Clone, Copy, Default)]
pub struct Psql;

pub static DIALECT: Psql = Psql;

impl Dialect for Psql {
    fn write_arg(&self, w: &mut String, position: usize) {
        w.push('$');
        w.push_str(&position.to_string());
    }

    fn write_quoted(&self, w: &mut String, ident: &str) {
        write_double_quoted(w, ident);
    }
}
