//! Placeholder and identifier writers.
//!
//! A dialect never inspects args: positional and named arguments are always
//! written as textual placeholders.

pub mod psql;
pub mod sqlite;

use crate::error::{QuarryError, QuarryResult};
use std::fmt::Debug;

/// Per-backend quoting and placeholder strategy.
pub trait Dialect: Debug + Send + Sync {
    /// Write a positional placeholder for the 1-based `position`.
    fn write_arg(&self, w: &mut String, position: usize);

    /// Write an identifier in the dialect's quoting style.
    fn write_quoted(&self, w: &mut String, ident: &str);

    /// The named-placeholder capability, if the dialect has one.
    fn named_args(&self) -> Option<&dyn NamedArgDialect> {
        None
    }
}

/// Capability for dialects that can write named placeholders.
pub trait NamedArgDialect {
    fn write_named_arg(&self, w: &mut String, name: &str);
}

/// Write a named placeholder, failing for dialects without the capability.
pub fn write_named_arg(d: &dyn Dialect, w: &mut String, name: &str) -> QuarryResult<()> {
    match d.named_args() {
        Some(named) => {
            named.write_named_arg(w, name);
            Ok(())
        }
        None => Err(QuarryError::NoNamedArgs),
    }
}

/// Double-quote `ident`, doubling embedded quotes.
pub(crate) fn write_double_quoted(w: &mut String, ident: &str) {
    w.push('"');
    for c in ident.chars() {
        if c == '"' {
            w.push('"');
        }
        w.push(c);
    }
    w.push('"');
}
