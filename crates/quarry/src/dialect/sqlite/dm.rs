//! Mods for SQLite `DELETE`.

use super::DeleteQuery;
use crate::mods::Mod;

pub use super::{FromChain, from};
pub use crate::mods::{
    CteChain, Recursive, after_preload, contextual, hook, limit, mapper_mod, offset, order_by,
    preload, returning, where_, with,
};

pub fn recursive(r: bool) -> Recursive {
    Recursive(r)
}

/// `INDEXED BY index` on the target table, or `NOT INDEXED` when `None`.
#[derive(Debug, Clone)]
pub struct IndexHint(pub Option<String>);

pub fn indexed_by(index: impl Into<String>) -> IndexHint {
    IndexHint(Some(index.into()))
}

pub fn not_indexed() -> IndexHint {
    IndexHint(None)
}

impl Mod<DeleteQuery> for IndexHint {
    fn apply(&self, q: &mut DeleteQuery) {
        let hint = self.0.clone().unwrap_or_default();
        q.table.set_indexed_by(Some(hint));
    }
}
