//! Per-type column descriptors.
//!
//! A [`Record`] lists its columns once (usually via `#[derive(Record)]`);
//! [`get_mappings`] turns that list into a [`Mapping`] and memoizes it for
//! the life of the process.

use crate::value::Value;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// One mapped field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub pk: bool,
    pub generated: bool,
    pub autoincr: bool,
}

impl Column {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            pk: false,
            generated: false,
            autoincr: false,
        }
    }

    pub const fn pk(mut self) -> Self {
        self.pk = true;
        self
    }

    pub const fn generated(mut self) -> Self {
        self.generated = true;
        self
    }

    pub const fn autoincr(mut self) -> Self {
        self.autoincr = true;
        self
    }
}

/// A record type whose fields map to columns.
///
/// `field_value(i)` reads the field behind `columns()[i]`; reads never
/// mutate the record.
pub trait Record: Send + Sync + 'static {
    fn columns() -> &'static [Column];

    fn field_value(&self, index: usize) -> Value;
}

/// Column names of a record type split into overlays.
///
/// Every overlay has one slot per field; a field outside the overlay has an
/// empty name, so positions line up with [`Record::field_value`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    pub all: Vec<String>,
    pub pks: Vec<String>,
    pub non_pks: Vec<String>,
    pub generated: Vec<String>,
    pub non_generated: Vec<String>,
    pub auto_increment: Vec<String>,
}

impl Mapping {
    pub fn from_columns(columns: &[Column]) -> Self {
        let pick = |keep: fn(&Column) -> bool| -> Vec<String> {
            columns
                .iter()
                .map(|c| if keep(c) { c.name.to_owned() } else { String::new() })
                .collect()
        };

        Self {
            all: pick(|_| true),
            pks: pick(|c| c.pk),
            non_pks: pick(|c| !c.pk),
            generated: pick(|c| c.generated),
            non_generated: pick(|c| !c.generated),
            auto_increment: pick(|c| c.autoincr),
        }
    }

    /// Position of `name` among all columns.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.all.iter().position(|c| c == name)
    }

    pub fn has_pk(&self) -> bool {
        self.pks.iter().any(|c| !c.is_empty())
    }
}

type MappingCache = RwLock<HashMap<TypeId, Arc<Mapping>>>;

fn cache() -> &'static MappingCache {
    static CACHE: OnceLock<MappingCache> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// The memoized mapping of `R`.
pub fn get_mappings<R: Record>() -> Arc<Mapping> {
    let key = TypeId::of::<R>();

    if let Some(found) = cache()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
    {
        return Arc::clone(found);
    }

    let mut guard = cache().write().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(
        guard
            .entry(key)
            .or_insert_with(|| Arc::new(Mapping::from_columns(R::columns()))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Account {
        id: i64,
        email: String,
    }

    impl Record for Account {
        fn columns() -> &'static [Column] {
            const COLUMNS: &[Column] = &[
                Column::new("id").pk().autoincr(),
                Column::new("email"),
            ];
            COLUMNS
        }

        fn field_value(&self, index: usize) -> Value {
            match index {
                0 => self.id.into(),
                1 => self.email.clone().into(),
                _ => Value::Null,
            }
        }
    }

    #[test]
    fn overlays_keep_positions() {
        let m = get_mappings::<Account>();
        assert_eq!(m.all, vec!["id", "email"]);
        assert_eq!(m.pks, vec!["id", ""]);
        assert_eq!(m.non_pks, vec!["", "email"]);
        assert_eq!(m.auto_increment, vec!["id", ""]);
        assert_eq!(m.generated, vec!["", ""]);
        assert!(m.has_pk());
        assert_eq!(m.index_of("email"), Some(1));
    }

    #[test]
    fn mapping_is_memoized() {
        let a = get_mappings::<Account>();
        let b = get_mappings::<Account>();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn field_reads_follow_columns() {
        let acc = Account {
            id: 3,
            email: "a@b.c".into(),
        };
        assert_eq!(acc.field_value(0), Value::Int(3));
        assert_eq!(acc.field_value(1), Value::Text("a@b.c".into()));
    }
}
