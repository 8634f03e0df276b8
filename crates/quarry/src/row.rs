//! Result rows and the mappers that turn them into values.

use crate::error::{QuarryError, QuarryResult};
use crate::value::{FromValue, Value};
use async_trait::async_trait;
use std::any::Any;
use std::collections::VecDeque;
use std::marker::PhantomData;
use std::sync::Arc;

/// One result row: the shared column list plus this row's cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Typed access by column name.
    ///
    /// Fails with a mapping error tagged `[column]` when the column is
    /// missing or the cell cannot be read as `T`.
    pub fn get<T: FromValue>(&self, column: &str) -> QuarryResult<T> {
        let idx = self
            .index_of(column)
            .ok_or_else(|| QuarryError::mapping([column], "column not found"))?;
        self.read(idx, column)
    }

    /// Like [`get`](Self::get), but a missing column reads as `None`.
    pub fn get_opt<T: FromValue>(&self, column: &str) -> QuarryResult<Option<T>> {
        match self.index_of(column) {
            Some(idx) => self.read(idx, column),
            None => Ok(None),
        }
    }

    fn read<T: FromValue>(&self, idx: usize, tag: &str) -> QuarryResult<T> {
        let value = self.values.get(idx).cloned().unwrap_or_default();
        T::from_value(value).map_err(|msg| QuarryError::mapping([tag], msg))
    }

    /// Typed access by position.
    pub fn get_idx<T: FromValue>(&self, idx: usize) -> QuarryResult<T> {
        let value = self
            .values
            .get(idx)
            .cloned()
            .ok_or_else(|| QuarryError::mapping([idx.to_string()], "column index out of range"))?;
        T::from_value(value).map_err(|msg| QuarryError::mapping([idx.to_string()], msg))
    }
}

/// Trait for converting a result row into a Rust value.
///
/// Usually derived with `#[derive(FromRow)]`:
///
/// ```ignore
/// use quarry::FromRow;
///
/// #[derive(FromRow)]
/// struct User {
///     id: i64,
///     #[orm(column = "user_name")]
///     name: String,
///     email: Option<String>,
/// }
/// ```
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> QuarryResult<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> QuarryResult<Self> {
        Ok(row.clone())
    }
}

macro_rules! tuple_from_row {
    ($($idx:tt $t:ident),+) => {
        impl<$($t: FromValue),+> FromRow for ($($t,)+) {
            fn from_row(row: &Row) -> QuarryResult<Self> {
                Ok(($(row.get_idx::<$t>($idx)?,)+))
            }
        }
    };
}

tuple_from_row!(0 A);
tuple_from_row!(0 A, 1 B);
tuple_from_row!(0 A, 1 B, 2 C);
tuple_from_row!(0 A, 1 B, 2 C, 3 D);
tuple_from_row!(0 A, 1 B, 2 C, 3 D, 4 E);
tuple_from_row!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F);

/// A streaming result set produced by an executor.
#[async_trait]
pub trait Rows: Send {
    fn columns(&self) -> &[String];

    /// The next row's cells, or `None` once exhausted.
    async fn next(&mut self) -> QuarryResult<Option<Vec<Value>>>;

    async fn close(&mut self) -> QuarryResult<()> {
        Ok(())
    }
}

/// An in-memory result set.
#[derive(Debug, Clone, Default)]
pub struct MemoryRows {
    columns: Vec<String>,
    rows: VecDeque<Vec<Value>>,
}

impl MemoryRows {
    pub fn new<I, S>(columns: I, rows: Vec<Vec<Value>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: rows.into(),
        }
    }
}

#[async_trait]
impl Rows for MemoryRows {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    async fn next(&mut self) -> QuarryResult<Option<Vec<Value>>> {
        Ok(self.rows.pop_front())
    }

    async fn close(&mut self) -> QuarryResult<()> {
        self.rows.clear();
        Ok(())
    }
}

/// A per-row mapping function prepared for one column list.
pub type RowMapper<T> = Box<dyn FnMut(&Row) -> QuarryResult<T> + Send>;

/// Builds a [`RowMapper`] once the result columns are known.
pub trait Mapper<T>: Send + Sync {
    fn prepare(&self, columns: &[String]) -> QuarryResult<RowMapper<T>>;
}

/// Maps rows through [`FromRow`].
pub struct StructMapper<T>(PhantomData<fn() -> T>);

pub fn struct_mapper<T: FromRow + 'static>() -> StructMapper<T> {
    StructMapper(PhantomData)
}

impl<T: FromRow + 'static> Mapper<T> for StructMapper<T> {
    fn prepare(&self, _columns: &[String]) -> QuarryResult<RowMapper<T>> {
        Ok(Box::new(|row: &Row| T::from_row(row)))
    }
}

/// Maps a single-column result to its only cell.
pub struct ColumnMapper<T>(PhantomData<fn() -> T>);

pub fn column_mapper<T: FromValue + 'static>() -> ColumnMapper<T> {
    ColumnMapper(PhantomData)
}

impl<T: FromValue + 'static> Mapper<T> for ColumnMapper<T> {
    fn prepare(&self, columns: &[String]) -> QuarryResult<RowMapper<T>> {
        if columns.len() != 1 {
            return Err(QuarryError::mapping(
                ["column_mapper"],
                format!("expected 1 column, got {}", columns.len()),
            ));
        }
        Ok(Box::new(|row: &Row| row.get_idx::<T>(0)))
    }
}

/// A plain function used as a mapper.
pub struct FnMapper<F>(F);

pub fn map_fn<T, F>(f: F) -> FnMapper<F>
where
    F: Fn(&Row) -> QuarryResult<T> + Clone + Send + Sync + 'static,
{
    FnMapper(f)
}

impl<T: 'static, F> Mapper<T> for FnMapper<F>
where
    F: Fn(&Row) -> QuarryResult<T> + Clone + Send + Sync + 'static,
{
    fn prepare(&self, _columns: &[String]) -> QuarryResult<RowMapper<T>> {
        let f = self.0.clone();
        Ok(Box::new(move |row: &Row| f(row)))
    }
}

/// Observes every mapped value before it is returned to the caller.
///
/// The value arrives type-erased; mods that only care about one type
/// downcast and report [`QuarryError::HookableTypeMismatch`] otherwise.
pub trait MapperMod: Send + Sync {
    fn after(&self, value: &dyn Any) -> QuarryResult<()>;
}

/// Map one row and feed the result through `mods`.
pub(crate) fn map_row<T: 'static>(
    mapper: &mut RowMapper<T>,
    mods: &[Arc<dyn MapperMod>],
    row: &Row,
) -> QuarryResult<T> {
    let value = mapper(row)?;
    for m in mods {
        m.after(&value)?;
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn row(cols: &[&str], values: Vec<Value>) -> Row {
        let columns: Arc<[String]> = cols.iter().map(|c| c.to_string()).collect();
        Row::new(columns, values)
    }

    #[test]
    fn get_by_name_and_missing_column() {
        let r = row(&["id", "name"], vec![Value::Int(7), Value::Text("ann".into())]);
        assert_eq!(r.get::<i64>("id").unwrap(), 7);
        assert_eq!(r.get::<String>("name").unwrap(), "ann");

        let err = r.get::<i64>("email").unwrap_err();
        assert_eq!(err.meta(), ["email".to_string()]);
        assert_eq!(r.get_opt::<String>("email").unwrap(), None);
    }

    #[test]
    fn tuples_map_by_position() {
        let r = row(&["a", "b"], vec![Value::Int(1), Value::Null]);
        let (a, b) = <(i64, Option<String>)>::from_row(&r).unwrap();
        assert_eq!((a, b), (1, None));
    }

    #[test]
    fn column_mapper_requires_exactly_one_column() {
        let cols = vec!["a".to_string(), "b".to_string()];
        assert!(column_mapper::<i64>().prepare(&cols).is_err());

        let mut m = column_mapper::<i64>().prepare(&cols[..1]).unwrap();
        assert_eq!(m(&row(&["a"], vec![Value::Int(3)])).unwrap(), 3);
    }

    struct Seen(Mutex<Vec<i64>>);

    impl MapperMod for Seen {
        fn after(&self, value: &dyn Any) -> QuarryResult<()> {
            let v = value
                .downcast_ref::<i64>()
                .ok_or(QuarryError::HookableTypeMismatch { expected: "i64" })?;
            self.0.lock().unwrap().push(*v);
            Ok(())
        }
    }

    #[test]
    fn mapper_mods_see_every_value() {
        let seen = Arc::new(Seen(Mutex::new(Vec::new())));
        let mods: Vec<Arc<dyn MapperMod>> = vec![seen.clone()];
        let mut m = column_mapper::<i64>().prepare(&["n".to_string()]).unwrap();

        for n in [1, 2] {
            map_row(&mut m, &mods, &row(&["n"], vec![Value::Int(n)])).unwrap();
        }
        assert_eq!(*seen.0.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn memory_rows_drain_in_order() {
        let mut rows = MemoryRows::new(["n"], vec![vec![Value::Int(1)], vec![Value::Int(2)]]);
        assert_eq!(rows.columns(), ["n".to_string()]);
        assert_eq!(rows.next().await.unwrap(), Some(vec![Value::Int(1)]));
        assert_eq!(rows.next().await.unwrap(), Some(vec![Value::Int(2)]));
        assert_eq!(rows.next().await.unwrap(), None);
    }
}
