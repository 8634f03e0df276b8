//! Named argument binding.
//!
//! A build leaves [`Param::Named`] slots wherever [`named`](crate::expr::named)
//! or [`named_arg`](crate::expr::named_arg) was used. A [`Binder`] is made once
//! from those build args and then fills the slots from a caller record on
//! every call:
//!
//! - no names: the record is ignored and the build args pass through;
//! - one name and a scalar record: every slot with that name gets the scalar;
//! - otherwise maps are looked up by key and [`Record`] types by column.

use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::{QuarryError, QuarryResult};
use crate::exec::Executor;
use crate::expression::Expression;
use crate::load::Loader;
use crate::mapping::{Mapping, Record, get_mappings};
use crate::query::{Query, QueryType};
use crate::row::MapperMod;
use crate::value::{Param, Value};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

/// How a bind record exposes its values.
#[derive(Debug, Clone)]
pub enum BindShape {
    /// One value fills every slot of the single name.
    Single,
    /// Values are looked up by name; missing keys bind `NULL`.
    Map,
    /// Values are read from fields positioned by the mapping.
    Record(Arc<Mapping>),
    /// Cannot bind more than zero names.
    Unsupported,
}

/// A caller-supplied source of named values.
pub trait BindArg: Send + Sync {
    fn shape() -> BindShape;

    /// The value for [`BindShape::Single`].
    fn single(&self) -> Value {
        Value::Null
    }

    /// The value for `name` under [`BindShape::Map`].
    fn lookup(&self, _name: &str) -> Option<Value> {
        None
    }

    /// The field at `index` under [`BindShape::Record`].
    fn field(&self, _index: usize) -> Value {
        Value::Null
    }
}

macro_rules! single_bind_arg {
    ($($ty:ty),* $(,)?) => {
        $(
            impl BindArg for $ty {
                fn shape() -> BindShape {
                    BindShape::Single
                }

                fn single(&self) -> Value {
                    self.clone().into()
                }
            }
        )*
    };
}

single_bind_arg!(
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
    Vec<u8>,
    NaiveDate,
    NaiveDateTime,
    DateTime<Utc>,
    Uuid,
    Value,
);

impl BindArg for &str {
    fn shape() -> BindShape {
        BindShape::Single
    }

    fn single(&self) -> Value {
        Value::Text((*self).to_owned())
    }
}

/// `None` binds `NULL` everywhere, like a nil pointer.
impl<T: BindArg> BindArg for Option<T> {
    fn shape() -> BindShape {
        T::shape()
    }

    fn single(&self) -> Value {
        self.as_ref().map_or(Value::Null, BindArg::single)
    }

    fn lookup(&self, name: &str) -> Option<Value> {
        self.as_ref().and_then(|v| v.lookup(name))
    }

    fn field(&self, index: usize) -> Value {
        self.as_ref().map_or(Value::Null, |v| v.field(index))
    }
}

impl<T: BindArg> BindArg for &T {
    fn shape() -> BindShape {
        T::shape()
    }

    fn single(&self) -> Value {
        (**self).single()
    }

    fn lookup(&self, name: &str) -> Option<Value> {
        (**self).lookup(name)
    }

    fn field(&self, index: usize) -> Value {
        (**self).field(index)
    }
}

impl<K, V, S> BindArg for HashMap<K, V, S>
where
    K: std::borrow::Borrow<str> + std::hash::Hash + Eq + Send + Sync,
    V: Clone + Into<Value> + Send + Sync,
    S: std::hash::BuildHasher + Send + Sync,
{
    fn shape() -> BindShape {
        BindShape::Map
    }

    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned().map(Into::into)
    }
}

impl<K, V> BindArg for BTreeMap<K, V>
where
    K: std::borrow::Borrow<str> + Ord + Send + Sync,
    V: Clone + Into<Value> + Send + Sync,
{
    fn shape() -> BindShape {
        BindShape::Map
    }

    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned().map(Into::into)
    }
}

/// The [`BindShape`] of a [`Record`]; used by `#[derive(Record)]`.
pub fn record_shape<R: Record>() -> BindShape {
    BindShape::Record(get_mappings::<R>())
}

#[derive(Debug, Clone)]
enum Slots {
    Empty,
    Single { positions: Vec<usize>, name: String },
    Map { names: Vec<Option<String>> },
    Record { fields: Vec<Option<usize>> },
}

/// Turns a record into the full positional arg list of one build.
pub struct Binder<A> {
    given: Vec<Value>,
    slots: Slots,
    _arg: PhantomData<fn(&A)>,
}

impl<A> fmt::Debug for Binder<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("given", &self.given)
            .field("slots", &self.slots)
            .finish()
    }
}

impl<A> Clone for Binder<A> {
    fn clone(&self) -> Self {
        Self {
            given: self.given.clone(),
            slots: self.slots.clone(),
            _arg: PhantomData,
        }
    }
}

impl<A: BindArg> Binder<A> {
    /// Plan the binding of `args`; shape problems surface here, not per call.
    pub fn new(args: &[Param]) -> QuarryResult<Self> {
        let mut names: Vec<Option<String>> = Vec::with_capacity(args.len());
        let mut given = Vec::with_capacity(args.len());
        let mut distinct: Vec<&str> = Vec::new();

        for arg in args {
            match arg {
                Param::Named(name) => {
                    if !distinct.contains(&name.as_str()) {
                        distinct.push(name);
                    }
                    names.push(Some(name.clone()));
                    given.push(Value::Null);
                }
                Param::Value(v) => {
                    names.push(None);
                    given.push(v.clone());
                }
            }
        }

        let slots = match (distinct.len(), A::shape()) {
            (0, _) => Slots::Empty,
            (1, BindShape::Single) => Slots::Single {
                positions: names
                    .iter()
                    .enumerate()
                    .filter_map(|(i, n)| n.as_ref().map(|_| i))
                    .collect(),
                name: distinct[0].to_owned(),
            },
            (_, BindShape::Map) => Slots::Map { names },
            (_, BindShape::Record(mapping)) => {
                let mut fields = Vec::with_capacity(names.len());
                for name in &names {
                    match name {
                        None => fields.push(None),
                        Some(name) => match mapping.index_of(name) {
                            Some(idx) => fields.push(Some(idx)),
                            None => return Err(QuarryError::MissingArg { name: name.clone() }),
                        },
                    }
                }
                Slots::Record { fields }
            }
            (_, BindShape::Single | BindShape::Unsupported) => return Err(QuarryError::BadArgType),
        };

        Ok(Self {
            given,
            slots,
            _arg: PhantomData,
        })
    }

    /// Distinct names this binder fills, in placeholder order.
    pub fn names(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let mut push = |name: &str| {
            if !out.iter().any(|n| n == name) {
                out.push(name.to_owned());
            }
        };

        match &self.slots {
            Slots::Empty => {}
            Slots::Single { name, .. } => push(name),
            Slots::Map { names } => names.iter().flatten().for_each(|n| push(n)),
            Slots::Record { fields } => {
                let mapping_names = self.record_names(fields);
                mapping_names.iter().for_each(|n| push(n));
            }
        }

        out
    }

    fn record_names(&self, fields: &[Option<usize>]) -> Vec<String> {
        let BindShape::Record(mapping) = A::shape() else {
            return Vec::new();
        };
        fields
            .iter()
            .flatten()
            .filter_map(|&i| mapping.all.get(i).cloned())
            .collect()
    }

    /// Number of args every call produces.
    pub fn len(&self) -> usize {
        self.given.len()
    }

    pub fn is_empty(&self) -> bool {
        self.given.is_empty()
    }

    /// A fresh arg list with every named slot filled from `arg`.
    pub fn to_args(&self, arg: &A) -> Vec<Value> {
        let mut values = self.given.clone();

        match &self.slots {
            Slots::Empty => {}
            Slots::Single { positions, .. } => {
                let v = arg.single();
                for &i in positions {
                    values[i] = v.clone();
                }
            }
            Slots::Map { names } => {
                for (i, name) in names.iter().enumerate() {
                    if let Some(name) = name {
                        values[i] = arg.lookup(name).unwrap_or_default();
                    }
                }
            }
            Slots::Record { fields } => {
                for (i, field) in fields.iter().enumerate() {
                    if let Some(field) = field {
                        values[i] = arg.field(*field);
                    }
                }
            }
        }

        values
    }
}

/// Bind `arg` into build args in one step.
pub fn bind_args<A: BindArg>(args: &[Param], arg: &A) -> QuarryResult<Vec<Value>> {
    Ok(Binder::<A>::new(args)?.to_args(arg))
}

/// A query whose named args are resolved from a record whenever it builds.
///
/// Either every build arg is named or none is; a mix fails with
/// [`QuarryError::MixedArgs`].
pub struct BoundQuery<Q, A> {
    query: Q,
    arg: A,
}

pub fn bind_named<Q, A>(query: Q, arg: A) -> BoundQuery<Q, A>
where
    Q: Query,
    A: BindArg,
{
    BoundQuery { query, arg }
}

impl<Q: fmt::Debug, A> fmt::Debug for BoundQuery<Q, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundQuery")
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}

impl<Q, A: BindArg> BoundQuery<Q, A> {
    fn resolve(&self, args: Vec<Param>) -> QuarryResult<Vec<Param>> {
        let named = args.iter().filter(|a| a.name().is_some()).count();
        if named == 0 {
            return Ok(args);
        }
        if named != args.len() {
            return Err(QuarryError::MixedArgs);
        }

        Ok(bind_args(&args, &self.arg)?
            .into_iter()
            .map(Param::Value)
            .collect())
    }
}

impl<Q: Query, A: BindArg> Expression for BoundQuery<Q, A> {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        let args = self.query.write_sql(ctx, w, d, start)?;
        self.resolve(args)
    }
}

#[async_trait]
impl<Q: Query, A: BindArg> Query for BoundQuery<Q, A> {
    fn write_query(&self, ctx: &Context, w: &mut String, start: usize) -> QuarryResult<Vec<Param>> {
        let args = self.query.write_query(ctx, w, start)?;
        self.resolve(args)
    }

    fn query_type(&self) -> QueryType {
        self.query.query_type()
    }

    async fn run_hooks(&self, ctx: Context, exec: &dyn Executor) -> QuarryResult<Context> {
        self.query.run_hooks(ctx, exec).await
    }

    fn loaders(&self) -> Vec<Arc<dyn Loader>> {
        self.query.loaders()
    }

    fn mapper_mods(&self) -> Vec<Arc<dyn MapperMod>> {
        self.query.mapper_mods()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::sqlite::{self, sm};
    use crate::expr::{arg, named, x};
    use crate::mapping::Column;
    use crate::query::build;

    struct Pair {
        one: i64,
        two: String,
    }

    impl Record for Pair {
        fn columns() -> &'static [Column] {
            const COLUMNS: &[Column] = &[Column::new("one"), Column::new("two")];
            COLUMNS
        }

        fn field_value(&self, index: usize) -> Value {
            match index {
                0 => self.one.into(),
                1 => self.two.clone().into(),
                _ => Value::Null,
            }
        }
    }

    impl BindArg for Pair {
        fn shape() -> BindShape {
            record_shape::<Self>()
        }

        fn field(&self, index: usize) -> Value {
            self.field_value(index)
        }
    }

    fn named_query() -> Vec<Param> {
        let q = sqlite::select((
            sm::columns(["*"]),
            sm::from("t"),
            sm::where_(x("a").eq(named(["one"]))),
            sm::where_(x("b").eq(named(["two"]))),
        ));
        q.build(&Context::new()).unwrap().1
    }

    #[test]
    fn struct_binding_follows_placeholder_order() {
        let args = named_query();
        let values = bind_args(
            &args,
            &Pair {
                one: 1,
                two: "x".into(),
            },
        )
        .unwrap();
        assert_eq!(values, vec![Value::Int(1), Value::Text("x".into())]);
    }

    #[test]
    fn none_record_binds_nulls() {
        let args = named_query();
        let binder = Binder::<Option<Pair>>::new(&args).unwrap();
        assert_eq!(binder.to_args(&None), vec![Value::Null, Value::Null]);
        assert_eq!(binder.names(), vec!["one", "two"]);
    }

    #[test]
    fn unknown_field_fails_at_construction() {
        let args = vec![Param::named("three")];
        let err = Binder::<Pair>::new(&args).unwrap_err();
        assert!(matches!(err, QuarryError::MissingArg { name } if name == "three"));
    }

    #[test]
    fn single_value_fills_every_slot_and_keeps_literals() {
        let args = vec![Param::named("id"), Param::from(7), Param::named("id")];
        let binder = Binder::<i64>::new(&args).unwrap();
        assert_eq!(
            binder.to_args(&5),
            vec![Value::Int(5), Value::Int(7), Value::Int(5)]
        );
        assert_eq!(binder.len(), 3);
    }

    #[test]
    fn scalar_with_two_names_is_rejected() {
        let args = vec![Param::named("a"), Param::named("b")];
        assert!(matches!(
            Binder::<i64>::new(&args),
            Err(QuarryError::BadArgType)
        ));
    }

    #[test]
    fn map_binding_skips_missing_keys() {
        let args = vec![Param::named("a"), Param::named("b")];
        let mut m = HashMap::new();
        m.insert("a".to_owned(), 10_i64);
        assert_eq!(
            bind_args(&args, &m).unwrap(),
            vec![Value::Int(10), Value::Null]
        );
    }

    #[test]
    fn no_names_pass_through() {
        let args = vec![Param::from(1), Param::from("a")];
        assert_eq!(
            bind_args(&args, &Value::Null).unwrap(),
            vec![Value::Int(1), Value::Text("a".into())]
        );
    }

    #[test]
    fn bound_query_resolves_at_build() {
        let q = sqlite::select((
            sm::from("t"),
            sm::where_(x("a").eq(named(["one"]))),
            sm::where_(x("b").eq(named(["two"]))),
        ));
        let bound = bind_named(
            q,
            Pair {
                one: 3,
                two: "y".into(),
            },
        );

        let (_, args) = build(&Context::new(), &bound).unwrap();
        assert_eq!(args, vec![Param::from(3_i64), Param::from("y")]);
    }

    #[test]
    fn bound_query_rejects_mixed_args() {
        let q = sqlite::select((
            sm::from("t"),
            sm::where_(x("a").eq(named(["one"]))),
            sm::where_(x("b").eq(arg([2]))),
        ));
        let bound = bind_named(q, Pair { one: 1, two: String::new() });
        let err = build(&Context::new(), &bound).unwrap_err();
        assert!(matches!(err, QuarryError::MixedArgs));
    }
}
