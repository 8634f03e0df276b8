mod common;

use common::MockDb;
use futures_util::TryStreamExt;
use futures_util::future::BoxFuture;
use quarry::dialect::sqlite::{self, dm, im, sm, um};
use quarry::expr::{arg, x};
use quarry::{
    AfterPreloader, Context, ExecResult, ExecSettings, FromRow, MemoryRows, QuarryError,
    QuarryResult, Retrieved, Value, loader_fn, query_hook_fn, skip_model_hooks, struct_mapper,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, FromRow)]
struct Film {
    id: i64,
    title: String,
    #[orm(skip)]
    tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Tenant(i64);

fn film_rows() -> MemoryRows {
    MemoryRows::new(
        ["id", "title"],
        vec![
            vec![Value::Int(1), Value::Text("Heat".into())],
            vec![Value::Int(2), Value::Text("Ran".into())],
        ],
    )
}

fn films_query() -> quarry::BaseQuery<sqlite::SelectQuery> {
    sqlite::select((sm::columns(["id", "title"]), sm::from("films")))
}

#[tokio::test]
async fn exec_runs_hooks_then_statement_then_loaders() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();

    let q = sqlite::insert((
        im::into("films"),
        im::values([quarry::arg!(1, "Heat")]),
        im::hook(query_hook_fn(|ctx: Context| Ok(ctx.with(Tenant(7))))),
        im::preload(loader_fn(
            "audit",
            move |ctx: &Context, retrieved: Retrieved<'_>| {
                log.lock()
                    .unwrap()
                    .push((ctx.get::<Tenant>().copied(), retrieved.is_nothing()));
                Ok(())
            },
        )),
    ));

    let db = MockDb::default();
    let res = quarry::exec(&Context::new(), &db, &q).await.unwrap();

    assert_eq!(
        res,
        ExecResult {
            rows_affected: 1,
            last_insert_id: Some(42),
        }
    );
    let calls = db.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "INSERT INTO films VALUES (?1, ?2)");
    assert_eq!(calls[0].1, vec![Value::Int(1), Value::Text("Heat".into())]);
    assert_eq!(*seen.lock().unwrap(), vec![(Some(Tenant(7)), true)]);
}

static ALL_SEEN: AtomicUsize = AtomicUsize::new(0);

fn count_all<'a>(_ctx: &'a Context, films: &'a [Film]) -> BoxFuture<'a, QuarryResult<()>> {
    Box::pin(async move {
        // loaders have already run
        assert!(films.iter().all(|f| f.tags == ["loaded"]));
        ALL_SEEN.fetch_add(films.len(), Ordering::SeqCst);
        Ok(())
    })
}

#[tokio::test]
async fn all_maps_loads_and_calls_after_select() {
    let q = sqlite::select((
        sm::columns(["id", "title"]),
        sm::from("films"),
        sm::preload(loader_fn(
            "tags",
            |_ctx: &Context, mut retrieved: Retrieved<'_>| {
                if let Some(films) = retrieved.all::<Film>() {
                    for film in films {
                        film.tags.push("loaded".into());
                    }
                }
                Ok(())
            },
        )),
    ));

    let db = MockDb::new(vec![film_rows()]);
    let settings = ExecSettings::new().after_select(count_all);
    let films = quarry::all_with(&Context::new(), &db, &q, &struct_mapper(), &settings)
        .await
        .unwrap();

    assert_eq!(films.len(), 2);
    assert_eq!(films[1].title, "Ran");
    assert_eq!(films[0].tags, vec!["loaded".to_string()]);
    assert_eq!(ALL_SEEN.load(Ordering::SeqCst), 2);
    assert_eq!(db.calls()[0].0, "SELECT id, title FROM films");
}

#[tokio::test]
async fn one_without_rows_is_not_found() {
    let db = MockDb::default();
    let err = quarry::one(&Context::new(), &db, &films_query(), &struct_mapper::<Film>())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn one_takes_the_first_row() {
    let db = MockDb::new(vec![film_rows()]);
    let film = quarry::one(&Context::new(), &db, &films_query(), &struct_mapper::<Film>())
        .await
        .unwrap();
    assert_eq!(
        film,
        Film {
            id: 1,
            title: "Heat".into(),
            tags: vec![],
        }
    );
}

static SKIPPED_SEEN: AtomicUsize = AtomicUsize::new(0);

fn count_skipped<'a>(_ctx: &'a Context, films: &'a [Film]) -> BoxFuture<'a, QuarryResult<()>> {
    Box::pin(async move {
        SKIPPED_SEEN.fetch_add(films.len(), Ordering::SeqCst);
        Ok(())
    })
}

#[tokio::test]
async fn skip_model_hooks_suppresses_after_select() {
    let db = MockDb::new(vec![film_rows()]);
    let ctx = skip_model_hooks(&Context::new());
    let settings = ExecSettings::new().after_select(count_skipped);

    let films = quarry::all_with(&ctx, &db, &films_query(), &struct_mapper(), &settings)
        .await
        .unwrap();
    assert_eq!(films.len(), 2);
    assert_eq!(SKIPPED_SEEN.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cursor_loads_each_row_on_its_own() {
    let per_row = Arc::new(AtomicUsize::new(0));
    let counter = per_row.clone();

    let q = sqlite::select((
        sm::columns(["id", "title"]),
        sm::from("films"),
        sm::preload(loader_fn(
            "per_row",
            move |_ctx: &Context, mut retrieved: Retrieved<'_>| {
                if let Some(film) = retrieved.one::<Film>() {
                    film.tags.push(format!("#{}", film.id));
                    counter.fetch_add(1, Ordering::SeqCst);
                }
                Ok(())
            },
        )),
    ));

    let db = MockDb::new(vec![film_rows()]);
    let mapper = struct_mapper::<Film>();
    let cursor = quarry::cursor(&Context::new(), &db, &q, &mapper)
        .await
        .unwrap();
    assert_eq!(cursor.columns(), ["id", "title"]);

    let films: Vec<Film> = cursor.into_stream().try_collect().await.unwrap();
    assert_eq!(films.len(), 2);
    assert_eq!(films[1].tags, vec!["#2".to_string()]);
    assert_eq!(per_row.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn cached_query_does_not_rerun_hooks() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();

    let q = sqlite::select((
        sm::columns(["id", "title"]),
        sm::from("films"),
        sm::where_(x("id").eq(arg([1]))),
        sm::hook(query_hook_fn(move |ctx: Context| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(ctx)
        })),
    ));

    let db = MockDb::new(vec![film_rows(), film_rows()]);
    let ctx = Context::new();
    let cached = quarry::cache(&ctx, &db, &q).await.unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    for _ in 0..2 {
        let films = quarry::all(&ctx, &db, &cached, &struct_mapper::<Film>())
            .await
            .unwrap();
        assert_eq!(films.len(), 2);
    }
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    let calls = db.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].0, "SELECT id, title FROM films WHERE (id = ?1)");
    assert_eq!(calls[0].1, calls[1].1);
}

#[tokio::test]
async fn hook_error_aborts_before_the_database() {
    let q = sqlite::delete((
        dm::from("films"),
        dm::hook(query_hook_fn(|_ctx: Context| {
            Err(QuarryError::Hook("read only".into()))
        })),
    ));

    let db = MockDb::default();
    let err = quarry::exec(&Context::new(), &db, &q).await.unwrap_err();
    assert!(matches!(err, QuarryError::Hook(ref msg) if msg == "read only"));
    assert!(db.calls().is_empty());
}

#[tokio::test]
async fn loader_errors_carry_the_loader_name() {
    let q = sqlite::select((
        sm::from("films"),
        sm::preload(loader_fn("boom", |_ctx: &Context, _retrieved| {
            Err(QuarryError::Other("nope".into()))
        })),
    ));

    let db = MockDb::new(vec![film_rows()]);
    let err = quarry::all(&Context::new(), &db, &q, &struct_mapper::<Film>())
        .await
        .unwrap_err();
    match err {
        QuarryError::Loader { loader, source } => {
            assert_eq!(loader, "boom");
            assert_eq!(source.to_string(), "nope");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn update_renders_set_and_where() {
    let q = sqlite::update((
        um::table("films"),
        um::set_col("title").to_arg("Heat"),
        um::where_(x("id").eq(arg([7]))),
    ));

    let db = MockDb::default();
    quarry::exec(&Context::new(), &db, &q).await.unwrap();

    let calls = db.calls();
    assert_eq!(calls[0].0, "UPDATE films SET \"title\" = ?1 WHERE (id = ?2)");
    assert_eq!(calls[0].1, vec![Value::Text("Heat".into()), Value::Int(7)]);
}

fn related_tags(batches: Arc<Mutex<Vec<Vec<i64>>>>) -> AfterPreloader<Film> {
    AfterPreloader::<Film>::new().with_loader(loader_fn(
        "related",
        move |_ctx: &Context, mut retrieved: Retrieved<'_>| {
            let ids: Vec<i64> = if let Some(films) = retrieved.all::<Film>() {
                for film in films.iter_mut() {
                    film.tags.push(format!("related to {}", film.id));
                }
                films.iter().map(|f| f.id).collect()
            } else if let Some(film) = retrieved.one::<Film>() {
                film.tags.push(format!("related to {}", film.id));
                vec![film.id]
            } else {
                Vec::new()
            };
            batches.lock().unwrap().push(ids);
            Ok(())
        },
    ))
}

#[tokio::test]
async fn after_preloader_loads_into_the_returned_records() {
    let batches = Arc::new(Mutex::new(Vec::new()));
    let q = sqlite::select((
        sm::columns(["id", "title"]),
        sm::from("films"),
        sm::after_preload(related_tags(batches.clone())),
    ));

    let db = MockDb::new(vec![film_rows()]);
    let films = quarry::all(&Context::new(), &db, &q, &struct_mapper::<Film>())
        .await
        .unwrap();

    assert_eq!(*batches.lock().unwrap(), vec![vec![1, 2]]);
    assert_eq!(films[0].tags, vec!["related to 1".to_string()]);
    assert_eq!(films[1].tags, vec!["related to 2".to_string()]);
}

#[tokio::test]
async fn after_preloader_loads_a_single_record() {
    let batches = Arc::new(Mutex::new(Vec::new()));
    let q = sqlite::select((
        sm::columns(["id", "title"]),
        sm::from("films"),
        sm::after_preload(related_tags(batches.clone())),
    ));

    let db = MockDb::new(vec![film_rows()]);
    let film = quarry::one(&Context::new(), &db, &q, &struct_mapper::<Film>())
        .await
        .unwrap();

    assert_eq!(*batches.lock().unwrap(), vec![vec![1]]);
    assert_eq!(film.tags, vec!["related to 1".to_string()]);
}

fn rows_without_title() -> MemoryRows {
    MemoryRows::new(["id"], vec![vec![Value::Int(1)], vec![Value::Int(2)]])
}

#[tokio::test]
async fn mapping_errors_close_the_rows() {
    let db = MockDb::new(vec![rows_without_title(), rows_without_title()]);
    let ctx = Context::new();
    let mapper = struct_mapper::<Film>();

    let err = quarry::one(&ctx, &db, &films_query(), &mapper)
        .await
        .unwrap_err();
    assert_eq!(err.meta(), ["title"]);
    assert_eq!(db.closed(), 1);

    quarry::all(&ctx, &db, &films_query(), &mapper)
        .await
        .unwrap_err();
    assert_eq!(db.closed(), 2);
}

#[tokio::test]
async fn cursor_closes_the_rows_on_the_first_error() {
    let db = MockDb::new(vec![rows_without_title()]);
    let mapper = struct_mapper::<Film>();
    let mut cursor = quarry::cursor(&Context::new(), &db, &films_query(), &mapper)
        .await
        .unwrap();

    assert!(cursor.next().await.is_err());
    assert_eq!(db.closed(), 1);

    // stays finished and does not close twice
    assert!(cursor.next().await.unwrap().is_none());
    cursor.close().await.unwrap();
    assert_eq!(db.closed(), 1);
}

#[tokio::test]
async fn exhausted_cursor_closes_once() {
    let db = MockDb::new(vec![film_rows()]);
    let mapper = struct_mapper::<Film>();
    let mut cursor = quarry::cursor(&Context::new(), &db, &films_query(), &mapper)
        .await
        .unwrap();

    let mut ids = Vec::new();
    while let Some(film) = cursor.next().await.unwrap() {
        ids.push(film.id);
    }
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(db.closed(), 1);
}
