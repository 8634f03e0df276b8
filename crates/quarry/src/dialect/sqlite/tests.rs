use super::*;
use crate::clause::Window;
use crate::context::{Context, skip_contextual_mods};
use crate::dialect::psql;
use crate::error::{QuarryError, QuarryResult};
use crate::expr::{arg, concat, named_arg, p, s, x};
use crate::query::{BaseQuery, QueryType};
use crate::value::Param;

fn normalize_sql(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn build<E: QueryBody>(q: &BaseQuery<E>) -> (String, Vec<Param>) {
    let (sql, args) = q.build(&Context::new()).unwrap();
    (normalize_sql(&sql), args)
}

#[test]
fn select_with_in_list() {
    let q = select((
        sm::columns(["id", "name"]),
        sm::from("users"),
        sm::where_(x("id").in_([arg([100, 200, 300])])),
    ));

    let (sql, args) = build(&q);
    assert_eq!(sql, "SELECT id, name FROM users WHERE (id IN (?1, ?2, ?3))");
    assert_eq!(args, vec![Param::from(100), Param::from(200), Param::from(300)]);
}

#[test]
fn bulk_insert_numbers_across_rows() {
    let q = insert((
        im::into("films"),
        im::values([crate::arg!("UA502", "Bananas", 105)]),
        im::values([crate::arg!("UA502", "Bananas", 105)]),
    ));

    let (sql, args) = build(&q);
    assert_eq!(sql, "INSERT INTO films VALUES (?1, ?2, ?3), (?4, ?5, ?6)");
    assert_eq!(args.len(), 6);
    assert_eq!(args[3], Param::from("UA502"));
    assert_eq!(args[5], Param::from(105));
}

#[test]
fn upsert_do_update_with_where() {
    let q = insert((
        im::into_as("distributors", "d", ["did", "dname"]),
        im::values([crate::arg!(8, "Anvil")]),
        im::values([crate::arg!(9, "Sentry")]),
        im::on_conflict(["did"])
            .do_update()
            .set(
                "dname",
                concat([
                    "EXCLUDED.dname".into_expr(),
                    s(" (formerly ").into_expr(),
                    "d.dname".into_expr(),
                    s(")").into_expr(),
                ]),
            )
            .where_(x("d.zipcode").ne(s("21201"))),
    ));

    let (sql, args) = build(&q);
    assert_eq!(
        sql,
        "INSERT INTO distributors AS \"d\" (\"did\", \"dname\") VALUES (?1, ?2), (?3, ?4) \
         ON CONFLICT (did) DO UPDATE SET dname = (EXCLUDED.dname || ' (formerly ' || d.dname || ')') \
         WHERE (d.zipcode <> '21201')"
    );
    assert_eq!(
        args,
        vec![Param::from(8), Param::from("Anvil"), Param::from(9), Param::from("Sentry")]
    );
}

#[test]
fn insert_or_replace_and_do_nothing() {
    let q = insert((
        im::or_replace(),
        im::into("distributors").columns(["did", "dname"]),
        im::values([crate::arg!(8, "Anvil")]),
        im::on_conflict(Vec::<&str>::new()).do_nothing(),
        im::returning(["did"]),
    ));

    let (sql, _) = build(&q);
    assert_eq!(
        sql,
        "INSERT OR REPLACE INTO distributors (\"did\", \"dname\") VALUES (?1, ?2) \
         ON CONFLICT DO NOTHING RETURNING did"
    );
}

#[test]
fn conflict_target_with_do_nothing() {
    let q = insert((
        im::into("distributors").columns(["did", "dname"]),
        im::values([crate::arg!(7, "Redline")]),
        im::on_conflict(["did"]).on_where(x("is_active")).do_nothing(),
    ));

    let (sql, _) = build(&q);
    assert_eq!(
        sql,
        "INSERT INTO distributors (\"did\", \"dname\") VALUES (?1, ?2) \
         ON CONFLICT (did) WHERE is_active DO NOTHING"
    );
}

#[test]
fn insert_set_excluded_and_default_values() {
    let q = insert((
        im::into("t"),
        im::on_conflict(["id"]).do_update().set_excluded(["name", ""]),
    ));

    let (sql, _) = build(&q);
    assert_eq!(
        sql,
        "INSERT INTO t DEFAULT VALUES ON CONFLICT (id) DO UPDATE SET \"name\" = EXCLUDED.\"name\""
    );
}

#[test]
fn insert_from_select() {
    let source = select((
        sm::columns(["a", "b"]),
        sm::from("staging"),
        sm::where_(x("ok").eq(arg([true]))),
    ));
    let q = insert((im::into("t").columns(["a", "b"]), im::query(source)));

    let (sql, args) = build(&q);
    assert_eq!(sql, "INSERT INTO t (\"a\", \"b\") SELECT a, b FROM staging WHERE (ok = ?1)");
    assert_eq!(args, vec![Param::from(true)]);
}

#[test]
fn update_with_subselect() {
    let sub = select((
        sm::columns(["sales_person"]),
        sm::from("accounts"),
        sm::where_(x("name").eq(arg(["Acme Corporation"]))),
    ));
    let q = update((
        um::table_as("employees", "e"),
        um::table_not_indexed(),
        um::set("sales_count", "sales_count + 1"),
        um::where_(x("id").eq(p(sub))),
    ));

    let (sql, args) = build(&q);
    assert_eq!(
        sql,
        "UPDATE employees AS \"e\" NOT INDEXED SET \"sales_count\" = sales_count + 1 \
         WHERE (id = (SELECT sales_person FROM accounts WHERE (name = ?1)))"
    );
    assert_eq!(args, vec![Param::from("Acme Corporation")]);
}

#[test]
fn update_or_abort_from_join_returning() {
    let q = update((
        um::or_abort(),
        um::table("films"),
        um::set_col("kind").to_arg("Dramatic"),
        um::from("genres").as_("g"),
        um::inner_join("labels").as_("l").on_eq("l.id", "g.label_id"),
        um::where_(x("films.genre_id").eq("g.id")),
        um::returning(["films.id"]),
    ));

    let (sql, args) = build(&q);
    assert_eq!(
        sql,
        "UPDATE OR ABORT films SET \"kind\" = ?1 FROM genres AS \"g\" \
         INNER JOIN labels AS \"l\" ON (l.id = g.label_id) \
         WHERE (films.genre_id = g.id) RETURNING films.id"
    );
    assert_eq!(args, vec![Param::from("Dramatic")]);
}

#[test]
fn update_without_set_fails() {
    let q = update(um::table("films"));
    let err = q.build(&Context::new()).unwrap_err();
    assert!(matches!(err, QuarryError::EmptySet));
}

#[test]
fn delete_with_index_order_and_limit() {
    let q = delete((
        dm::from("films").as_("f"),
        dm::indexed_by("films_kind"),
        dm::where_(x("kind").ne(arg(["Musical"]))),
        dm::returning(["*"]),
        dm::order_by("id").desc(),
        dm::limit(10_i64),
        dm::offset(arg([5])),
    ));

    let (sql, args) = build(&q);
    assert_eq!(
        sql,
        "DELETE FROM films AS \"f\" INDEXED BY films_kind WHERE (kind <> ?1) \
         RETURNING * ORDER BY id DESC LIMIT 10 OFFSET ?2"
    );
    assert_eq!(args, vec![Param::from("Musical"), Param::from(5)]);
}

#[test]
fn delete_not_indexed_and_typed_where() {
    let q = delete((
        dm::from("films"),
        dm::not_indexed(),
        where_col("id").in_([1, 2]),
        where_col("deleted_at").is_null(),
    ));

    let (sql, args) = build(&q);
    assert_eq!(
        sql,
        "DELETE FROM films NOT INDEXED WHERE (id IN (?1, ?2)) AND (deleted_at IS NULL)"
    );
    assert_eq!(args, vec![Param::from(1), Param::from(2)]);
}

#[test]
fn select_distinct_join_group_having_window() {
    let q = select((
        sm::distinct(),
        sm::columns(["u.id", "count(*)"]),
        sm::from("users").as_("u"),
        sm::left_join("posts").as_("p").not_indexed().on_eq("p.user_id", "u.id"),
        sm::group_by("u.id"),
        sm::having(x("count(*)").gt(arg([3]))),
        sm::window("w", Window::default().partition_by(["u.team"])),
        sm::order_by("u.id").asc(),
        sm::limit(20_i64),
        sm::offset(40_i64),
    ));

    let (sql, args) = build(&q);
    assert_eq!(
        sql,
        "SELECT DISTINCT u.id, count(*) FROM users AS \"u\" \
         LEFT JOIN posts AS \"p\" NOT INDEXED ON (p.user_id = u.id) \
         GROUP BY u.id HAVING (count(*) > ?1) WINDOW w AS (PARTITION BY u.team) \
         ORDER BY u.id ASC LIMIT 20 OFFSET 40"
    );
    assert_eq!(args, vec![Param::from(3)]);
}

#[test]
fn select_with_cte_and_union() {
    let recent = select((sm::columns(["id"]), sm::from("orders"), sm::where_(x("day").gt(arg([7])))));
    let archived = select((sm::columns(["id"]), sm::from("archive"), sm::where_(x("day").gt(arg([30])))));

    let q = select((
        sm::with("recent").columns(["id"]).as_(recent),
        sm::columns(["id"]),
        sm::from("recent"),
        sm::union_all(archived),
    ));

    let (sql, args) = build(&q);
    assert_eq!(
        sql,
        "WITH recent(\"id\") AS (SELECT id FROM orders WHERE (day > ?1)) \
         SELECT id FROM recent UNION ALL SELECT id FROM archive WHERE (day > ?2)"
    );
    assert_eq!(args, vec![Param::from(7), Param::from(30)]);
}

#[test]
fn last_limit_wins() {
    let q = select((sm::from("t"), sm::limit(1_i64), sm::limit(2_i64)));
    assert_eq!(build(&q).0, "SELECT * FROM t LIMIT 2");
}

#[test]
fn raw_with_escape_and_inline_group() {
    let q = raw(
        r"SELECT a FROM t WHERE x = \? AND y = ? AND z IN ?",
        [RawArg::from(42), crate::arg_group!(1, 2, 3).into()],
    );

    let (sql, args) = q.build(&Context::new()).unwrap();
    assert_eq!(sql, "SELECT a FROM t WHERE x = ? AND y = ?1 AND z IN (?2, ?3, ?4)");
    assert_eq!(
        args,
        vec![Param::from(42), Param::from(1), Param::from(2), Param::from(3)]
    );
    assert_eq!(q.query_type, QueryType::Unknown);
}

#[test]
fn values_statement() {
    let q = values([[1_i64, 2], [3, 4]]);
    assert_eq!(build(&q).0, "VALUES (1, 2), (3, 4)");

    let empty = values(Vec::<Vec<i64>>::new());
    assert!(matches!(empty.build(&Context::new()), Err(QuarryError::EmptyValues)));
}

#[test]
fn named_placeholder_uses_colon() {
    let q = select((sm::from("t"), sm::where_(x("id").eq(named_arg("id")))));
    assert_eq!(build(&q).0, "SELECT * FROM t WHERE (id = :id)");
}

#[test]
fn embedded_query_keeps_its_own_dialect() {
    let inner = BaseQuery::new(
        SelectQuery::default(),
        &psql::DIALECT,
        QueryType::Select,
    )
    .with((sm::columns(["id"]), sm::from("a"), sm::where_(x("k").eq(arg([2])))));

    let q = select((
        sm::from("b"),
        sm::where_(x("v").eq(arg([1]))),
        sm::where_(x("id").in_([inner])),
    ));

    let (sql, args) = build(&q);
    assert_eq!(sql, "SELECT * FROM b WHERE (v = ?1) AND (id IN (SELECT id FROM a WHERE (k = $2)))");
    assert_eq!(args, vec![Param::from(1), Param::from(2)]);
}

#[test]
fn build_n_offsets_placeholders() {
    let q = select((sm::from("t"), sm::where_(x("id").eq(arg([1])))));
    let (sql, _) = q.build_n(&Context::new(), 4).unwrap();
    assert_eq!(normalize_sql(&sql), "SELECT * FROM t WHERE (id = ?4)");
}

#[test]
fn contextual_mods_run_at_build_time() {
    let q = select((
        sm::from("t"),
        sm::contextual(|ctx: Context, q: &mut SelectQuery| -> QuarryResult<Context> {
            let tenant = ctx.get::<i64>().copied().unwrap_or_default();
            q.where_.conditions.push(x("tenant").eq(arg([tenant])).into_expr());
            Ok(ctx)
        }),
    ));

    let ctx = Context::new().with(9_i64);
    let (sql, args) = q.build(&ctx).unwrap();
    assert_eq!(normalize_sql(&sql), "SELECT * FROM t WHERE (tenant = ?1)");
    assert_eq!(args, vec![Param::from(9_i64)]);

    // the container itself is untouched
    assert!(q.expression.where_.is_empty());

    let (sql, _) = q.build(&skip_contextual_mods(&ctx)).unwrap();
    assert_eq!(normalize_sql(&sql), "SELECT * FROM t");
}
