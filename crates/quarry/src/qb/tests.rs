//! Builder and expression tests, compiled against Postgres unless noted.

use crate::dialect::{MySqlDialect, PgDialect};
use crate::qb::*;
use crate::schema::{ColumnType, Table, integer, serial, text};
use crate::sql::{Bindings, Fragment};
use crate::value::Value;

fn users() -> Table {
    Table::builder("users")
        .column(serial("id").primary_key())
        .column(text("name").not_null())
        .column(integer("age"))
        .build()
        .unwrap()
}

fn posts() -> Table {
    Table::builder("posts")
        .column(serial("id").primary_key())
        .column(integer("author_id").not_null())
        .column(text("title"))
        .build()
        .unwrap()
}

fn pg_sql(statement: &impl Statement) -> String {
    statement.to_sql(&PgDialect).unwrap().sql().to_string()
}

fn where_sql(condition: Fragment) -> String {
    let users = users();
    let sql = pg_sql(&select([&users["id"]]).from(&users).filter(condition));
    sql.trim_start_matches(r#"SELECT "users"."id" FROM "users" WHERE "#)
        .to_string()
}

// ==================== Expressions ====================

#[test]
fn test_and_or_empty_and_single() {
    assert!(and(Vec::<Fragment>::new()).is_none());
    assert!(or([None::<Fragment>, None]).is_none());

    let users = users();
    let single = and([eq(&users["id"], 1)]).unwrap();
    assert_eq!(where_sql(single), r#"("users"."id" = $1)"#);

    let q = select([&users["id"]])
        .from(&users)
        .filter(and(Vec::<Fragment>::new()));
    assert_eq!(pg_sql(&q), r#"SELECT "users"."id" FROM "users""#);
}

#[test]
fn test_and_or_nesting_keeps_param_order() {
    let users = users();
    let cond = and([
        Some(eq(&users["id"], 1)),
        None,
        or([eq(&users["name"], "a"), eq(&users["name"], "b")]),
    ])
    .unwrap();
    let q = select([&users["id"]])
        .from(&users)
        .filter(cond)
        .to_sql(&PgDialect)
        .unwrap();
    assert_eq!(
        q.sql(),
        r#"SELECT "users"."id" FROM "users" WHERE ("users"."id" = $1 AND ("users"."name" = $2 OR "users"."name" = $3))"#
    );
    assert_eq!(
        q.values().unwrap(),
        vec![Value::Int(1), Value::Text("a".into()), Value::Text("b".into())]
    );
}

#[test]
fn test_comparison_operators() {
    let users = users();
    assert_eq!(where_sql(ne(&users["age"], 1)), r#""users"."age" <> $1"#);
    assert_eq!(where_sql(lte(&users["age"], 1)), r#""users"."age" <= $1"#);
    assert_eq!(where_sql(not_like(&users["name"], "a%")), r#""users"."name" NOT LIKE $1"#);
    assert_eq!(where_sql(is_null(&users["age"])), r#""users"."age" IS NULL"#);
    assert_eq!(
        where_sql(not(is_not_null(&users["age"]))),
        r#"NOT ("users"."age" IS NOT NULL)"#
    );
    assert_eq!(
        where_sql(between(&users["age"], 18, 65)),
        r#""users"."age" BETWEEN $1 AND $2"#
    );
    assert_eq!(
        where_sql(not_between(&users["age"], 18, 65)),
        r#""users"."age" NOT BETWEEN $1 AND $2"#
    );
    assert_eq!(
        where_sql(eq(&users["age"], raw("2 + 2"))),
        r#""users"."age" = 2 + 2"#
    );
}

#[test]
fn test_in_array() {
    let users = users();
    let q = select([&users["id"]])
        .from(&users)
        .filter(in_array(&users["id"], [1, 2, 3]))
        .to_sql(&PgDialect)
        .unwrap();
    assert!(q.sql().ends_with(r#"WHERE "users"."id" IN ($1, $2, $3)"#));
    assert!(q.params().iter().all(|p| p.ty == Some(ColumnType::Serial)));

    assert_eq!(
        where_sql(not_in_array(&users["name"], ["a"])),
        r#""users"."name" NOT IN ($1)"#
    );
}

#[test]
fn test_empty_in_array_is_malformed() {
    let users = users();
    let q = select([&users["id"]])
        .from(&users)
        .filter(in_array(&users["id"], Vec::<i64>::new()));
    assert!(q.to_sql(&PgDialect).unwrap_err().is_malformed());
    assert!(q.to_sql(&MySqlDialect).unwrap_err().is_malformed());
}

#[test]
fn test_null_operand_binds_null() {
    let users = users();
    let q = select([&users["id"]])
        .from(&users)
        .filter(eq(&users["age"], None::<i32>))
        .to_sql(&PgDialect)
        .unwrap();
    assert_eq!(q.values().unwrap(), vec![Value::Null]);
}

// ==================== SELECT ====================

#[test]
fn test_self_join_with_aliases() {
    let employees = Table::builder("employees")
        .column(serial("id").primary_key())
        .column(integer("manager_id"))
        .column(text("name"))
        .build()
        .unwrap();
    let e = employees.aliased("e");
    let m = employees.aliased("m");

    let q = select([field("employee", &e["name"]), field("manager", &m["name"])])
        .from(&e)
        .left_join(&m, eq(&e["manager_id"], &m["id"]));
    assert_eq!(
        pg_sql(&q),
        r#"SELECT "e"."name" AS "employee", "m"."name" AS "manager" FROM "employees" AS "e" LEFT JOIN "employees" AS "m" ON "e"."manager_id" = "m"."id""#
    );
}

#[test]
fn test_group_by_having_with_aggregates() {
    let posts = posts();
    let q = select([field("author_id", &posts["author_id"]), field("n", count())])
        .from(&posts)
        .group_by([&posts["author_id"]])
        .having(gt(count(), 2))
        .order_by([desc(count())])
        .to_sql(&PgDialect)
        .unwrap();
    assert_eq!(
        q.sql(),
        r#"SELECT "posts"."author_id", count(*) AS "n" FROM "posts" GROUP BY "posts"."author_id" HAVING count(*) > $1 ORDER BY count(*) DESC"#
    );
    let types: Vec<_> = q.fields().iter().map(|f| f.ty).collect();
    assert_eq!(types, [Some(ColumnType::Integer), None]);
}

#[test]
fn test_concat_binds_after_column_type() {
    let users = users();
    let q = select([&users["id"]])
        .from(&users)
        .filter(eq(concat(&users["name"], "-x"), "bob-x"))
        .to_sql(&PgDialect)
        .unwrap();
    assert!(q.sql().ends_with(r#"WHERE "users"."name" || $1 = $2"#));
    assert_eq!(q.params()[0].ty, Some(ColumnType::Text));
    assert_eq!(
        q.values().unwrap(),
        vec![Value::Text("-x".into()), Value::Text("bob-x".into())]
    );
}

#[test]
fn test_substring_bounds() {
    let users = users();
    let name = &users["name"];

    let q = select([field("s", substring(name).from(2).length(3))])
        .from(&users)
        .to_sql(&PgDialect)
        .unwrap();
    assert_eq!(
        q.sql(),
        r#"SELECT substring("users"."name", $1, $2) AS "s" FROM "users""#
    );
    assert_eq!(q.values().unwrap(), vec![Value::Int(2), Value::Int(3)]);
    assert!(q.params().iter().all(|p| p.ty == Some(ColumnType::Text)));

    // absent bounds are left out
    assert_eq!(
        where_sql(eq(substring(name).from(placeholder("at")), "b")),
        r#"substring("users"."name", $1) = $2"#
    );
    assert_eq!(
        where_sql(eq(substring(name).length(1), "b")),
        r#"substring("users"."name", 1, $1) = $2"#
    );
    assert_eq!(
        where_sql(eq(substring(name), "b")),
        r#"substring("users"."name", 1) = $1"#
    );
}

#[test]
fn test_row_id() {
    let users = users();
    let q = select([field("rid", row_id())])
        .from(&users)
        .order_by([desc(row_id())]);
    assert_eq!(
        q.to_sql(&crate::dialect::SqliteDialect).unwrap().sql(),
        r#"SELECT rowid AS "rid" FROM "users" ORDER BY rowid DESC"#
    );
}

#[test]
fn test_aggregate_functions() {
    let posts = posts();
    let q = select([
        field("total", sum(&posts["id"])),
        field("mean", avg(&posts["id"])),
        field("lo", min(&posts["id"])),
        field("hi", max(&posts["id"])),
        field("titled", count_of(&posts["title"])),
    ])
    .from(&posts);
    assert_eq!(
        pg_sql(&q),
        r#"SELECT sum("posts"."id") AS "total", avg("posts"."id") AS "mean", min("posts"."id") AS "lo", max("posts"."id") AS "hi", count("posts"."title") AS "titled" FROM "posts""#
    );
}

#[test]
fn test_select_distinct_and_asc() {
    let users = users();
    let q = select_distinct([&users["name"]])
        .from(&users)
        .order_by([asc(&users["name"])]);
    assert_eq!(
        pg_sql(&q),
        r#"SELECT DISTINCT "users"."name" FROM "users" ORDER BY "users"."name" ASC"#
    );
}

#[test]
fn test_select_requires_fields() {
    let users = users();
    let q = select(Vec::<SelectField>::new()).from(&users);
    assert!(q.to_sql(&PgDialect).unwrap_err().is_malformed());
}

#[test]
fn test_replace_filter() {
    let users = users();
    let q = select([&users["id"]])
        .from(&users)
        .filter(eq(&users["id"], 1))
        .replace_filter(eq(&users["id"], 2));
    let compiled = q.to_sql(&PgDialect).unwrap();
    assert!(compiled.sql().ends_with(r#"WHERE "users"."id" = $1"#));
    assert_eq!(compiled.values().unwrap(), vec![Value::Int(2)]);

    let q = q.replace_filter(None::<Fragment>);
    assert_eq!(pg_sql(&q), r#"SELECT "users"."id" FROM "users""#);
}

#[test]
fn test_replace_filter_on_mutations() {
    let users = users();
    let q = update(&users)
        .set(Values::new().set("name", "x"))
        .filter(eq(&users["id"], 1))
        .replace_filter(eq(&users["id"], 2));
    let compiled = q.to_sql(&PgDialect).unwrap();
    assert!(compiled.sql().ends_with(r#"WHERE "users"."id" = $2"#));
    assert_eq!(compiled.values().unwrap()[1], Value::Int(2));

    // after RETURNING, filter is gone but the predicate can still be swapped
    let q = delete(&users)
        .returning_fields([&users["id"]])
        .replace_filter(eq(&users["id"], 3));
    assert_eq!(
        pg_sql(&q),
        r#"DELETE FROM "users" WHERE "users"."id" = $1 RETURNING "id""#
    );
}

#[test]
fn test_compilation_is_repeatable_and_forks_are_independent() {
    let users = users();
    let base = select([&users["id"]]).from(&users).filter(eq(&users["id"], 1));
    let first = base.to_sql(&PgDialect).unwrap();
    let fork = base.clone().replace_filter(eq(&users["name"], "x"));
    assert_eq!(base.to_sql(&PgDialect).unwrap(), first);
    assert_ne!(fork.to_sql(&PgDialect).unwrap(), first);
}

// ==================== Subqueries and CTEs ====================

#[test]
fn test_subquery_as_source() {
    let users = users();
    let adults = select([&users["id"], &users["name"]])
        .from(&users)
        .filter(gte(&users["age"], 18))
        .as_subquery("adults");
    assert_eq!(adults.alias(), "adults");

    let q = select([&adults["name"]])
        .from(&adults)
        .filter(eq(&adults["id"], 7))
        .to_sql(&PgDialect)
        .unwrap();
    assert_eq!(
        q.sql(),
        r#"SELECT "adults"."name" FROM (SELECT "users"."id", "users"."name" FROM "users" WHERE "users"."age" >= $1) AS "adults" WHERE "adults"."id" = $2"#
    );
    assert_eq!(q.values().unwrap(), vec![Value::Int(18), Value::Int(7)]);
    // exported columns keep their source type
    assert_eq!(q.fields()[0].ty, Some(ColumnType::Text));
}

#[test]
fn test_subquery_params_interleave_with_outer() {
    let users = users();
    let posts = posts();
    let authors = select([&posts["author_id"]])
        .from(&posts)
        .filter(like(&posts["title"], "%rust%"));
    let q = select([&users["name"]])
        .from(&users)
        .filter(and([
            eq(&users["age"], 30),
            in_subquery(&users["id"], authors),
        ]))
        .limit(5)
        .to_sql(&PgDialect)
        .unwrap();
    assert_eq!(
        q.sql(),
        r#"SELECT "users"."name" FROM "users" WHERE ("users"."age" = $1 AND "users"."id" IN (SELECT "posts"."author_id" FROM "posts" WHERE "posts"."title" LIKE $2)) LIMIT $3"#
    );
    assert_eq!(
        q.values().unwrap(),
        vec![Value::Int(30), Value::Text("%rust%".into()), Value::Int(5)]
    );
}

#[test]
fn test_exists_subquery() {
    let users = users();
    let posts = posts();
    let has_posts = select([&posts["id"]])
        .from(&posts)
        .filter(eq(&posts["author_id"], &users["id"]));
    assert_eq!(
        where_sql(exists(has_posts.clone())),
        r#"EXISTS (SELECT "posts"."id" FROM "posts" WHERE "posts"."author_id" = "users"."id")"#
    );
    assert!(where_sql(not_exists(has_posts)).starts_with("NOT EXISTS (SELECT"));
}

#[test]
fn test_registered_cte() {
    let users = users();
    let grown = select([&users["id"], &users["name"]])
        .from(&users)
        .filter(gt(&users["age"], 21))
        .as_cte("grown");

    let q = with([&grown])
        .select([&grown["name"]])
        .from(&grown)
        .filter(eq(&grown["id"], 3))
        .to_sql(&PgDialect)
        .unwrap();
    assert_eq!(
        q.sql(),
        r#"WITH "grown" AS (SELECT "users"."id", "users"."name" FROM "users" WHERE "users"."age" > $1) SELECT "grown"."name" FROM "grown" WHERE "grown"."id" = $2"#
    );
    assert_eq!(q.values().unwrap(), vec![Value::Int(21), Value::Int(3)]);
}

#[test]
fn test_unregistered_cte_is_malformed() {
    let users = users();
    let grown = select([&users["id"]]).from(&users).as_cte("grown");
    let q = select([&grown["id"]]).from(&grown);
    assert!(q.to_sql(&PgDialect).unwrap_err().is_malformed());

    let q = select([&users["id"]])
        .from(&users)
        .inner_join(&grown, eq(&users["id"], &grown["id"]));
    assert!(q.to_sql(&PgDialect).unwrap_err().is_malformed());
}

#[test]
fn test_cte_visible_in_nested_subquery() {
    let users = users();
    let grown = select([&users["id"]])
        .from(&users)
        .filter(gt(&users["age"], 21))
        .as_cte("grown");
    let q = with([&grown])
        .select([&users["name"]])
        .from(&users)
        .filter(in_subquery(&users["id"], select([&grown["id"]]).from(&grown)));
    let sql = pg_sql(&q);
    assert!(sql.starts_with(r#"WITH "grown" AS ("#));
    assert!(sql.ends_with(r#"IN (SELECT "grown"."id" FROM "grown")"#));
}

// ==================== Placeholders ====================

#[test]
fn test_placeholders_resolve_by_name() {
    let users = users();
    let q = select([&users["id"]])
        .from(&users)
        .filter(eq(&users["name"], placeholder("name")))
        .limit(placeholder("n"))
        .to_sql(&PgDialect)
        .unwrap();
    assert_eq!(
        q.sql(),
        r#"SELECT "users"."id" FROM "users" WHERE "users"."name" = $1 LIMIT $2"#
    );
    assert_eq!(q.params()[0].ty, Some(ColumnType::Text));
    assert!(q.values().unwrap_err().is_malformed());

    let values = q
        .resolve(&Bindings::new().set("name", "alice").set("n", 10))
        .unwrap();
    assert_eq!(values, vec![Value::Text("alice".into()), Value::Int(10)]);
}

// ==================== Mutations ====================

#[test]
fn test_insert_multi_row_params_in_row_order() {
    let users = users();
    let q = insert(&users)
        .values([
            Values::new().set("name", "a").set("age", 1),
            Values::new().set("name", "b").set("age", 2),
        ])
        .returning_fields([&users["id"]])
        .to_sql(&PgDialect)
        .unwrap();
    assert_eq!(
        q.sql(),
        r#"INSERT INTO "users" ("name", "age") VALUES ($1, $2), ($3, $4) RETURNING "id""#
    );
    assert_eq!(
        q.values().unwrap(),
        vec![
            Value::Text("a".into()),
            Value::Int(1),
            Value::Text("b".into()),
            Value::Int(2),
        ]
    );
    assert_eq!(q.fields()[0].name, "id");
}

#[test]
fn test_update_unknown_field_is_malformed() {
    let users = users();
    let q = update(&users).set(Values::new().set("nickname", "x"));
    assert!(q.to_sql(&PgDialect).unwrap_err().is_malformed());
}

#[test]
fn test_update_with_sql_value() {
    let users = users();
    let q = update(&users)
        .set(Values::new().set("age", Fragment::template("? + ?", [Fragment::column(&users["age"]), Fragment::param(1)])))
        .filter(eq(&users["id"], 9));
    assert_eq!(
        pg_sql(&q),
        r#"UPDATE "users" SET "age" = "users"."age" + $1 WHERE "users"."id" = $2"#
    );
}

#[test]
fn test_statement_kinds() {
    let users = users();
    assert_eq!(select_all().from(&users).kind(), StatementKind::Select);
    assert_eq!(
        insert(&users).values(Values::new()).kind(),
        StatementKind::Insert
    );
    assert_eq!(
        update(&users).set(Values::new()).kind(),
        StatementKind::Update
    );
    assert_eq!(delete(&users).kind(), StatementKind::Delete);
}
