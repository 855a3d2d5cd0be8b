use quarry::prelude::*;
use quarry::{CompiledQuery, StatementKind};

fn schema() -> (Table, Table) {
    let users = Table::builder("users")
        .column(big_serial("id").primary_key())
        .column(varchar("name", 80).not_null())
        .column(integer("age"))
        .column(timestamptz("created_at").has_default())
        .build()
        .unwrap();
    let posts = Table::builder("posts")
        .column(serial("id").primary_key())
        .column(big_int("author_id").not_null())
        .column(text("title"))
        .column(double("score"))
        .build()
        .unwrap();
    (users, posts)
}

type Build = Box<dyn Fn(&dyn Dialect) -> QueryResult<CompiledQuery>>;

/// A spread of statements with params in every clause position.
fn statements(users: &Table, posts: &Table) -> Vec<Build> {
    let mut out: Vec<Build> = Vec::new();

    let (u, p) = (users.clone(), posts.clone());
    out.push(Box::new(move |d: &dyn Dialect| {
        let recent = select([&p["author_id"]])
            .from(&p)
            .filter(gt(&p["score"], 0.5))
            .as_subquery("recent");
        select([field("name", &u["name"]), field("posts", count())])
            .from(&u)
            .inner_join(&recent, eq(&recent["author_id"], &u["id"]))
            .filter(and([
                Some(gte(&u["age"], 18)),
                or([like(&u["name"], "a%"), in_array(&u["age"], [20, 30, 40])]),
            ]))
            .group_by([&u["name"]])
            .having(gt(count(), 1))
            .order_by([desc(count())])
            .limit(10)
            .offset(20)
            .to_sql(d)
    }));

    let (u, p) = (users.clone(), posts.clone());
    out.push(Box::new(move |d: &dyn Dialect| {
        let authors = select([&p["author_id"]])
            .from(&p)
            .filter(between(&p["score"], 1.0, 2.0))
            .as_cte("authors");
        with([&authors])
            .select_all()
            .from(&u)
            .filter(in_subquery(&u["id"], select([&authors["author_id"]]).from(&authors)))
            .limit(placeholder("n"))
            .to_sql(d)
    }));

    let u = users.clone();
    out.push(Box::new(move |d: &dyn Dialect| {
        insert(&u)
            .values([
                Values::new().set("name", "a").set("age", 1),
                Values::new().set("name", "b"),
            ])
            .on_conflict_do_update([&u["name"]], Values::new().set("age", 99))
            .to_sql(d)
    }));

    let u = users.clone();
    out.push(Box::new(move |d: &dyn Dialect| {
        let bumped = Fragment::template("? + ?", [Fragment::column(&u["age"]), Fragment::param(1)]);
        update(&u)
            .set(Values::new().set("name", "x").set("age", bumped))
            .filter(and([eq(&u["id"], 3), is_not_null(&u["age"])]))
            .to_sql(d)
    }));

    let (u, p) = (users.clone(), posts.clone());
    out.push(Box::new(move |d: &dyn Dialect| {
        let authored = select([&u["id"]]).from(&u).filter(eq(&u["id"], &p["author_id"]));
        delete(&p)
            .filter(or([eq(&p["author_id"], 1), exists(authored)]))
            .to_sql(d)
    }));

    out
}

/// `$n` tokens in order of appearance.
fn numbered_placeholders(sql: &str) -> Vec<usize> {
    let bytes = sql.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if let Ok(n) = sql[start..end].parse() {
                out.push(n);
            }
            i = end;
        } else {
            i += 1;
        }
    }
    out
}

#[test]
fn placeholders_match_params_in_every_dialect() {
    let (users, posts) = schema();
    for build in statements(&users, &posts) {
        let pg = build(&PgDialect).unwrap();
        let expected: Vec<usize> = (1..=pg.params().len()).collect();
        assert_eq!(numbered_placeholders(pg.sql()), expected, "{}", pg.sql());

        for dialect in [&MySqlDialect as &dyn Dialect, &SqliteDialect] {
            let q = build(dialect).unwrap();
            assert_eq!(q.sql().matches('?').count(), q.params().len(), "{}", q.sql());
            // parameter order does not depend on the dialect
            assert_eq!(q.params(), pg.params());
        }
    }
}

#[test]
fn compilation_is_deterministic() {
    let (users, posts) = schema();
    for build in statements(&users, &posts) {
        for dialect in [&PgDialect as &dyn Dialect, &MySqlDialect, &SqliteDialect] {
            assert_eq!(build(dialect).unwrap(), build(dialect).unwrap());
        }
    }
}

#[test]
fn values_are_never_inlined() {
    let (users, _) = schema();
    let q = select_all()
        .from(&users)
        .filter(eq(&users["name"], "'; DROP TABLE users; --"))
        .to_sql(&PgDialect)
        .unwrap();
    assert!(!q.sql().contains("DROP"));
    assert_eq!(
        q.values().unwrap(),
        vec![Value::Text("'; DROP TABLE users; --".into())]
    );
}

#[test]
fn identifiers_are_quoted_per_dialect() {
    let odd = Table::builder(r#"odd"name"#)
        .column(integer("select"))
        .column(integer("we`ird"))
        .build()
        .unwrap();
    let q = select_all().from(&odd);
    assert_eq!(
        q.to_sql(&PgDialect).unwrap().sql(),
        r#"SELECT "odd""name"."select", "odd""name"."we`ird" FROM "odd""name""#
    );
    assert_eq!(
        q.to_sql(&MySqlDialect).unwrap().sql(),
        r#"SELECT `odd"name`.`select`, `odd"name`.`we``ird` FROM `odd"name`"#
    );
}

#[test]
fn statement_kind_is_reported() {
    let (users, _) = schema();
    assert_eq!(delete(&users).kind(), StatementKind::Delete);
}
