use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use quarry::prelude::*;
use quarry::qb::SelectQuery;
use quarry::qb::state::Filtered;

fn wide_table(n: usize) -> Table {
    (0..n)
        .fold(Table::builder("t"), |b, i| b.column(integer(format!("col{i}"))))
        .build()
        .expect("valid table")
}

/// SELECT col0, col1, ... FROM t WHERE (col0 = $1 AND col1 = $2 ...)
fn build_select(table: &Table) -> SelectQuery<Filtered> {
    let conditions: Vec<_> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(i, c)| eq(c, i as i64))
        .collect();
    select_all().from(table).filter(and(conditions))
}

fn bench_compile_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/select");

    for n in [1, 5, 10, 50, 100] {
        let table = wide_table(n);
        let query = build_select(&table);
        group.bench_with_input(BenchmarkId::new("postgres", n), &query, |b, q| {
            b.iter(|| black_box(q.to_sql(&PgDialect)));
        });
        group.bench_with_input(BenchmarkId::new("mysql", n), &query, |b, q| {
            b.iter(|| black_box(q.to_sql(&MySqlDialect)));
        });
    }

    group.finish();
}

fn bench_build_and_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/build_and_compile");

    for n in [1, 10, 100] {
        let table = wide_table(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &table, |b, table| {
            b.iter(|| black_box(build_select(table).to_sql(&PgDialect)));
        });
    }

    group.finish();
}

fn bench_nested_subqueries(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/nested_subqueries");
    let table = wide_table(2);

    for depth in [1, 4, 16] {
        let mut query = select([&table["col0"]])
            .from(&table)
            .filter(eq(&table["col1"], 0));
        for _ in 1..depth {
            query = select([&table["col0"]])
                .from(&table)
                .filter(in_subquery(&table["col0"], query));
        }
        group.bench_with_input(BenchmarkId::from_parameter(depth), &query, |b, q| {
            b.iter(|| black_box(q.to_sql(&SqliteDialect)));
        });
    }

    group.finish();
}

fn bench_multi_row_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/multi_row_insert");
    let table = wide_table(4);

    for rows in [10, 100, 1000] {
        let values: Vec<Values> = (0..rows)
            .map(|i| Values::new().set("col0", i).set("col2", i * 2))
            .collect();
        let query = insert(&table).values(values);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &query, |b, q| {
            b.iter(|| black_box(q.to_sql(&PgDialect)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_compile_select,
    bench_build_and_compile,
    bench_nested_subqueries,
    bench_multi_row_insert
);
criterion_main!(benches);
