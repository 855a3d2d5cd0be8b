//! Compiles the same statements for every dialect and prints the result.
//!
//! Run with: cargo run --example dialects -p quarry

use quarry::CompiledQuery;
use quarry::prelude::*;

fn show(dialect: &dyn Dialect, label: &str, query: QueryResult<CompiledQuery>) {
    match query {
        Ok(q) => {
            println!("[{}] {label}", dialect.name());
            println!("  {}", q.sql());
            println!("  params: {:?}", q.values().unwrap_or_default());
        }
        Err(e) => println!("[{}] {label}: {e}", dialect.name()),
    }
}

fn main() -> QueryResult<()> {
    let users = Table::builder("users")
        .column(big_serial("id").primary_key())
        .column(varchar("email", 255).not_null())
        .column(boolean("active").not_null())
        .column(timestamptz("created_at").has_default())
        .build()?;

    let dialects: [&dyn Dialect; 3] = [&PgDialect, &MySqlDialect, &SqliteDialect];

    for dialect in dialects {
        println!("{}", dialect.create_table(&users));

        let active = select([&users["id"], &users["email"]])
            .from(&users)
            .filter(and([
                eq(&users["active"], true),
                like(&users["email"], "%@example.com"),
            ]))
            .order_by([desc(&users["created_at"])])
            .offset(20);
        show(dialect, "select", active.to_sql(dialect));

        let upsert = insert(&users)
            .values(Values::new().set("email", "a@example.com").set("active", true))
            .on_conflict_do_update([&users["email"]], Values::new().set_excluded("active"))
            .returning_fields([&users["id"]]);
        show(dialect, "upsert", upsert.to_sql(dialect));

        let purge = delete(&users).filter(eq(&users["active"], false));
        show(dialect, "delete", purge.to_sql(dialect));
        println!();
    }

    Ok(())
}
