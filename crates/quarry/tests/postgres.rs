#![cfg(feature = "postgres")]

use quarry::prelude::*;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

fn database_url(test: &str) -> Option<String> {
    dotenvy::dotenv().ok();
    match std::env::var("DATABASE_URL") {
        Ok(v) => Some(v),
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping {test}");
            None
        }
    }
}

fn unique_table(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{prefix}_{}_{nanos}", std::process::id())
}

#[tokio::test]
async fn postgres_roundtrip() -> QueryResult<()> {
    let Some(url) = database_url("postgres_roundtrip") else {
        return Ok(());
    };

    let session = PgSession::connect(
        &url,
        PgSessionConfig::new().with_statement_timeout(Duration::from_secs(10)),
    )
    .await?;
    let db = Db::new(session, PgDialect);

    let accounts = Table::builder(unique_table("quarry_accounts"))
        .column(big_serial("id").primary_key())
        .column(text("name").not_null())
        .column(boolean("active").not_null())
        .column(json("meta"))
        .column(double("balance"))
        .build()?;
    db.session()
        .execute(&PgDialect.create_table(&accounts), &[])
        .await?;

    let inserted = insert(&accounts)
        .values([
            Values::new()
                .set("name", "alice")
                .set("active", true)
                .set("meta", serde_json::json!({"tier": "gold"})),
            Values::new()
                .set("name", "bob")
                .set("active", false)
                .set("balance", 12.5),
        ])
        .returning()
        .all(&db)
        .await?;
    assert_eq!(inserted.len(), 2);
    let alice_id: i64 = inserted[0].try_get("id")?;
    assert_eq!(
        inserted[0].get("meta"),
        Some(&Value::Json(serde_json::json!({"tier": "gold"})))
    );

    let by_name = select([&accounts["id"], &accounts["active"]])
        .from(&accounts)
        .filter(eq(&accounts["name"], placeholder("name")))
        .prepare(&db, "account_by_name")?;
    let alice = by_name
        .get(&Bindings::new().set("name", "alice"))
        .await?
        .ok_or_else(|| QueryError::not_found("alice"))?;
    assert_eq!(alice.try_get::<i64>("id")?, alice_id);
    assert!(alice.try_get::<bool>("active")?);
    let bob = by_name.get(&Bindings::new().set("name", "bob")).await?;
    assert!(bob.is_some());
    assert_eq!(db.session().cached_statements(), 1);

    let updated = update(&accounts)
        .set(Values::new().set("active", true))
        .filter(eq(&accounts["name"], "bob"))
        .returning_fields([&accounts["balance"]])
        .all(&db)
        .await?;
    assert_eq!(updated[0].try_get::<f64>("balance")?, 12.5);

    let active = select([field("n", count())])
        .from(&accounts)
        .filter(eq(&accounts["active"], true))
        .get(&db)
        .await?
        .ok_or_else(|| QueryError::not_found("count"))?;
    assert_eq!(active.try_get::<i64>("n")?, 2);

    let removed = delete(&accounts)
        .filter(eq(&accounts["id"], alice_id))
        .run(&db)
        .await?;
    assert_eq!(removed, 1);

    db.session()
        .execute(&format!("DROP TABLE {}", PgDialect.quote_identifier(accounts.name())), &[])
        .await?;
    Ok(())
}

#[tokio::test]
async fn postgres_statement_timeout() -> QueryResult<()> {
    let Some(url) = database_url("postgres_statement_timeout") else {
        return Ok(());
    };

    let session = PgSession::connect(
        &url,
        PgSessionConfig::new().with_statement_timeout(Duration::from_millis(50)),
    )
    .await?;
    let err = session
        .query("SELECT 1 FROM pg_sleep(1)", &[])
        .await
        .unwrap_err();
    assert!(err.is_timeout());
    Ok(())
}
