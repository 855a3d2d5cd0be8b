//! A [`Session`] backed by `tokio-postgres`.
//!
//! [`Value`] converts to and from Postgres wire types by the column's declared
//! type. Types outside the value model (e.g. `numeric`) should be cast in SQL
//! (`x::text`).

mod statement_cache;

use super::Session;
use crate::error::{QueryError, QueryResult};
use crate::row::Row;
use crate::value::Value;
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use statement_cache::StatementCache;
use std::error::Error;
use std::future::Future;
use std::time::Duration;
use tokio_postgres::types::{FromSql, IsNull, ToSql, Type, to_sql_checked};
use tokio_postgres::{Client, NoTls, Statement};

/// Configuration for [`PgSession`].
#[derive(Debug, Clone)]
pub struct PgSessionConfig {
    /// Per-statement timeout. `None` means no timeout (default).
    pub statement_timeout: Option<Duration>,
    /// How many named statements to keep prepared. `0` disables the cache.
    pub statement_cache_capacity: usize,
}

impl Default for PgSessionConfig {
    fn default() -> Self {
        Self {
            statement_timeout: None,
            statement_cache_capacity: 64,
        }
    }
}

impl PgSessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statements exceeding this duration fail with [`QueryError::Timeout`].
    pub fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = Some(timeout);
        self
    }

    pub fn with_statement_cache_capacity(mut self, capacity: usize) -> Self {
        self.statement_cache_capacity = capacity;
        self
    }
}

/// A `tokio_postgres::Client` as a [`Session`].
///
/// Named prepared queries are prepared server-side once and reused from a
/// small LRU; unnamed ones go through the client's unnamed statement.
#[derive(Debug)]
pub struct PgSession {
    client: Client,
    config: PgSessionConfig,
    cache: StatementCache,
}

impl PgSession {
    pub fn new(client: Client) -> Self {
        Self::with_config(client, PgSessionConfig::default())
    }

    pub fn with_config(client: Client, config: PgSessionConfig) -> Self {
        let cache = StatementCache::new(config.statement_cache_capacity);
        Self {
            client,
            config,
            cache,
        }
    }

    /// Connect without TLS and drive the connection on a spawned task.
    pub async fn connect(url: &str, config: PgSessionConfig) -> QueryResult<Self> {
        let (client, connection) = tokio_postgres::connect(url, NoTls).await?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(target: "quarry.sql", error = %e, "postgres connection error");
            }
        });
        Ok(Self::with_config(client, config))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Number of named statements currently prepared.
    pub fn cached_statements(&self) -> usize {
        self.cache.len()
    }

    async fn timed<T, F>(&self, fut: F) -> QueryResult<T>
    where
        F: Future<Output = Result<T, tokio_postgres::Error>>,
    {
        match self.config.statement_timeout {
            Some(limit) => match tokio::time::timeout(limit, fut).await {
                Ok(result) => result.map_err(QueryError::from),
                Err(_) => Err(QueryError::Timeout(limit)),
            },
            None => fut.await.map_err(QueryError::from),
        }
    }

    async fn named_statement(&self, name: &str, sql: &str) -> QueryResult<Statement> {
        if let Some(stmt) = self.cache.get(name, sql) {
            return Ok(stmt);
        }
        let stmt = self.timed(self.client.prepare(sql)).await?;
        self.cache
            .insert(name.to_string(), sql.to_string(), stmt.clone());
        Ok(stmt)
    }
}

fn param_refs(params: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

fn convert_row(row: &tokio_postgres::Row) -> QueryResult<Row> {
    let mut out = Row::new();
    for (i, column) in row.columns().iter().enumerate() {
        let value: Value = row
            .try_get(i)
            .map_err(|e| QueryError::decode(column.name(), e.to_string()))?;
        out.push(column.name(), value);
    }
    Ok(out)
}

impl Session for PgSession {
    async fn query(&self, sql: &str, params: &[Value]) -> QueryResult<Vec<Row>> {
        let refs = param_refs(params);
        let rows = self.timed(self.client.query(sql, &refs)).await?;
        rows.iter().map(convert_row).collect()
    }

    async fn query_tagged(&self, name: &str, sql: &str, params: &[Value]) -> QueryResult<Vec<Row>> {
        if !self.cache.is_enabled() {
            return self.query(sql, params).await;
        }
        let stmt = self.named_statement(name, sql).await?;
        let refs = param_refs(params);
        let rows = self.timed(self.client.query(&stmt, &refs)).await?;
        rows.iter().map(convert_row).collect()
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> QueryResult<u64> {
        let refs = param_refs(params);
        self.timed(self.client.execute(sql, &refs)).await
    }

    async fn execute_tagged(&self, name: &str, sql: &str, params: &[Value]) -> QueryResult<u64> {
        if !self.cache.is_enabled() {
            return self.execute(sql, params).await;
        }
        let stmt = self.named_statement(name, sql).await?;
        let refs = param_refs(params);
        self.timed(self.client.execute(&stmt, &refs)).await
    }
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql(ty, out),
            Value::Int(v) => match *ty {
                Type::INT2 => i16::try_from(*v)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*v)?.to_sql(ty, out),
                Type::OID => u32::try_from(*v)?.to_sql(ty, out),
                Type::FLOAT4 => (*v as f32).to_sql(ty, out),
                Type::FLOAT8 => (*v as f64).to_sql(ty, out),
                _ => v.to_sql(ty, out),
            },
            Value::Float(v) => match *ty {
                Type::FLOAT4 => (*v as f32).to_sql(ty, out),
                _ => v.to_sql(ty, out),
            },
            Value::Text(v) => v.to_sql(ty, out),
            Value::Bytes(v) => v.to_sql(ty, out),
            Value::Json(v) => v.to_sql(ty, out),
            Value::Uuid(v) => v.to_sql(ty, out),
            Value::Date(v) => v.to_sql(ty, out),
            Value::Timestamp(v) => v.to_sql(ty, out),
            Value::TimestampTz(v) => v.to_sql(ty, out),
        }
    }

    // The concrete variant decides; mismatches surface as driver errors.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

impl<'a> FromSql<'a> for Value {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        Ok(match *ty {
            Type::BOOL => Value::Bool(bool::from_sql(ty, raw)?),
            Type::INT2 => Value::Int(i16::from_sql(ty, raw)?.into()),
            Type::INT4 => Value::Int(i32::from_sql(ty, raw)?.into()),
            Type::INT8 => Value::Int(i64::from_sql(ty, raw)?),
            Type::OID => Value::Int(u32::from_sql(ty, raw)?.into()),
            Type::FLOAT4 => Value::Float(f32::from_sql(ty, raw)?.into()),
            Type::FLOAT8 => Value::Float(f64::from_sql(ty, raw)?),
            Type::BYTEA => Value::Bytes(Vec::<u8>::from_sql(ty, raw)?),
            Type::JSON | Type::JSONB => Value::Json(serde_json::Value::from_sql(ty, raw)?),
            Type::UUID => Value::Uuid(uuid::Uuid::from_sql(ty, raw)?),
            Type::DATE => Value::Date(NaiveDate::from_sql(ty, raw)?),
            Type::TIMESTAMP => Value::Timestamp(NaiveDateTime::from_sql(ty, raw)?),
            Type::TIMESTAMPTZ => Value::TimestampTz(DateTime::<Utc>::from_sql(ty, raw)?),
            _ => Value::Text(String::from_sql(ty, raw)?),
        })
    }

    fn from_sql_null(_ty: &Type) -> Result<Self, Box<dyn Error + Sync + Send>> {
        Ok(Value::Null)
    }

    fn accepts(ty: &Type) -> bool {
        matches!(
            *ty,
            Type::BOOL
                | Type::INT2
                | Type::INT4
                | Type::INT8
                | Type::OID
                | Type::FLOAT4
                | Type::FLOAT8
                | Type::BYTEA
                | Type::JSON
                | Type::JSONB
                | Type::UUID
                | Type::DATE
                | Type::TIMESTAMP
                | Type::TIMESTAMPTZ
                | Type::TEXT
                | Type::VARCHAR
                | Type::BPCHAR
                | Type::NAME
                | Type::UNKNOWN
        )
    }
}
