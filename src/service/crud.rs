//! CRUD execution against PostgreSQL.
//!
//! Each call checks out its own connection from the pool: reads hold a `PoolConnection`,
//! writes hold a `Transaction`. Both return the connection on drop, and an uncommitted
//! transaction is rolled back, so every exit path releases the connection.

use crate::config::ResolvedEntity;
use crate::error::AppError;
use crate::sql::{clear_reference, delete, insert, select_by_id, select_list, update, FilterValue, PgBindValue, QueryBuf};
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool};

pub struct CrudService;

impl CrudService {
    /// List rows newest first, optionally filtered.
    pub async fn list(
        pool: &PgPool,
        entity: &ResolvedEntity,
        filter: Option<&FilterValue>,
    ) -> Result<Vec<Value>, AppError> {
        let q = select_list(entity, filter);
        let mut conn = pool.acquire().await?;
        Self::query_many(&mut conn, &q).await
    }

    /// Fetch one row by primary key.
    pub async fn read(pool: &PgPool, entity: &ResolvedEntity, id: i64) -> Result<Option<Value>, AppError> {
        let q = select_by_id(entity, id);
        let mut conn = pool.acquire().await?;
        Self::query_optional(&mut conn, &q).await
    }

    /// Insert one row and return it with the assigned primary key.
    pub async fn create(
        pool: &PgPool,
        entity: &ResolvedEntity,
        record: &Map<String, Value>,
    ) -> Result<Value, AppError> {
        let q = insert(entity, record);
        let mut tx = pool.begin().await?;
        let row = Self::query_one(&mut tx, &q).await?;
        tx.commit().await?;
        tracing::info!(entity = %entity.path_segment, "row created");
        Ok(row)
    }

    /// Replace one row by id. Returns None when no row has that id.
    pub async fn update(
        pool: &PgPool,
        entity: &ResolvedEntity,
        id: i64,
        record: &Map<String, Value>,
    ) -> Result<Option<Value>, AppError> {
        let q = update(entity, id, record);
        let mut tx = pool.begin().await?;
        let Some(row) = Self::query_optional(&mut tx, &q).await? else {
            return Ok(None);
        };
        tx.commit().await?;
        tracing::info!(entity = %entity.path_segment, id, "row updated");
        Ok(Some(row))
    }

    /// Delete one row by id after clearing dependent references, in one transaction.
    /// Returns false (and rolls back) when no row has that id.
    pub async fn delete(pool: &PgPool, entity: &ResolvedEntity, id: i64) -> Result<bool, AppError> {
        let mut tx = pool.begin().await?;
        for dep in &entity.dependents {
            let q = clear_reference(dep, id);
            let cleared = Self::execute(&mut tx, &q).await?;
            if cleared > 0 {
                tracing::debug!(table = %dep.table_name, column = %dep.column, cleared, "dependent references cleared");
            }
        }
        let q = delete(entity, id);
        if Self::query_optional(&mut tx, &q).await?.is_none() {
            return Ok(false);
        }
        tx.commit().await?;
        tracing::info!(entity = %entity.path_segment, id, "row deleted");
        Ok(true)
    }

    /// Round-trip `SELECT 1` on a freshly checked-out connection.
    pub async fn ping(pool: &PgPool) -> Result<(), AppError> {
        let mut conn = pool.acquire().await?;
        sqlx::query("SELECT 1").execute(&mut *conn).await?;
        Ok(())
    }

    fn bind_all(q: &QueryBuf) -> Result<Vec<PgBindValue>, AppError> {
        q.params.iter().map(PgBindValue::from_json).collect()
    }

    async fn query_many(conn: &mut PgConnection, q: &QueryBuf) -> Result<Vec<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in Self::bind_all(q)? {
            query = query.bind(p);
        }
        let rows = query.fetch_all(&mut *conn).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn query_one(conn: &mut PgConnection, q: &QueryBuf) -> Result<Value, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in Self::bind_all(q)? {
            query = query.bind(p);
        }
        let row = query.fetch_one(&mut *conn).await?;
        Ok(row_to_json(&row))
    }

    async fn query_optional(conn: &mut PgConnection, q: &QueryBuf) -> Result<Option<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in Self::bind_all(q)? {
            query = query.bind(p);
        }
        let row = query.fetch_optional(&mut *conn).await?;
        Ok(row.map(|r| row_to_json(&r)))
    }

    async fn execute(conn: &mut PgConnection, q: &QueryBuf) -> Result<u64, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
        let mut query = sqlx::query(&q.sql);
        for p in Self::bind_all(q)? {
            query = query.bind(p);
        }
        let done = query.execute(&mut *conn).await?;
        Ok(done.rows_affected())
    }
}

/// Row to JSON object, keys in SELECT order.
fn row_to_json(row: &PgRow) -> Value {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

fn cell_to_value(row: &PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(v) = row.try_get::<Option<i32>, _>(name) {
        return v.map(|n| Value::Number(n.into())).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(name) {
        return v.map(|n| Value::Number(n.into())).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(name) {
        return v
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDate>, _>(name) {
        return v
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDateTime>, _>(name) {
        return v
            .map(|d| Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(name) {
        return v.map(Value::String).unwrap_or(Value::Null);
    }
    Value::Null
}
