#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use constructora_api::{app, connect_lazy, resolve, AppState, Config};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use tower::ServiceExt;

pub fn config_from(pairs: &[(&str, &str)]) -> Config {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|k| map.get(k).cloned()).expect("test config")
}

pub fn router_for(config: &Config) -> Router {
    let pool = connect_lazy(&config.database).expect("pool");
    let state = AppState::new(pool, resolve(&config.database));
    app(state, &config.server)
}

/// Router whose database is unreachable; anything that touches the pool fails fast.
pub fn offline_app() -> Router {
    router_for(&config_from(&[
        ("DB_SERVER", "127.0.0.1"),
        ("DB_PORT", "1"),
        ("DB_ACQUIRE_TIMEOUT_SECS", "1"),
    ]))
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    send_request(app, request).await
}

pub async fn send_request(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}

/// A fresh schema with the fixture tables, plus a router bound to it.
pub struct TestDb {
    pub pool: PgPool,
    pub schema: String,
    pub app: Router,
}

static SCHEMA_SEQ: AtomicU32 = AtomicU32::new(0);

impl TestDb {
    pub async fn setup() -> TestDb {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .connect(&url)
            .await
            .expect("connect");

        let schema = format!(
            "constructora_it_{}_{}",
            std::process::id(),
            SCHEMA_SEQ.fetch_add(1, Ordering::SeqCst)
        );
        sqlx::query(&format!("CREATE SCHEMA {}", schema))
            .execute(&pool)
            .await
            .expect("create schema");
        let ddl = include_str!("../fixtures/schema.sql").replace("{schema}", &schema);
        for stmt in ddl.split(';') {
            let body: String = stmt
                .lines()
                .filter(|l| !l.trim_start().starts_with("--"))
                .collect::<Vec<_>>()
                .join("\n");
            if body.trim().is_empty() {
                continue;
            }
            sqlx::query(&body).execute(&pool).await.expect("fixture ddl");
        }

        let config = config_from(&[("DATABASE_URL", url.as_str()), ("DB_SCHEMA", schema.as_str())]);
        let app = router_for(&config);
        TestDb { pool, schema, app }
    }

    pub async fn teardown(self) {
        sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .execute(&self.pool)
            .await
            .expect("drop schema");
        self.pool.close().await;
    }
}
