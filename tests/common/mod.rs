#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::test;
use school_fees::config::Config;
use school_fees::db::init_db;
use serde_json::Value;
use sqlx::SqlitePool;

/// Build a test `Config`: no rate limiting, no prefix, throwaway log dir.
pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        db_max_connections: 1,
        server_addr: "127.0.0.1:0".to_string(),
        api_prefix: String::new(),
        cors_allow_origin: "*".to_string(),
        rate_per_min: 0,
        log_dir: "logs".to_string(),
        seed_fees_on_startup: false,
    }
}

/// Fresh in-memory store with the schema in place.
pub async fn test_pool() -> SqlitePool {
    init_db("sqlite::memory:", 1).await.unwrap()
}

/// Spin up the full route table over `pool`.
macro_rules! test_app {
    ($pool:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($pool.clone()))
                .configure(|cfg| school_fees::routes::configure(cfg, common::test_config())),
        )
        .await
    };
}

pub async fn body_json<B: MessageBody>(resp: ServiceResponse<B>) -> Value {
    test::read_body_json(resp).await
}
