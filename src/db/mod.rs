//! Database Module
//!
//! 嵌入式 SurrealDB (RocksDB 引擎) 的打开与 schema 定义。

pub mod models;
pub mod repository;

use std::path::Path;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

use crate::utils::AppError;

const NAMESPACE: &str = "booking";
const DATABASE: &str = "booking";

/// Schema 定义 — 启动时幂等执行
///
/// `idx_customer_email` 保证邮箱桥接键唯一；
/// `idx_link_pair` 保证 (reservation, customer) 链接唯一；
/// `idx_reservation_window` 支撑按桌号 + 时间范围的重叠扫描。
const SCHEMA_SQL: &str = r#"
DEFINE TABLE IF NOT EXISTS customer SCHEMALESS;
DEFINE INDEX IF NOT EXISTS idx_customer_email ON customer FIELDS email UNIQUE;

DEFINE TABLE IF NOT EXISTS reservation SCHEMALESS;
DEFINE INDEX IF NOT EXISTS idx_reservation_window ON reservation FIELDS table_number, reserved_at_ms;

DEFINE TABLE IF NOT EXISTS reservation_customer SCHEMALESS;
DEFINE INDEX IF NOT EXISTS idx_link_pair ON reservation_customer FIELDS reservation, customer UNIQUE;
DEFINE INDEX IF NOT EXISTS idx_link_customer ON reservation_customer FIELDS customer;
"#;

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the database at `db_path` and apply schema
    pub async fn new(db_path: &Path) -> Result<Self, AppError> {
        let db: Surreal<Db> = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        db.query(SCHEMA_SQL)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply schema: {e}")))?
            .check()
            .map_err(|e| AppError::database(format!("Schema definition failed: {e}")))?;

        tracing::info!("Database ready (SurrealDB/RocksDB at {})", db_path.display());

        Ok(Self { db })
    }
}
