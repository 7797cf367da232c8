use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::reservations::{Clock, SystemClock};
use crate::services::{Mailer, Notifier};

/// 服务器状态 - 持有所有服务的共享引用
///
/// ServerState 是服务的核心数据结构。使用 Arc 实现浅拷贝，
/// 克隆成本极低，axum 每个请求都会克隆一份。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | clock | Arc<dyn Clock> | 注入式时钟 |
/// | notifier | Arc<dyn Notifier> | 邮件通知 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// JWT 认证服务
    pub jwt_service: Arc<JwtService>,
    /// 时钟抽象 (测试时注入固定时钟)
    pub clock: Arc<dyn Clock>,
    /// 通知协作方
    pub notifier: Arc<dyn Notifier>,
}

impl ServerState {
    /// 手动构造 (测试用；生产走 [`ServerState::initialize`])
    pub fn new(
        config: Config,
        db: Surreal<Db>,
        jwt_service: Arc<JwtService>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            db,
            jwt_service,
            clock,
            notifier,
        }
    }

    /// 初始化完整的服务器状态
    pub async fn initialize(config: &Config) -> Self {
        // 0. 确保工作目录存在
        let db_dir = config.database_dir();
        std::fs::create_dir_all(&db_dir).expect("Failed to create database directory");

        // 1. 打开数据库并应用 schema
        let db_path = db_dir.join("booking.db");
        let db_service = DbService::new(&db_path)
            .await
            .expect("Failed to initialize database");

        // 2. 初始化服务
        let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let notifier: Arc<dyn Notifier> = Arc::new(Mailer::new(
            config.mail_api_url.clone(),
            config.mail_from.clone(),
            config.restaurant_name.clone(),
        ));

        Self::new(config.clone(), db_service.db, jwt_service, clock, notifier)
    }
}
