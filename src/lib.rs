//! Booking Server - 餐厅预订后端
//!
//! # 架构概述
//!
//! 本模块是预订服务的主入口，提供以下核心功能：
//!
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储 (customer / reservation / 归属链接)
//! - **认证** (`auth`): JWT + Argon2 认证体系
//! - **预订引擎** (`reservations`): 时段生成、桌台可用性、预订与取消
//! - **通知** (`services`): 邮件确认/取消通知 (best-effort)
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! src/
//! ├── core/          # 配置、状态、服务器装配
//! ├── auth/          # JWT 认证
//! ├── db/            # 数据库层 (模型 + 仓储)
//! ├── reservations/  # 领域引擎 (时钟、时段、可用性、预订、取消)
//! ├── services/      # 邮件通知
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 错误、日志、时间解析
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod reservations;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState, build_router};
pub use db::models::{Customer, Reservation, ReservationStatus};
pub use reservations::{Clock, FixedClock, SystemClock};
pub use services::{Mailer, Notifier};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境 (dotenv + 日志)
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ____              __   _
   / __ )____  ____  / /__(_)___  ____ _
  / __  / __ \/ __ \/ //_/ / __ \/ __ `/
 / /_/ / /_/ / /_/ / ,< / / / / / /_/ /
/_____/\____/\____/_/|_/_/_/ /_/\__, /
                               /____/
    "#
    );
}
