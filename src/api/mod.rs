//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 注册、登录、当前用户
//! - [`reservations`] - 时段、可用性、预订、取消

pub mod auth;
pub mod health;
pub mod reservations;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};
