//! Reservation API 模块
//!
//! 公开接口：时段列表、桌台可用性。
//! 认证接口：创建、我的预订、取消、全部预订 (员工)。

mod handler;

use axum::{Router, routing::get, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reservations", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // 公开查询
        .route("/time-slots", get(handler::time_slots))
        .route("/available-tables", get(handler::available_tables))
        // 认证接口 (CurrentUser extractor 强制校验令牌)
        .route("/create", post(handler::create))
        .route("/my", get(handler::my_reservations))
        .route("/{id}/cancel", post(handler::cancel))
        .route("/", get(handler::list_all))
}
