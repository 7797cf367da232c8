//! Reservation API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Reservation, ReservationStatus};
use crate::db::repository::{CustomerRepository, ReservationRepository};
use crate::reservations::{
    AvailabilityEngine, BookingEngine, BookingRequest, CLOSING_TIME, CancellationEngine,
    OPENING_TIME, TOTAL_TABLES, time_slots as compute_time_slots,
};
use crate::utils::time::{local_to_utc, millis_to_utc, parse_date, parse_time};
use crate::utils::{AppError, AppResult};

// ========== Response DTOs ==========

/// 预订的对外表示
#[derive(Debug, Serialize)]
pub struct ReservationDto {
    pub id: String,
    /// RFC 3339, UTC
    pub reservation_datetime: String,
    pub num_people: i32,
    pub table_number: i32,
    pub status: ReservationStatus,
    /// 由状态派生的确认标志 (外部契约保留字段)
    pub confirmed: bool,
}

impl From<Reservation> for ReservationDto {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            reservation_datetime: millis_to_utc(r.reserved_at_ms).to_rfc3339(),
            num_people: r.num_people,
            table_number: r.table_number,
            confirmed: r.confirmed(),
            status: r.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RestaurantHours {
    pub open: &'static str,
    pub close: &'static str,
}

// ========== Time slots ==========

#[derive(Debug, Deserialize)]
pub struct TimeSlotsQuery {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TimeSlotsResponse {
    pub date: String,
    pub time_slots: Vec<String>,
    pub restaurant_hours: RestaurantHours,
}

/// GET /api/reservations/time-slots?date=YYYY-MM-DD - 某日可预订时段
pub async fn time_slots(
    State(state): State<ServerState>,
    Query(query): Query<TimeSlotsQuery>,
) -> AppResult<Json<TimeSlotsResponse>> {
    let date_str = query
        .date
        .ok_or_else(|| AppError::validation("Date is required"))?;
    let date = parse_date(&date_str)?;

    let slots = compute_time_slots(date, state.clock.now_local())?;

    Ok(Json(TimeSlotsResponse {
        date: date_str,
        time_slots: slots,
        restaurant_hours: RestaurantHours {
            open: OPENING_TIME,
            close: CLOSING_TIME,
        },
    }))
}

// ========== Available tables ==========

#[derive(Debug, Deserialize)]
pub struct AvailableTablesQuery {
    pub date: Option<String>,
    pub time: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AvailableTablesResponse {
    pub date: String,
    pub time: String,
    pub available_tables: Vec<i32>,
    pub occupied_tables: Vec<i32>,
    pub total_tables: i32,
    pub available_count: usize,
}

/// GET /api/reservations/available-tables?date=…&time=HH:MM - 桌台可用性
pub async fn available_tables(
    State(state): State<ServerState>,
    Query(query): Query<AvailableTablesQuery>,
) -> AppResult<Json<AvailableTablesResponse>> {
    let (Some(date_str), Some(time_str)) = (query.date, query.time) else {
        return Err(AppError::validation("Date and time are required"));
    };

    let date = parse_date(&date_str)?;
    let time = parse_time(&time_str)?;
    let instant = local_to_utc(date.and_time(time));

    let engine = AvailabilityEngine::new(state.db.clone());
    let occupied = engine.occupied_tables(instant).await?;
    let available = engine.available_tables(instant).await?;

    Ok(Json(AvailableTablesResponse {
        date: date_str,
        time: time_str,
        available_count: available.len(),
        available_tables: available,
        occupied_tables: occupied,
        total_tables: TOTAL_TABLES,
    }))
}

// ========== Create ==========

#[derive(Debug, Serialize)]
pub struct CreateReservationResponse {
    pub message: String,
    pub reservation: ReservationDto,
    pub email_sent: bool,
}

/// POST /api/reservations/create - 创建预订 (认证)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<BookingRequest>,
) -> AppResult<(StatusCode, Json<CreateReservationResponse>)> {
    let engine = BookingEngine::new(state.db.clone(), state.clock.clone(), state.notifier.clone());
    let (reservation, email_sent) = engine.create(req, &user).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateReservationResponse {
            message: "Reservation created successfully!".to_string(),
            reservation: reservation.into(),
            email_sent,
        }),
    ))
}

// ========== My reservations ==========

#[derive(Debug, Serialize)]
pub struct ReservationListResponse {
    pub count: usize,
    pub reservations: Vec<ReservationDto>,
}

/// GET /api/reservations/my - 当前顾客的全部预订，最近优先 (认证)
pub async fn my_reservations(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ReservationListResponse>> {
    let customers = CustomerRepository::new(state.db.clone());
    let customer = customers
        .find_by_email(&user.email)
        .await?
        .ok_or_else(|| AppError::not_found("Customer profile not found"))?;
    let customer_rid = customer
        .id
        .ok_or_else(|| AppError::internal("Customer record has no id"))?;

    let repo = ReservationRepository::new(state.db.clone());
    let reservations = repo.find_by_customer(&customer_rid).await?;

    Ok(Json(ReservationListResponse {
        count: reservations.len(),
        reservations: reservations.into_iter().map(Into::into).collect(),
    }))
}

// ========== Cancel ==========

#[derive(Debug, Serialize)]
pub struct CancelReservationResponse {
    pub message: String,
    pub reservation: ReservationDto,
    pub email_sent: bool,
}

/// POST /api/reservations/{id}/cancel - 取消自己的预订 (认证)
pub async fn cancel(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<CancelReservationResponse>> {
    // 兼容裸 key 和 "reservation:key" 两种形式
    let reservation_id = if id.contains(':') {
        id
    } else {
        format!("reservation:{id}")
    };

    let engine = CancellationEngine::new(state.db.clone(), state.notifier.clone());
    let (reservation, email_sent) = engine.cancel(&reservation_id, &user.email).await?;

    Ok(Json(CancelReservationResponse {
        message: "Reservation cancelled successfully".to_string(),
        reservation: reservation.into(),
        email_sent,
    }))
}

// ========== Staff listing ==========

/// GET /api/reservations - 全部预订，最近优先 (员工)
pub async fn list_all(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ReservationListResponse>> {
    if !user.is_staff() {
        return Err(AppError::forbidden("Staff role required"));
    }

    let repo = ReservationRepository::new(state.db.clone());
    let reservations = repo.find_all().await?;

    Ok(Json(ReservationListResponse {
        count: reservations.len(),
        reservations: reservations.into_iter().map(Into::into).collect(),
    }))
}
