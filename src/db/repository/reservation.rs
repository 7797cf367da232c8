//! Reservation Repository
//!
//! 重叠检测与预订创建在同一个 SurrealDB 事务内完成 (first-committer-wins)，
//! 归属链接与预订原子写入 — 不存在无主预订。

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Reservation, ReservationCreate, ReservationCustomer};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "reservation";

/// THROW marker used inside the booking transaction
const CONFLICT_MARKER: &str = "table_unavailable";

/// 事务：重叠复查 → 创建预订 → 创建归属链接
///
/// 任一步失败整体回滚；重叠时 THROW 中止。
const CREATE_CONFIRMED_SQL: &str = r#"
BEGIN TRANSACTION;
LET $conflicts = (
    SELECT VALUE id FROM reservation
    WHERE table_number = $table_number
      AND status IN ['Pending', 'Confirmed']
      AND reserved_at_ms >= $window_start
      AND reserved_at_ms <= $window_end
);
IF array::len($conflicts) > 0 { THROW 'table_unavailable' };
CREATE $reservation_id SET
    reserved_at_ms = $reserved_at_ms,
    num_people = $num_people,
    table_number = $table_number,
    status = 'Confirmed',
    created_at_ms = $created_at_ms;
CREATE reservation_customer SET
    reservation = $reservation_id,
    customer = $customer;
COMMIT TRANSACTION;
"#;

#[derive(Clone)]
pub struct ReservationRepository {
    base: BaseRepository,
}

impl ReservationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find reservation by id ("reservation:xyz")
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Reservation>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid reservation ID: {}", id)))?;
        let reservation: Option<Reservation> = self.base.db().select(thing).await?;
        Ok(reservation)
    }

    /// 查询时间窗内活跃预订占用的桌号 (去重、升序)
    ///
    /// 窗口两端均为闭区间，与预订时的重叠复查使用同一语义。
    pub async fn find_occupied_tables(
        &self,
        window_start_ms: i64,
        window_end_ms: i64,
    ) -> RepoResult<Vec<i32>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT VALUE table_number FROM reservation \
                 WHERE status IN ['Pending', 'Confirmed'] \
                   AND reserved_at_ms >= $start AND reserved_at_ms <= $end",
            )
            .bind(("start", window_start_ms))
            .bind(("end", window_end_ms))
            .await?;
        let mut tables: Vec<i32> = result.take(0)?;
        tables.sort_unstable();
        tables.dedup();
        Ok(tables)
    }

    /// 原子创建已确认预订 + 归属链接
    ///
    /// 在一个事务内复查 `[window_start, window_end]` 的重叠；
    /// 有冲突返回 [`RepoError::Conflict`]，两条记录要么都写入要么都不写。
    pub async fn create_confirmed(
        &self,
        data: ReservationCreate,
        window_start_ms: i64,
        window_end_ms: i64,
    ) -> RepoResult<Reservation> {
        // 预生成 ID，事务内两条语句共享，提交后按它回读
        let key = uuid::Uuid::new_v4().simple().to_string();
        let reservation_id = RecordId::from_table_key(TABLE, key);

        let response = self
            .base
            .db()
            .query(CREATE_CONFIRMED_SQL)
            .bind(("table_number", data.table_number))
            .bind(("window_start", window_start_ms))
            .bind(("window_end", window_end_ms))
            .bind(("reservation_id", reservation_id.clone()))
            .bind(("reserved_at_ms", data.reserved_at_ms))
            .bind(("num_people", data.num_people))
            .bind(("created_at_ms", data.created_at_ms))
            .bind(("customer", data.customer))
            .await?;

        if let Err(e) = response.check() {
            let msg = e.to_string();
            if msg.contains(CONFLICT_MARKER) {
                return Err(RepoError::Conflict(
                    "This table is not available at the selected time. \
                     Please choose another time or table."
                        .to_string(),
                ));
            }
            return Err(RepoError::Database(msg));
        }

        let created: Option<Reservation> = self.base.db().select(reservation_id).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create reservation".to_string()))
    }

    /// 查询预订的归属链接
    pub async fn find_owner_link(
        &self,
        reservation: &RecordId,
    ) -> RepoResult<Option<ReservationCustomer>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM reservation_customer WHERE reservation = $reservation LIMIT 1")
            .bind(("reservation", reservation.clone()))
            .await?;
        let links: Vec<ReservationCustomer> = result.take(0)?;
        Ok(links.into_iter().next())
    }

    /// 取消预订 (单向状态流转，调用方负责归属/重复取消检查)
    pub async fn set_cancelled(&self, id: &RecordId) -> RepoResult<Reservation> {
        self.base
            .db()
            .query("UPDATE $thing SET status = 'Cancelled'")
            .bind(("thing", id.clone()))
            .await?;

        let updated: Option<Reservation> = self.base.db().select(id.clone()).await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Reservation {} not found", id)))
    }

    /// 某顾客的全部预订，按预订时间倒序 (最近优先)
    pub async fn find_by_customer(&self, customer: &RecordId) -> RepoResult<Vec<Reservation>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM reservation WHERE id IN (\
                   SELECT VALUE reservation FROM reservation_customer WHERE customer = $customer\
                 ) ORDER BY reserved_at_ms DESC",
            )
            .bind(("customer", customer.clone()))
            .await?;
        let reservations: Vec<Reservation> = result.take(0)?;
        Ok(reservations)
    }

    /// 全部预订，按预订时间倒序 (员工视图)
    pub async fn find_all(&self) -> RepoResult<Vec<Reservation>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM reservation ORDER BY reserved_at_ms DESC")
            .await?;
        let reservations: Vec<Reservation> = result.take(0)?;
        Ok(reservations)
    }

    /// 活跃预订是否占用指定桌台的时间窗 (只读预检查；事务内仍会复查)
    pub async fn has_active_overlap(
        &self,
        table_number: i32,
        window_start_ms: i64,
        window_end_ms: i64,
    ) -> RepoResult<bool> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT VALUE id FROM reservation \
                 WHERE table_number = $table_number \
                   AND status IN ['Pending', 'Confirmed'] \
                   AND reserved_at_ms >= $start AND reserved_at_ms <= $end \
                 LIMIT 1",
            )
            .bind(("table_number", table_number))
            .bind(("start", window_start_ms))
            .bind(("end", window_end_ms))
            .await?;
        let ids: Vec<RecordId> = result.take(0)?;
        Ok(!ids.is_empty())
    }
}
