//! 时钟抽象
//!
//! 引擎不直接读取环境时间：当日时段过滤和过期校验
//! 都依赖注入的 [`Clock`]，保证可确定性测试。

use chrono::{DateTime, Local, NaiveDateTime, Utc};

use crate::utils::time::local_to_utc;

/// Wall-clock capability injected into the engines
pub trait Clock: Send + Sync {
    /// Current instant, UTC
    fn now(&self) -> DateTime<Utc>;

    /// Current wall-clock time in the business (server-local) timezone
    fn now_local(&self) -> NaiveDateTime {
        self.now().with_timezone(&Local).naive_local()
    }
}

/// Production clock backed by the system time
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed clock for tests
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Fix the clock at a business-timezone wall-clock time
    pub fn at_local(naive: NaiveDateTime) -> Self {
        Self {
            now: local_to_utc(naive),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}
