//! 服务模块 - 外部协作方
//!
//! 目前只有邮件通知中继。

pub mod mailer;

pub use mailer::{Mailer, Notifier};
