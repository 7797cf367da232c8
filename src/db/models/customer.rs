//! Customer Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// 账户角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerRole {
    /// 普通顾客
    Customer,
    /// 店内员工 (可查看全部预订)
    Staff,
}

impl Default for CustomerRole {
    fn default() -> Self {
        Self::Customer
    }
}

/// Customer entity (顾客)
///
/// 注册流程创建；预订核心只读 (email 作为认证主体的桥接键)。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub first_name: String,
    pub last_name: String,
    pub contact: String,
    pub email: String,
    #[serde(default)]
    pub loyalty_points: i32,
    #[serde(default)]
    pub role: CustomerRole,
    /// Argon2 password hash - API responses use DTOs, never this struct
    pub hash_pass: String,
    #[serde(default)]
    pub is_active: bool,
    pub created_at_ms: i64,
}

impl Customer {
    /// Verify a password against the stored argon2 hash
    pub fn verify_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHash, PasswordVerifier},
        };

        let parsed_hash = PasswordHash::new(&self.hash_pass)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash password using argon2
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Create customer payload (repository 层)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerCreate {
    pub first_name: String,
    pub last_name: String,
    pub contact: String,
    pub email: String,
    pub hash_pass: String,
    #[serde(default)]
    pub role: CustomerRole,
}
