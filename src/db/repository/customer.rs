//! Customer Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Customer, CustomerCreate};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "customer";

#[derive(Clone)]
pub struct CustomerRepository {
    base: BaseRepository,
}

impl CustomerRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find customer by id ("customer:xyz")
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Customer>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid customer ID: {}", id)))?;
        let customer: Option<Customer> = self.base.db().select(thing).await?;
        Ok(customer)
    }

    /// Find customer by email (认证主体 ↔ 顾客 桥接键)
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<Customer>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM customer WHERE email = $email LIMIT 1")
            .bind(("email", email.to_string()))
            .await?;
        let customers: Vec<Customer> = result.take(0)?;
        Ok(customers.into_iter().next())
    }

    /// Create a new customer account
    ///
    /// Duplicate email → [`RepoError::Conflict`] (email 有唯一索引兜底)。
    pub async fn create(&self, data: CustomerCreate, now_ms: i64) -> RepoResult<Customer> {
        if self.find_by_email(&data.email).await?.is_some() {
            return Err(RepoError::Conflict(format!(
                "Email {} is already registered",
                data.email
            )));
        }

        let customer = Customer {
            id: None,
            first_name: data.first_name,
            last_name: data.last_name,
            contact: data.contact,
            email: data.email,
            loyalty_points: 0,
            role: data.role,
            hash_pass: data.hash_pass,
            is_active: true,
            created_at_ms: now_ms,
        };

        let created: Option<Customer> = self
            .base
            .db()
            .create(TABLE)
            .content(customer)
            .await
            .map_err(|e| {
                let msg = e.to_string();
                // 唯一索引冲突：并发注册同一邮箱时可能绕过上面的预检查
                if msg.contains("idx_customer_email") {
                    RepoError::Conflict("Email is already registered".to_string())
                } else {
                    RepoError::Database(msg)
                }
            })?;
        created.ok_or_else(|| RepoError::Database("Failed to create customer".to_string()))
    }
}
