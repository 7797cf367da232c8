//! 认证模块 - JWT 认证与当前用户
//!
//! - [`JwtService`] - 令牌签发与验证
//! - [`CurrentUser`] - 已认证主体，经 extractor 从请求中提取

mod extractor;
pub mod jwt;

pub use jwt::{Claims, JwtConfig, JwtError, JwtService};

/// 已认证的当前用户 (从 JWT Claims 提取)
///
/// 同时携带顾客 RecordId 和邮箱：ID 用于直接引用，
/// 邮箱用于与领域顾客记录的桥接校验。
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// 顾客 ID ("customer:xyz")
    pub id: String,
    /// 邮箱
    pub email: String,
    /// 显示名称
    pub name: String,
    /// 角色 (customer | staff)
    pub role: String,
}

impl CurrentUser {
    /// 员工角色可查看全部预订
    pub fn is_staff(&self) -> bool {
        self.role == "staff"
    }
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            name: claims.name,
            role: claims.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_role_detection() {
        let staff = CurrentUser {
            id: "customer:1".into(),
            email: "staff@example.com".into(),
            name: "Staff".into(),
            role: "staff".into(),
        };
        let customer = CurrentUser {
            role: "customer".into(),
            ..staff.clone()
        };

        assert!(staff.is_staff());
        assert!(!customer.is_staff());
    }
}
