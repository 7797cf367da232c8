//! Authentication Handlers
//!
//! Handles customer registration, login and profile lookup.

use std::time::Duration;

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Customer, CustomerCreate, CustomerRole};
use crate::db::repository::CustomerRepository;
use crate::utils::validation::{
    MAX_CONTACT_LEN, MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_PASSWORD_LEN, MIN_PASSWORD_LEN,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub contact: String,
    pub email: String,
    pub password: String,
    pub password2: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub customer_id: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub contact: String,
    pub loyalty_points: i32,
    pub role: CustomerRole,
}

impl From<Customer> for UserInfo {
    fn from(c: Customer) -> Self {
        Self {
            id: c.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            first_name: c.first_name,
            last_name: c.last_name,
            email: c.email,
            contact: c.contact,
            loyalty_points: c.loyalty_points,
            role: c.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

/// POST /api/auth/register - 注册顾客账户
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    validate_required_text(&req.first_name, "first_name", MAX_NAME_LEN)?;
    validate_required_text(&req.last_name, "last_name", MAX_NAME_LEN)?;
    validate_required_text(&req.contact, "contact", MAX_CONTACT_LEN)?;
    validate_required_text(&req.email, "email", MAX_EMAIL_LEN)?;
    if !req.email.contains('@') {
        return Err(AppError::validation("Invalid email address"));
    }
    if req.password != req.password2 {
        return Err(AppError::validation("Passwords do not match"));
    }
    if req.password.len() < MIN_PASSWORD_LEN || req.password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be between {MIN_PASSWORD_LEN} and {MAX_PASSWORD_LEN} characters"
        )));
    }

    let hash_pass = Customer::hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

    let repo = CustomerRepository::new(state.db.clone());
    let customer = repo
        .create(
            CustomerCreate {
                first_name: req.first_name,
                last_name: req.last_name,
                contact: req.contact,
                email: req.email.trim().to_lowercase(),
                hash_pass,
                role: CustomerRole::Customer,
            },
            state.clock.now().timestamp_millis(),
        )
        .await?;

    tracing::info!(email = %customer.email, "Customer registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Registration successful! Please login.".to_string(),
            customer_id: customer.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            email: customer.email,
        }),
    ))
}

/// POST /api/auth/login - 登录并签发 JWT
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let repo = CustomerRepository::new(state.db.clone());
    let customer = repo.find_by_email(req.email.trim()).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // 统一错误消息，防止邮箱枚举
    let customer = match customer {
        Some(c) => {
            if !c.is_active {
                return Err(AppError::forbidden("Account has been disabled"));
            }

            let password_valid = c
                .verify_password(&req.password)
                .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;

            if !password_valid {
                tracing::warn!(email = %req.email, "Login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }

            c
        }
        None => {
            tracing::warn!(email = %req.email, "Login failed - unknown email");
            return Err(AppError::invalid_credentials());
        }
    };

    let customer_id = customer
        .id
        .as_ref()
        .map(|t| t.to_string())
        .unwrap_or_default();
    let role = match customer.role {
        CustomerRole::Staff => "staff",
        CustomerRole::Customer => "customer",
    };

    let token = state
        .jwt_service
        .generate_token(&customer_id, &customer.email, &customer.full_name(), role)
        .map_err(|e| AppError::internal(format!("Token generation failed: {e}")))?;

    tracing::info!(email = %customer.email, "Login successful");

    Ok(Json(LoginResponse {
        token,
        user: customer.into(),
    }))
}

/// GET /api/auth/me - 当前登录用户信息
pub async fn me(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<UserInfo>> {
    let repo = CustomerRepository::new(state.db.clone());
    let customer = repo
        .find_by_email(&user.email)
        .await?
        .ok_or_else(|| AppError::not_found("Customer profile not found"))?;

    Ok(Json(customer.into()))
}
