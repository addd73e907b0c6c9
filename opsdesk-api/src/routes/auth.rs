use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use opsdesk_shared::errors::{AppError, AppResult, ErrorCode};
use opsdesk_shared::types::auth::{AccessToken, AuthUser, UserRole};
use opsdesk_shared::types::ApiResponse;

use crate::models::{PublicUser, User};
use crate::schema::users;
use crate::services::auth_service;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: PublicUser,
    pub token: AccessToken,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let user: User = users::table
        .filter(users::email.eq(req.email.trim().to_lowercase()))
        .first(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::InvalidCredentials, "invalid email or password"))?;

    if !user.is_active {
        return Err(AppError::new(
            ErrorCode::AccountDisabled,
            "account has been deactivated",
        ));
    }

    let valid = auth_service::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(AppError::new(
            ErrorCode::InvalidCredentials,
            "invalid email or password",
        ));
    }

    let role = user
        .role
        .parse::<UserRole>()
        .unwrap_or(UserRole::Reporter);

    let token = auth_service::create_access_token(
        user.id,
        role,
        &state.config.jwt_secret,
        state.config.jwt_access_ttl,
    )?;

    tracing::info!(user_id = %user.id, role = %role, "user logged in");

    Ok(Json(ApiResponse::ok(LoginResponse {
        user: PublicUser::from(user),
        token,
    })))
}

pub async fn me(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<PublicUser>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let row: User = users::table
        .find(user.id)
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

    Ok(Json(ApiResponse::ok(PublicUser::from(row))))
}
