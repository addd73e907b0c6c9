use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use opsdesk_shared::errors::{AppError, AppResult, ErrorCode};
use opsdesk_shared::middleware::AdminUser;
use opsdesk_shared::types::auth::UserRole;
use opsdesk_shared::types::ApiResponse;

use crate::models::{NewUser, PublicUser, User};
use crate::schema::{facilities, users};
use crate::services::auth_service;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub role: Option<String>,
    pub facility_id: Option<Uuid>,
    pub q: Option<String>,
}

pub async fn list_users(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<ApiResponse<Vec<PublicUser>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let mut query = users::table.order(users::created_at.desc()).into_boxed();

    if let Some(role) = params.role.as_deref().filter(|r| !r.is_empty()) {
        let role = role
            .parse::<UserRole>()
            .map_err(|e| AppError::new(ErrorCode::ValidationError, e))?;
        query = query.filter(users::role.eq(role.to_string()));
    }
    if let Some(facility_id) = params.facility_id {
        query = query.filter(users::facility_id.eq(facility_id));
    }
    if let Some(q) = params.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let pattern = format!("%{q}%");
        query = query.filter(
            users::name
                .ilike(pattern.clone())
                .or(users::email.ilike(pattern)),
        );
    }

    let rows: Vec<User> = query.load(&mut conn)?;
    Ok(Json(ApiResponse::ok(
        rows.into_iter().map(PublicUser::from).collect(),
    )))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    pub name: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    pub role: String,
    pub facility_id: Option<Uuid>,
}

pub async fn create_user(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<PublicUser>>)> {
    body.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    let name = body.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::new(ErrorCode::ValidationError, "name is required"));
    }
    let role = body
        .role
        .parse::<UserRole>()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e))?;
    let email = body.email.trim().to_lowercase();

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let taken: i64 = users::table
        .filter(users::email.eq(&email))
        .count()
        .get_result(&mut conn)?;
    if taken > 0 {
        return Err(AppError::new(
            ErrorCode::EmailAlreadyExists,
            "email is already registered",
        ));
    }

    if let Some(facility_id) = body.facility_id {
        let exists: i64 = facilities::table
            .find(facility_id)
            .count()
            .get_result(&mut conn)?;
        if exists == 0 {
            return Err(AppError::new(
                ErrorCode::FacilityNotFound,
                "invalid facility_id",
            ));
        }
    }

    let password_hash = auth_service::hash_password(&body.password)?;

    let created: User = diesel::insert_into(users::table)
        .values(&NewUser {
            name,
            email,
            password_hash,
            role: role.to_string(),
            facility_id: body.facility_id,
        })
        .get_result(&mut conn)?;

    tracing::info!(user_id = %created.id, role = %role, "user account created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(PublicUser::from(created))),
    ))
}

/// Partial update: absent fields keep their current values. An explicit
/// `"facility_id": null` clears the assignment.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub facility_id: Option<Option<Uuid>>,
    pub is_active: Option<bool>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

pub async fn update_user(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<PublicUser>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let existing: User = users::table
        .find(user_id)
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

    let name = match body.name {
        Some(n) => {
            let n = n.trim().to_string();
            if n.is_empty() {
                return Err(AppError::new(ErrorCode::ValidationError, "name must not be empty"));
            }
            n
        }
        None => existing.name.clone(),
    };

    let email = match body.email {
        Some(e) => {
            let e = e.trim().to_lowercase();
            if !e.contains('@') {
                return Err(AppError::new(ErrorCode::ValidationError, "invalid email format"));
            }
            // Allow keeping the same address, reject moving onto someone else's.
            if e != existing.email {
                let taken: i64 = users::table
                    .filter(users::email.eq(&e))
                    .count()
                    .get_result(&mut conn)?;
                if taken > 0 {
                    return Err(AppError::new(
                        ErrorCode::EmailAlreadyExists,
                        "email is already registered",
                    ));
                }
            }
            e
        }
        None => existing.email.clone(),
    };

    let role = match body.role {
        Some(r) => r
            .parse::<UserRole>()
            .map_err(|e| AppError::new(ErrorCode::ValidationError, e))?
            .to_string(),
        None => existing.role.clone(),
    };

    let facility_id = match body.facility_id {
        Some(Some(facility_id)) => {
            let exists: i64 = facilities::table
                .find(facility_id)
                .count()
                .get_result(&mut conn)?;
            if exists == 0 {
                return Err(AppError::new(
                    ErrorCode::FacilityNotFound,
                    "invalid facility_id",
                ));
            }
            Some(facility_id)
        }
        Some(None) => None,
        None => existing.facility_id,
    };

    let password_hash = match body.password.as_deref().filter(|p| !p.is_empty()) {
        Some(p) => {
            if p.len() < 8 {
                return Err(AppError::new(
                    ErrorCode::ValidationError,
                    "password must be at least 8 characters",
                ));
            }
            auth_service::hash_password(p)?
        }
        None => existing.password_hash.clone(),
    };

    let updated: User = diesel::update(users::table.find(user_id))
        .set((
            users::name.eq(name),
            users::email.eq(email),
            users::password_hash.eq(password_hash),
            users::role.eq(role),
            users::facility_id.eq(facility_id),
            users::is_active.eq(body.is_active.unwrap_or(existing.is_active)),
        ))
        .get_result(&mut conn)?;

    Ok(Json(ApiResponse::ok(PublicUser::from(updated))))
}

/// Soft delete: the row stays for attribution on incidents and comments.
pub async fn delete_user(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PublicUser>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let deactivated: User = diesel::update(users::table.find(user_id))
        .set(users::is_active.eq(false))
        .get_result(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

    tracing::info!(user_id = %user_id, "user account deactivated");

    Ok(Json(ApiResponse::ok(PublicUser::from(deactivated))))
}
