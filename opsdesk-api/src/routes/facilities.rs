use axum::extract::{Query, State};
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;

use opsdesk_shared::errors::{AppError, AppResult};
use opsdesk_shared::types::auth::AuthUser;
use opsdesk_shared::types::ApiResponse;

use crate::models::Facility;
use crate::schema::facilities;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
}

pub async fn list_facilities(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<ApiResponse<Vec<Facility>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let mut query = facilities::table
        .order(facilities::created_at.desc())
        .into_boxed();

    if let Some(q) = params.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let pattern = format!("%{q}%");
        query = query.filter(
            facilities::name
                .ilike(pattern.clone())
                .or(facilities::location.ilike(pattern)),
        );
    }

    let rows: Vec<Facility> = query.load(&mut conn)?;
    Ok(Json(ApiResponse::ok(rows)))
}
