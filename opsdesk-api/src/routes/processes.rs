use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use opsdesk_shared::errors::{AppError, AppResult, ErrorCode};
use opsdesk_shared::middleware::AdminUser;
use opsdesk_shared::types::auth::AuthUser;
use opsdesk_shared::types::ApiResponse;

use crate::models::{
    NewProcess, NewProcessStep, NewSubStep, NewSubStepActor, NewSubStepForm, Process, ProcessStep,
    SubStep, SubStepActor, SubStepForm,
};
use crate::schema::{
    process_steps, process_sub_step_actors, process_sub_step_forms, process_sub_steps, processes,
};
use crate::services::process_tree::{self, ProcessDetail, ACTOR_COORDINATOR, ACTOR_PERFORMER};
use crate::AppState;

// --- Listing and detail ---

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
}

pub async fn list_processes(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<ApiResponse<Vec<Process>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let mut query = processes::table
        .order(processes::created_at.desc())
        .into_boxed();

    if let Some(q) = params.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let pattern = format!("%{q}%");
        query = query.filter(
            processes::name
                .ilike(pattern.clone())
                .or(processes::code.ilike(pattern.clone()))
                .or(processes::description.ilike(pattern)),
        );
    }

    let rows: Vec<Process> = query.load(&mut conn)?;
    Ok(Json(ApiResponse::ok(rows)))
}

pub async fn get_process(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(process_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProcessDetail>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let process: Process = processes::table
        .find(process_id)
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ProcessNotFound, "process not found"))?;

    let steps: Vec<ProcessStep> = process_steps::table
        .filter(process_steps::process_id.eq(process_id))
        .order(process_steps::step_no.asc())
        .load(&mut conn)?;

    let step_ids: Vec<Uuid> = steps.iter().map(|s| s.id).collect();
    let sub_steps: Vec<SubStep> = process_sub_steps::table
        .filter(process_sub_steps::step_id.eq_any(&step_ids))
        .load(&mut conn)?;

    let sub_step_ids: Vec<Uuid> = sub_steps.iter().map(|s| s.id).collect();
    let actors: Vec<SubStepActor> = process_sub_step_actors::table
        .filter(process_sub_step_actors::sub_step_id.eq_any(&sub_step_ids))
        .load(&mut conn)?;
    let forms: Vec<SubStepForm> = process_sub_step_forms::table
        .filter(process_sub_step_forms::sub_step_id.eq_any(&sub_step_ids))
        .load(&mut conn)?;

    Ok(Json(ApiResponse::ok(process_tree::assemble(
        process, steps, sub_steps, actors, forms,
    ))))
}

// --- Admin mutations (full-tree payload) ---

#[derive(Debug, Deserialize)]
pub struct ProcessPayload {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub steps: Vec<StepPayload>,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct StepPayload {
    pub step_no: i32,
    pub step_name: String,
    pub note: Option<String>,
    #[serde(default)]
    pub sub_steps: Vec<SubStepPayload>,
}

#[derive(Debug, Deserialize)]
pub struct SubStepPayload {
    pub sub_no: i32,
    pub work_content: String,
    pub expected_result: Option<String>,
    pub due_days: Option<i32>,
    #[serde(default)]
    pub performers: Vec<String>,
    #[serde(default)]
    pub coordinators: Vec<String>,
    #[serde(default)]
    pub forms: Vec<FormPayload>,
}

#[derive(Debug, Deserialize)]
pub struct FormPayload {
    pub form_code: Option<String>,
    pub form_name: String,
    pub url_file: Option<String>,
    pub note: Option<String>,
}

fn validate_payload(payload: &ProcessPayload) -> AppResult<()> {
    if payload.code.trim().is_empty() || payload.name.trim().is_empty() {
        return Err(AppError::new(
            ErrorCode::ValidationError,
            "code and name are required",
        ));
    }
    for step in &payload.steps {
        if step.step_name.trim().is_empty() {
            return Err(AppError::new(
                ErrorCode::ValidationError,
                "step_name is required for every step",
            ));
        }
        for sub in &step.sub_steps {
            if sub.work_content.trim().is_empty() {
                return Err(AppError::new(
                    ErrorCode::ValidationError,
                    "work_content is required for every sub-step",
                ));
            }
            for form in &sub.forms {
                if form.form_name.trim().is_empty() {
                    return Err(AppError::new(
                        ErrorCode::ValidationError,
                        "form_name is required for every form",
                    ));
                }
            }
        }
    }
    Ok(())
}

fn insert_tree(
    conn: &mut PgConnection,
    process_id: Uuid,
    steps: &[StepPayload],
) -> QueryResult<()> {
    for step in steps {
        let inserted_step: ProcessStep = diesel::insert_into(process_steps::table)
            .values(&NewProcessStep {
                process_id,
                step_no: step.step_no,
                step_name: step.step_name.trim().to_string(),
                note: step.note.clone(),
            })
            .get_result(conn)?;

        for sub in &step.sub_steps {
            let inserted_sub: SubStep = diesel::insert_into(process_sub_steps::table)
                .values(&NewSubStep {
                    step_id: inserted_step.id,
                    sub_no: sub.sub_no,
                    work_content: sub.work_content.trim().to_string(),
                    expected_result: sub.expected_result.clone(),
                    due_days: sub.due_days,
                })
                .get_result(conn)?;

            let actors: Vec<NewSubStepActor> = sub
                .performers
                .iter()
                .map(|text| (ACTOR_PERFORMER, text))
                .chain(sub.coordinators.iter().map(|text| (ACTOR_COORDINATOR, text)))
                .map(|(kind, text)| NewSubStepActor {
                    sub_step_id: inserted_sub.id,
                    actor_type: kind.to_string(),
                    actor_text: text.clone(),
                    note: None,
                })
                .collect();
            if !actors.is_empty() {
                diesel::insert_into(process_sub_step_actors::table)
                    .values(&actors)
                    .execute(conn)?;
            }

            let forms: Vec<NewSubStepForm> = sub
                .forms
                .iter()
                .map(|f| NewSubStepForm {
                    sub_step_id: inserted_sub.id,
                    form_code: f.form_code.clone(),
                    form_name: f.form_name.trim().to_string(),
                    url_file: f.url_file.clone(),
                    note: f.note.clone(),
                })
                .collect();
            if !forms.is_empty() {
                diesel::insert_into(process_sub_step_forms::table)
                    .values(&forms)
                    .execute(conn)?;
            }
        }
    }
    Ok(())
}

fn delete_tree(conn: &mut PgConnection, process_id: Uuid) -> QueryResult<()> {
    let step_ids: Vec<Uuid> = process_steps::table
        .filter(process_steps::process_id.eq(process_id))
        .select(process_steps::id)
        .load(conn)?;
    let sub_step_ids: Vec<Uuid> = process_sub_steps::table
        .filter(process_sub_steps::step_id.eq_any(&step_ids))
        .select(process_sub_steps::id)
        .load(conn)?;

    diesel::delete(
        process_sub_step_actors::table
            .filter(process_sub_step_actors::sub_step_id.eq_any(&sub_step_ids)),
    )
    .execute(conn)?;
    diesel::delete(
        process_sub_step_forms::table
            .filter(process_sub_step_forms::sub_step_id.eq_any(&sub_step_ids)),
    )
    .execute(conn)?;
    diesel::delete(process_sub_steps::table.filter(process_sub_steps::step_id.eq_any(&step_ids)))
        .execute(conn)?;
    diesel::delete(process_steps::table.filter(process_steps::process_id.eq(process_id)))
        .execute(conn)?;
    Ok(())
}

pub async fn create_process(
    admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ProcessPayload>,
) -> AppResult<(StatusCode, Json<ApiResponse<Process>>)> {
    validate_payload(&payload)?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let created = conn.transaction::<Process, diesel::result::Error, _>(|conn| {
        let process: Process = diesel::insert_into(processes::table)
            .values(&NewProcess {
                code: payload.code.trim().to_string(),
                name: payload.name.trim().to_string(),
                description: payload.description.clone(),
                version: payload.version.clone(),
                is_active: payload.is_active,
            })
            .get_result(conn)?;
        insert_tree(conn, process.id, &payload.steps)?;
        Ok(process)
    })?;

    state.catalog.invalidate();
    tracing::info!(process_id = %created.id, code = %created.code, admin_id = %admin.0.id, "process created");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(created))))
}

/// Full replace: header fields are updated and the step tree is deleted
/// and reinserted from the payload, all inside one transaction.
pub async fn update_process(
    admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Path(process_id): Path<Uuid>,
    Json(payload): Json<ProcessPayload>,
) -> AppResult<Json<ApiResponse<Process>>> {
    validate_payload(&payload)?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let exists: i64 = processes::table
        .find(process_id)
        .count()
        .get_result(&mut conn)?;
    if exists == 0 {
        return Err(AppError::new(ErrorCode::ProcessNotFound, "process not found"));
    }

    let updated = conn.transaction::<Process, diesel::result::Error, _>(|conn| {
        let process: Process = diesel::update(processes::table.find(process_id))
            .set((
                processes::code.eq(payload.code.trim()),
                processes::name.eq(payload.name.trim()),
                processes::description.eq(payload.description.clone()),
                processes::version.eq(payload.version.clone()),
                processes::is_active.eq(payload.is_active),
            ))
            .get_result(conn)?;
        delete_tree(conn, process_id)?;
        insert_tree(conn, process_id, &payload.steps)?;
        Ok(process)
    })?;

    state.catalog.invalidate();
    tracing::info!(process_id = %process_id, admin_id = %admin.0.id, "process replaced");

    Ok(Json(ApiResponse::ok(updated)))
}

pub async fn delete_process(
    admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Path(process_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let deleted = conn.transaction::<usize, diesel::result::Error, _>(|conn| {
        delete_tree(conn, process_id)?;
        diesel::delete(processes::table.find(process_id)).execute(conn)
    })?;

    if deleted == 0 {
        return Err(AppError::new(ErrorCode::ProcessNotFound, "process not found"));
    }

    state.catalog.invalidate();
    tracing::info!(process_id = %process_id, admin_id = %admin.0.id, "process deleted");

    Ok(Json(ApiResponse::ok(
        serde_json::json!({ "deleted": true }),
    )))
}
