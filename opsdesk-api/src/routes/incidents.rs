use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use opsdesk_shared::errors::{AppError, AppResult, ErrorCode};
use opsdesk_shared::middleware::AdminUser;
use opsdesk_shared::types::auth::{AuthUser, UserRole};
use opsdesk_shared::types::ApiResponse;

use crate::models::{
    Attachment, Comment, Facility, Incident, IncidentPriority, IncidentStatus, NewAttachment,
    NewComment, NewIncident, User,
};
use crate::schema::{facilities, incident_attachments, incident_comments, incidents, users};
use crate::services::attachments::{classify, storage_key};
use crate::services::read_model::{self, IncidentView};
use crate::AppState;

// --- List incidents (role-scoped, enriched) ---

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
    pub q: Option<String>,
}

pub async fn list_incidents(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<ApiResponse<Vec<IncidentView>>>> {
    let status_filter = match params.status.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => Some(
            s.parse::<IncidentStatus>()
                .map_err(|e| AppError::new(ErrorCode::InvalidStatus, e))?,
        ),
        None => None,
    };

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let mut query = incidents::table
        .order(incidents::created_at.desc())
        .into_boxed();

    // Reporters see their own reports, admins the incidents assigned to them.
    query = match user.role {
        UserRole::Reporter => query.filter(incidents::reporter_id.eq(user.id)),
        UserRole::Admin => query.filter(incidents::assigned_to.eq(user.id)),
    };

    if let Some(status) = status_filter {
        query = query.filter(incidents::status.eq(status.to_string()));
    }

    if let Some(q) = params.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let pattern = format!("%{q}%");
        query = query.filter(
            incidents::title
                .ilike(pattern.clone())
                .or(incidents::description.ilike(pattern)),
        );
    }

    let rows: Vec<Incident> = query.load(&mut conn)?;
    let incident_ids: Vec<Uuid> = rows.iter().map(|i| i.id).collect();

    // Application-side join: bulk-fetch the auxiliary collections once.
    let all_users: Vec<User> = users::table.load(&mut conn)?;
    let all_facilities: Vec<Facility> = facilities::table.load(&mut conn)?;

    let (attachments, comments) = if incident_ids.is_empty() {
        (vec![], vec![])
    } else {
        let attachments: Vec<Attachment> = incident_attachments::table
            .filter(incident_attachments::incident_id.eq_any(&incident_ids))
            .load(&mut conn)?;
        let comments: Vec<Comment> = incident_comments::table
            .filter(incident_comments::incident_id.eq_any(&incident_ids))
            .order(incident_comments::created_at.asc())
            .load(&mut conn)?;
        (attachments, comments)
    };

    let views = read_model::assemble(rows, &all_users, &all_facilities, attachments, comments);
    Ok(Json(ApiResponse::ok(views)))
}

// --- Create incident (multipart, with attachments) ---

#[derive(Debug, Serialize)]
pub struct CreateIncidentResponse {
    pub incident: Incident,
    pub attachments_count: usize,
}

#[derive(Debug, Default)]
struct IncidentForm {
    title: String,
    description: String,
    proposed_fix: String,
    priority: String,
    assigned_to: String,
    facility_id: String,
    files: Vec<UploadedFile>,
}

#[derive(Debug)]
struct UploadedFile {
    filename: String,
    mime: String,
    data: Vec<u8>,
}

async fn read_form(multipart: &mut Multipart) -> AppResult<IncidentForm> {
    let mut form = IncidentForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("failed to read multipart: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "attachments" {
            let filename = field.file_name().unwrap_or("file").to_string();
            let mime = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::bad_request(format!("failed to read file data: {e}")))?
                .to_vec();
            form.files.push(UploadedFile {
                filename,
                mime,
                data,
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::bad_request(format!("failed to read field '{name}': {e}")))?
            .trim()
            .to_string();

        match name.as_str() {
            "title" => form.title = value,
            "description" => form.description = value,
            "proposed_fix" => form.proposed_fix = value,
            "priority" => form.priority = value,
            "assigned_to" => form.assigned_to = value,
            "facility_id" => form.facility_id = value,
            _ => {}
        }
    }

    Ok(form)
}

/// Field checks that need no database access: required text fields, a
/// parseable facility id, and a known priority (defaulting to medium).
fn validate_form(form: &IncidentForm) -> AppResult<(IncidentPriority, Uuid)> {
    if form.title.is_empty() || form.description.is_empty() {
        return Err(AppError::new(
            ErrorCode::ValidationError,
            "title and description are required",
        ));
    }
    if form.facility_id.is_empty() {
        return Err(AppError::new(
            ErrorCode::ValidationError,
            "facility_id is required",
        ));
    }

    let facility_id = Uuid::parse_str(&form.facility_id)
        .map_err(|_| AppError::new(ErrorCode::ValidationError, "invalid facility_id"))?;

    let priority = if form.priority.is_empty() {
        IncidentPriority::Medium
    } else {
        form.priority
            .parse::<IncidentPriority>()
            .map_err(|e| AppError::new(ErrorCode::InvalidPriority, e))?
    };

    Ok((priority, facility_id))
}

pub async fn create_incident(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<CreateIncidentResponse>>)> {
    let form = read_form(&mut multipart).await?;
    let (priority, facility_id) = validate_form(&form)?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    // Reference checks: reporter (the caller), facility, optional assignee.
    let reporter: User = users::table
        .find(user.id)
        .first(&mut conn)
        .optional()?
        .filter(|u: &User| u.is_active)
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "reporter account not found"))?;

    let facility_exists: bool = facilities::table
        .find(facility_id)
        .count()
        .get_result::<i64>(&mut conn)
        .map(|c| c > 0)?;
    if !facility_exists {
        return Err(AppError::new(
            ErrorCode::FacilityNotFound,
            "invalid facility_id",
        ));
    }

    let assigned_to = if form.assigned_to.is_empty() {
        None
    } else {
        let assignee_id = Uuid::parse_str(&form.assigned_to)
            .map_err(|_| AppError::new(ErrorCode::InvalidAssignee, "invalid assigned_to"))?;
        let assignee: Option<User> = users::table
            .find(assignee_id)
            .first(&mut conn)
            .optional()?;
        match assignee {
            Some(u) if u.is_active && u.role == UserRole::Admin.to_string() => Some(u.id),
            _ => {
                return Err(AppError::new(
                    ErrorCode::InvalidAssignee,
                    "assigned_to must reference an active admin",
                ))
            }
        }
    };

    let new_incident = NewIncident {
        facility_id,
        reporter_id: reporter.id,
        title: form.title,
        description: form.description,
        proposed_fix: (!form.proposed_fix.is_empty()).then_some(form.proposed_fix),
        priority: priority.to_string(),
        // Every creation path starts at "open".
        status: IncidentStatus::Open.to_string(),
        assigned_to,
    };

    let incident: Incident = diesel::insert_into(incidents::table)
        .values(&new_incident)
        .get_result(&mut conn)?;

    // Best-effort upload: one failed file never fails the whole report.
    let mut stored: Vec<NewAttachment> = Vec::new();
    for file in form.files {
        if file.data.is_empty() {
            continue;
        }

        let key = storage_key(incident.id, Utc::now().timestamp_millis(), &file.filename);
        let size_bytes = file.data.len() as i64;
        match state.storage.upload(&key, file.data, &file.mime).await {
            Ok(url) => stored.push(NewAttachment {
                incident_id: incident.id,
                kind: classify(&file.mime).as_str().to_string(),
                url,
                filename: file.filename,
                mime: file.mime,
                size_bytes,
            }),
            Err(e) => {
                tracing::error!(
                    incident_id = %incident.id,
                    filename = %file.filename,
                    error = %e,
                    "attachment upload failed, skipping file"
                );
            }
        }
    }

    if !stored.is_empty() {
        diesel::insert_into(incident_attachments::table)
            .values(&stored)
            .execute(&mut conn)?;
    }

    tracing::info!(
        incident_id = %incident.id,
        reporter_id = %reporter.id,
        attachments = stored.len(),
        "incident created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(CreateIncidentResponse {
            attachments_count: stored.len(),
            incident,
        })),
    ))
}

// --- Update status (admin triage) ---

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub async fn update_status(
    admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Path(incident_id): Path<Uuid>,
    Json(body): Json<UpdateStatusRequest>,
) -> AppResult<Json<ApiResponse<Incident>>> {
    let status = body
        .status
        .parse::<IncidentStatus>()
        .map_err(|e| AppError::new(ErrorCode::InvalidStatus, e))?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    // No transition table: any status may replace any other.
    let updated: Incident = diesel::update(incidents::table.find(incident_id))
        .set((
            incidents::status.eq(status.to_string()),
            incidents::updated_at.eq(Utc::now()),
        ))
        .get_result(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::IncidentNotFound, "incident not found"))?;

    tracing::info!(
        incident_id = %incident_id,
        status = %status,
        admin_id = %admin.0.id,
        "incident status updated"
    );

    Ok(Json(ApiResponse::ok(updated)))
}

// --- Update details ---

#[derive(Debug, Deserialize)]
pub struct UpdateDetailsRequest {
    pub title: String,
    pub description: String,
    pub proposed_fix: Option<String>,
    pub priority: Option<String>,
}

pub async fn update_details(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(incident_id): Path<Uuid>,
    Json(body): Json<UpdateDetailsRequest>,
) -> AppResult<Json<ApiResponse<Incident>>> {
    let title = body.title.trim().to_string();
    let description = body.description.trim().to_string();
    if title.is_empty() || description.is_empty() {
        return Err(AppError::new(
            ErrorCode::ValidationError,
            "title and description are required",
        ));
    }

    let priority = match body.priority.as_deref().filter(|p| !p.is_empty()) {
        Some(p) => Some(
            p.parse::<IncidentPriority>()
                .map_err(|e| AppError::new(ErrorCode::InvalidPriority, e))?,
        ),
        None => None,
    };

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let existing: Incident = incidents::table
        .find(incident_id)
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::IncidentNotFound, "incident not found"))?;

    // Only the reporting user or an admin may edit the report body.
    if user.role != UserRole::Admin && existing.reporter_id != user.id {
        return Err(AppError::forbidden("not your incident"));
    }

    let proposed_fix = body
        .proposed_fix
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());

    // An omitted priority keeps the current one.
    let priority = priority
        .map(|p| p.to_string())
        .unwrap_or_else(|| existing.priority.clone());

    let updated: Incident = diesel::update(incidents::table.find(incident_id))
        .set((
            incidents::title.eq(title),
            incidents::description.eq(description),
            incidents::proposed_fix.eq(proposed_fix),
            incidents::priority.eq(priority),
            incidents::updated_at.eq(Utc::now()),
        ))
        .get_result(&mut conn)?;

    Ok(Json(ApiResponse::ok(updated)))
}

// --- Add comment ---

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub message: String,
}

pub async fn add_comment(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(incident_id): Path<Uuid>,
    Json(body): Json<AddCommentRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Comment>>)> {
    let message = body.message.trim().to_string();
    if message.is_empty() {
        return Err(AppError::new(ErrorCode::EmptyComment, "message is empty"));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let exists: bool = incidents::table
        .find(incident_id)
        .count()
        .get_result::<i64>(&mut conn)
        .map(|c| c > 0)?;
    if !exists {
        return Err(AppError::new(
            ErrorCode::IncidentNotFound,
            "incident not found",
        ));
    }

    let author_exists: bool = users::table
        .find(user.id)
        .count()
        .get_result::<i64>(&mut conn)
        .map(|c| c > 0)?;
    if !author_exists {
        return Err(AppError::new(ErrorCode::UserNotFound, "author not found"));
    }

    let comment: Comment = diesel::insert_into(incident_comments::table)
        .values(&NewComment {
            incident_id,
            author_id: user.id,
            message,
        })
        .get_result(&mut conn)?;

    // Comment appends bump the parent's updated timestamp.
    diesel::update(incidents::table.find(incident_id))
        .set(incidents::updated_at.eq(Utc::now()))
        .execute(&mut conn)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(comment))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str, description: &str, facility_id: &str, priority: &str) -> IncidentForm {
        IncidentForm {
            title: title.to_string(),
            description: description.to_string(),
            facility_id: facility_id.to_string(),
            priority: priority.to_string(),
            ..IncidentForm::default()
        }
    }

    fn code_of(err: AppError) -> ErrorCode {
        match err {
            AppError::Known { code, .. } => code,
            _ => panic!("expected a known error code"),
        }
    }

    const FACILITY: &str = "0192c3a0-0000-7000-8000-000000000001";

    #[test]
    fn missing_title_or_description_is_rejected() {
        let err = validate_form(&form("", "Hallway B", FACILITY, "high")).unwrap_err();
        assert_eq!(code_of(err), ErrorCode::ValidationError);

        let err = validate_form(&form("Leaking pipe", "", FACILITY, "high")).unwrap_err();
        assert_eq!(code_of(err), ErrorCode::ValidationError);
    }

    #[test]
    fn missing_or_malformed_facility_is_rejected() {
        let err = validate_form(&form("Leaking pipe", "Hallway B", "", "high")).unwrap_err();
        assert_eq!(code_of(err), ErrorCode::ValidationError);

        let err = validate_form(&form("Leaking pipe", "Hallway B", "not-a-uuid", "high"))
            .unwrap_err();
        assert_eq!(code_of(err), ErrorCode::ValidationError);
    }

    #[test]
    fn unknown_priority_is_rejected() {
        let err = validate_form(&form("Leaking pipe", "Hallway B", FACILITY, "urgent"))
            .unwrap_err();
        assert_eq!(code_of(err), ErrorCode::InvalidPriority);
    }

    #[test]
    fn omitted_priority_defaults_to_medium() {
        let (priority, facility_id) =
            validate_form(&form("Leaking pipe", "Hallway B", FACILITY, "")).unwrap();
        assert_eq!(priority, IncidentPriority::Medium);
        assert_eq!(facility_id.to_string(), FACILITY);
    }
}
