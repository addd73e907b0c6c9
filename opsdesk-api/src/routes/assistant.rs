use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use opsdesk_shared::errors::{AppError, AppResult, ErrorCode};
use opsdesk_shared::types::auth::AuthUser;
use opsdesk_shared::types::ApiResponse;

use crate::schema::{process_steps, process_sub_step_forms, processes};
use crate::services::knowledge::{BUSY_REPLY, INTERNAL_DOCS, SYSTEM_INSTRUCTION};
use crate::services::prompt::{self, Catalog, ChatTurn};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

pub async fn chat(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatRequest>,
) -> AppResult<Json<ApiResponse<ChatResponse>>> {
    let message = body.message.trim();
    if message.is_empty() {
        return Err(AppError::new(ErrorCode::ValidationError, "message is empty"));
    }
    if !state.gemini.has_key() {
        return Err(AppError::new(
            ErrorCode::AssistantKeyMissing,
            "assistant is not configured",
        ));
    }

    let catalog = state.catalog.get_or_load(|| {
        let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
        let active: Vec<crate::models::Process> = processes::table
            .filter(processes::is_active.eq(true))
            .order(processes::code.asc())
            .load(&mut conn)?;
        let steps = process_steps::table
            .order(process_steps::step_no.asc())
            .load(&mut conn)?;
        let forms = process_sub_step_forms::table.load(&mut conn)?;
        Ok(Catalog {
            processes: active,
            steps,
            forms,
        })
    })?;

    let catalog_text = prompt::format_catalog(&catalog);
    let contents = prompt::build_contents(INTERNAL_DOCS, &catalog_text, &body.history, message);

    let reply = match state.gemini.generate(SYSTEM_INSTRUCTION, &contents).await {
        Ok(text) => prompt::rewrite_links(&text),
        Err(e) => {
            // Upstream hiccups degrade to a canned reply instead of a 5xx.
            tracing::warn!(error = %e, "assistant upstream call failed");
            BUSY_REPLY.to_string()
        }
    };

    Ok(Json(ApiResponse::ok(ChatResponse { reply })))
}
