use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::interview::templates::{Difficulty, RoleType};
use crate::models::interview::{InterviewMessageRow, InterviewRow};
use crate::sessions::controller::{finish_session, start_session, submit_answer, SessionTranscript};
use crate::sessions::store;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct UserIdBody {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CreateInterviewRequest {
    pub user_id: Uuid,
    pub role_type: String,
    pub difficulty: String,
    pub job_description: Option<String>,
}

#[derive(Deserialize)]
pub struct AnswerRequest {
    pub user_id: Uuid,
    pub content: String,
}

#[derive(Serialize)]
pub struct AnswerResponse {
    pub reply: InterviewMessageRow,
}

/// POST /api/v1/interviews
///
/// Spends one of the user's credits; 402 when none are left.
pub async fn handle_create_interview(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateInterviewRequest>,
) -> Result<(StatusCode, Json<InterviewRow>), AppError> {
    let role_type: RoleType = req.role_type.parse().map_err(AppError::Validation)?;
    let difficulty: Difficulty = req.difficulty.parse().map_err(AppError::Validation)?;
    let job_description = req
        .job_description
        .as_deref()
        .map(str::trim)
        .filter(|jd| !jd.is_empty());

    let interview =
        store::create_interview(&state.db, req.user_id, role_type, difficulty, job_description)
            .await?;
    Ok((StatusCode::CREATED, Json(interview)))
}

/// GET /api/v1/interviews
pub async fn handle_list_interviews(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<UserIdQuery>,
) -> Result<Json<Vec<InterviewRow>>, AppError> {
    Ok(Json(store::list_interviews(&state.db, params.user_id).await?))
}

/// GET /api/v1/interviews/:id
pub async fn handle_get_interview(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(params): AppQuery<UserIdQuery>,
) -> Result<Json<SessionTranscript>, AppError> {
    let interview = store::get_interview(&state.db, id, params.user_id).await?;
    let messages = store::list_messages(&state.db, id).await?;
    Ok(Json(SessionTranscript {
        interview,
        messages,
    }))
}

/// POST /api/v1/interviews/:id/start
pub async fn handle_start_interview(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<UserIdBody>,
) -> Result<Json<SessionTranscript>, AppError> {
    let interview = store::get_interview(&state.db, id, req.user_id).await?;
    let session = start_session(&state.db, state.llm.as_ref(), interview).await?;
    Ok(Json(session))
}

/// POST /api/v1/interviews/:id/answer
pub async fn handle_answer(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<AnswerRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    let interview = store::get_interview(&state.db, id, req.user_id).await?;
    let reply = submit_answer(&state.db, state.llm.as_ref(), &interview, &req.content).await?;
    Ok(Json(AnswerResponse { reply }))
}

/// POST /api/v1/interviews/:id/end
pub async fn handle_end_interview(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<UserIdBody>,
) -> Result<Json<InterviewRow>, AppError> {
    let interview = store::get_interview(&state.db, id, req.user_id).await?;
    let completed = finish_session(&state.db, state.llm.as_ref(), &interview).await?;
    Ok(Json(completed))
}
