//! Session Store — PostgreSQL persistence for interviews and their transcripts.
//!
//! Messages are append-only. An interview row is written twice: once on
//! creation, once on completion (guarded so a session is graded at most once).
//! Transcript writes made by the controller go through [`SessionStore`], which
//! only appends when the transcript is still the one the reply was built from.

use async_trait::async_trait;
use sqlx::{PgExecutor, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::feedback::InterviewFeedback;
use crate::interview::templates::{Difficulty, RoleType};
use crate::llm_client::ChatRole;
use crate::models::interview::{InterviewMessageRow, InterviewRow, SessionStatus};
use crate::profiles::store::spend_credit;

/// Transcript persistence used by the session controller.
///
/// Implemented for `PgPool`; tests use `testing::MemoryStore`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn list_messages(&self, interview_id: Uuid) -> Result<Vec<InterviewMessageRow>, AppError>;

    /// Appends `turns` in order, all or nothing. Fails with `Conflict` unless the
    /// interview is still in progress and its transcript still holds exactly
    /// `expected_len` messages.
    async fn append_turns(
        &self,
        interview_id: Uuid,
        expected_len: usize,
        turns: &[(ChatRole, &str)],
    ) -> Result<Vec<InterviewMessageRow>, AppError>;

    async fn complete_interview(
        &self,
        interview_id: Uuid,
        feedback: &InterviewFeedback,
    ) -> Result<InterviewRow, AppError>;
}

pub(crate) fn already_completed(interview_id: Uuid) -> AppError {
    AppError::Conflict(format!("Interview {interview_id} is already completed"))
}

pub(crate) fn transcript_moved(interview_id: Uuid) -> AppError {
    AppError::Conflict(format!(
        "Interview {interview_id} changed while the interviewer was replying; reload the transcript"
    ))
}

/// Creates an interview and spends one of the user's credits in the same
/// transaction. Fails with `OutOfCredits` when the balance is zero.
pub async fn create_interview(
    pool: &PgPool,
    user_id: Uuid,
    role_type: RoleType,
    difficulty: Difficulty,
    job_description: Option<&str>,
) -> Result<InterviewRow, AppError> {
    let mut tx = pool.begin().await?;
    let credits_left = spend_credit(&mut *tx, user_id).await?;

    let interview = sqlx::query_as::<_, InterviewRow>(
        r#"
        INSERT INTO interviews (id, user_id, role_type, difficulty, job_description, status)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(role_type.as_str())
    .bind(difficulty.as_str())
    .bind(job_description)
    .bind(SessionStatus::InProgress.as_str())
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        "Created interview {} ({role_type}/{difficulty}) for user {user_id}, {credits_left} credits left",
        interview.id
    );
    Ok(interview)
}

/// Fetches an interview owned by `user_id`. Other users' sessions are reported as missing.
pub async fn get_interview(
    pool: &PgPool,
    interview_id: Uuid,
    user_id: Uuid,
) -> Result<InterviewRow, AppError> {
    sqlx::query_as::<_, InterviewRow>("SELECT * FROM interviews WHERE id = $1 AND user_id = $2")
        .bind(interview_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {interview_id} not found")))
}

pub async fn list_interviews(pool: &PgPool, user_id: Uuid) -> Result<Vec<InterviewRow>, AppError> {
    let interviews = sqlx::query_as::<_, InterviewRow>(
        "SELECT * FROM interviews WHERE user_id = $1 ORDER BY started_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(interviews)
}

pub async fn append_message<'e, E: PgExecutor<'e>>(
    executor: E,
    interview_id: Uuid,
    role: ChatRole,
    content: &str,
) -> Result<InterviewMessageRow, AppError> {
    let message = sqlx::query_as::<_, InterviewMessageRow>(
        r#"
        INSERT INTO interview_messages (id, interview_id, role, content)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(interview_id)
    .bind(role.as_str())
    .bind(content)
    .fetch_one(executor)
    .await?;
    Ok(message)
}

/// Returns the transcript in conversation order.
pub async fn list_messages<'e, E: PgExecutor<'e>>(
    executor: E,
    interview_id: Uuid,
) -> Result<Vec<InterviewMessageRow>, AppError> {
    let messages = sqlx::query_as::<_, InterviewMessageRow>(
        "SELECT * FROM interview_messages WHERE interview_id = $1 ORDER BY created_at, id",
    )
    .bind(interview_id)
    .fetch_all(executor)
    .await?;
    Ok(messages)
}

/// Writes the evaluation and marks the session completed.
/// Fails with `Conflict` if the session is no longer in progress.
pub async fn complete_interview(
    pool: &PgPool,
    interview_id: Uuid,
    feedback: &InterviewFeedback,
) -> Result<InterviewRow, AppError> {
    let skill_ratings = serde_json::to_value(&feedback.skill_ratings)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize skill ratings: {e}")))?;
    let improvement_plan = serde_json::to_value(&feedback.improvement_plan).map_err(|e| {
        AppError::Internal(anyhow::anyhow!("Failed to serialize improvement plan: {e}"))
    })?;

    let completed = sqlx::query_as::<_, InterviewRow>(
        r#"
        UPDATE interviews
        SET status = $2,
            completed_at = now(),
            overall_score = $3,
            skill_ratings = $4,
            feedback_summary = $5,
            improvement_plan = $6
        WHERE id = $1 AND status = $7
        RETURNING *
        "#,
    )
    .bind(interview_id)
    .bind(SessionStatus::Completed.as_str())
    .bind(feedback.overall_score as i32)
    .bind(&skill_ratings)
    .bind(&feedback.summary)
    .bind(&improvement_plan)
    .bind(SessionStatus::InProgress.as_str())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| already_completed(interview_id))?;

    info!(
        "Completed interview {interview_id} with score {}",
        feedback.overall_score
    );
    Ok(completed)
}

#[async_trait]
impl SessionStore for PgPool {
    async fn list_messages(&self, interview_id: Uuid) -> Result<Vec<InterviewMessageRow>, AppError> {
        list_messages(self, interview_id).await
    }

    async fn append_turns(
        &self,
        interview_id: Uuid,
        expected_len: usize,
        turns: &[(ChatRole, &str)],
    ) -> Result<Vec<InterviewMessageRow>, AppError> {
        let mut tx = self.begin().await?;

        // Serializes writers on this interview until commit.
        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM interviews WHERE id = $1 FOR UPDATE")
                .bind(interview_id)
                .fetch_optional(&mut *tx)
                .await?;
        let status = status
            .ok_or_else(|| AppError::NotFound(format!("Interview {interview_id} not found")))?;
        if status != SessionStatus::InProgress.as_str() {
            return Err(already_completed(interview_id));
        }

        let stored: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM interview_messages WHERE interview_id = $1")
                .bind(interview_id)
                .fetch_one(&mut *tx)
                .await?;
        if stored != expected_len as i64 {
            return Err(transcript_moved(interview_id));
        }

        let mut rows = Vec::with_capacity(turns.len());
        for (role, content) in turns {
            rows.push(append_message(&mut *tx, interview_id, *role, content).await?);
        }
        tx.commit().await?;

        Ok(rows)
    }

    async fn complete_interview(
        &self,
        interview_id: Uuid,
        feedback: &InterviewFeedback,
    ) -> Result<InterviewRow, AppError> {
        complete_interview(self, interview_id, feedback).await
    }
}
