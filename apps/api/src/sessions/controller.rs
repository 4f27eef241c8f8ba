//! Session Controller — drives start → respond×N → end for a stored interview.
//!
//! Each step loads the authoritative transcript, calls the orchestrator, and
//! persists only after the gateway call succeeds, so a failed call never leaves a
//! half-written turn behind. The write is refused with `Conflict` when another
//! request changed the transcript while the gateway was replying.

use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::interview::orchestrator::{evaluate, next_message, ChatAction, ChatTurn};
use crate::llm_client::{ChatCompletion, ChatMessage, ChatRole};
use crate::models::interview::{to_transcript, InterviewMessageRow, InterviewRow};
use crate::sessions::store::{already_completed, SessionStore};
use crate::sessions::transcript::{awaiting_answer, check_alternation};

#[derive(Debug, Serialize)]
pub struct SessionTranscript {
    pub interview: InterviewRow,
    pub messages: Vec<InterviewMessageRow>,
}

fn turn<'a>(
    interview: &'a InterviewRow,
    transcript: &'a [ChatMessage],
    action: ChatAction,
) -> ChatTurn<'a> {
    ChatTurn {
        role_type: &interview.role_type,
        difficulty: &interview.difficulty,
        job_description: interview.job_description.as_deref(),
        transcript,
        action,
    }
}

/// Opens the interview with the interviewer greeting. Resuming a session that
/// already has messages returns them unchanged.
pub async fn start_session(
    store: &dyn SessionStore,
    llm: &dyn ChatCompletion,
    interview: InterviewRow,
) -> Result<SessionTranscript, AppError> {
    let existing = store.list_messages(interview.id).await?;
    if !existing.is_empty() {
        return Ok(SessionTranscript {
            interview,
            messages: existing,
        });
    }
    if interview.is_completed() {
        return Err(already_completed(interview.id));
    }

    let greeting = next_message(llm, &turn(&interview, &[], ChatAction::Start)).await?;
    let messages = store
        .append_turns(interview.id, 0, &[(ChatRole::Assistant, greeting.as_str())])
        .await?;

    info!("Interview {} started", interview.id);
    Ok(SessionTranscript {
        interview,
        messages,
    })
}

/// Records a candidate answer and the interviewer's reply. Both rows are written
/// together after the reply arrives.
pub async fn submit_answer(
    store: &dyn SessionStore,
    llm: &dyn ChatCompletion,
    interview: &InterviewRow,
    answer: &str,
) -> Result<InterviewMessageRow, AppError> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Err(AppError::Validation("content cannot be empty".to_string()));
    }
    if interview.is_completed() {
        return Err(already_completed(interview.id));
    }

    let stored = store.list_messages(interview.id).await?;
    let mut transcript = to_transcript(&stored)?;
    if !awaiting_answer(&transcript) {
        return Err(AppError::Conflict(
            "The interviewer has not asked a question yet".to_string(),
        ));
    }
    transcript.push(ChatMessage::user(answer));
    check_alternation(&transcript).map_err(|e| AppError::Conflict(e.to_string()))?;

    let reply = next_message(llm, &turn(interview, &transcript, ChatAction::Respond)).await?;

    let mut rows = store
        .append_turns(
            interview.id,
            stored.len(),
            &[(ChatRole::User, answer), (ChatRole::Assistant, reply.as_str())],
        )
        .await?;
    rows.pop()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("reply row was not returned")))
}

/// Grades the full transcript and stores the result. A session is graded once,
/// and only after the interviewer has opened it.
pub async fn finish_session(
    store: &dyn SessionStore,
    llm: &dyn ChatCompletion,
    interview: &InterviewRow,
) -> Result<InterviewRow, AppError> {
    if interview.is_completed() {
        return Err(already_completed(interview.id));
    }

    let transcript = to_transcript(&store.list_messages(interview.id).await?)?;
    if transcript.iter().all(|m| m.role == ChatRole::System) {
        return Err(AppError::Conflict("Interview has not started".to_string()));
    }

    let feedback = evaluate(llm, &turn(interview, &transcript, ChatAction::End)).await?;
    store.complete_interview(interview.id, &feedback).await
}
