use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::{ChatMessage, ChatRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
        }
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(SessionStatus::InProgress),
            "completed" => Ok(SessionStatus::Completed),
            other => Err(format!("unknown session status '{other}'")),
        }
    }
}

/// One mock interview. Evaluation columns stay NULL until the session completes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role_type: String,
    pub difficulty: String,
    pub job_description: Option<String>,
    pub status: String,
    pub overall_score: Option<i32>,
    /// skill name → 0–100
    pub skill_ratings: Option<Value>,
    pub feedback_summary: Option<String>,
    /// ordered list of strings
    pub improvement_plan: Option<Value>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl InterviewRow {
    pub fn status(&self) -> Result<SessionStatus, AppError> {
        self.status
            .parse()
            .map_err(|e: String| AppError::Internal(anyhow::anyhow!(e)))
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.status(), Ok(SessionStatus::Completed))
    }
}

/// Append-only transcript entry. Never updated after insert.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewMessageRow {
    pub id: Uuid,
    pub interview_id: Uuid,
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl InterviewMessageRow {
    pub fn to_chat_message(&self) -> Result<ChatMessage, AppError> {
        let role = ChatRole::from_str(&self.role).map_err(|e| {
            AppError::Internal(anyhow::anyhow!("message {} has {e}", self.id))
        })?;
        Ok(ChatMessage::new(role, self.content.clone()))
    }
}

/// Converts stored rows to the orchestrator's transcript form, preserving order.
pub fn to_transcript(rows: &[InterviewMessageRow]) -> Result<Vec<ChatMessage>, AppError> {
    rows.iter().map(InterviewMessageRow::to_chat_message).collect()
}
