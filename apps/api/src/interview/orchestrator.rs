//! Interview Orchestrator — turns one phase-tagged chat turn into one gateway call.
//!
//! Flow: pick system prompt by phase → assemble [system, ...transcript, instruction]
//!       → ChatCompletion::complete → plain message (start/respond) or
//!       parsed feedback with fallback (end).
//!
//! Stateless: the caller supplies the authoritative transcript on every call.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::interview::feedback::{parse_feedback, InterviewFeedback};
use crate::interview::prompts::{
    evaluation_system_prompt, interviewer_system_prompt, END_INSTRUCTION, RESPOND_INSTRUCTION,
    START_INSTRUCTION,
};
use crate::llm_client::{ChatCompletion, ChatMessage, ChatRequest, LlmError};

const CONVERSATION_MAX_TOKENS: u32 = 800;
const EVALUATION_MAX_TOKENS: u32 = 1500;

/// Interview phase carried by every orchestrator request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatAction {
    Start,
    Respond,
    End,
}

impl ChatAction {
    pub fn max_tokens(&self) -> u32 {
        match self {
            ChatAction::Start | ChatAction::Respond => CONVERSATION_MAX_TOKENS,
            ChatAction::End => EVALUATION_MAX_TOKENS,
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            ChatAction::Start => START_INSTRUCTION,
            ChatAction::Respond => RESPOND_INSTRUCTION,
            ChatAction::End => END_INSTRUCTION,
        }
    }
}

/// Everything the orchestrator needs for one call. Role and difficulty stay raw
/// strings: unknown values resolve to fallback templates rather than failing.
#[derive(Debug, Clone, Copy)]
pub struct ChatTurn<'a> {
    pub role_type: &'a str,
    pub difficulty: &'a str,
    pub job_description: Option<&'a str>,
    pub transcript: &'a [ChatMessage],
    pub action: ChatAction,
}

/// Orchestrator output: the interviewer's next message, or the final grading.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChatReply {
    Message { message: String },
    Feedback(InterviewFeedback),
}

/// Assembles the gateway request for a turn. `start` ignores any supplied transcript.
pub fn build_chat_request(turn: &ChatTurn<'_>) -> ChatRequest {
    let system_prompt = match turn.action {
        ChatAction::Start | ChatAction::Respond => {
            interviewer_system_prompt(turn.role_type, turn.difficulty, turn.job_description)
        }
        ChatAction::End => evaluation_system_prompt(turn.role_type),
    };

    let transcript: &[ChatMessage] = match turn.action {
        ChatAction::Start => &[],
        ChatAction::Respond | ChatAction::End => turn.transcript,
    };

    let mut messages = Vec::with_capacity(transcript.len() + 2);
    messages.push(ChatMessage::system(system_prompt));
    messages.extend(transcript.iter().cloned());
    messages.push(ChatMessage::user(turn.action.instruction()));

    ChatRequest {
        messages,
        max_tokens: turn.action.max_tokens(),
    }
}

/// Runs one turn end to end.
pub async fn run_turn(llm: &dyn ChatCompletion, turn: &ChatTurn<'_>) -> Result<ChatReply, LlmError> {
    match turn.action {
        ChatAction::Start | ChatAction::Respond => next_message(llm, turn)
            .await
            .map(|message| ChatReply::Message { message }),
        ChatAction::End => evaluate(llm, turn).await.map(ChatReply::Feedback),
    }
}

/// Produces the interviewer's next message (greeting or follow-up).
pub async fn next_message(llm: &dyn ChatCompletion, turn: &ChatTurn<'_>) -> Result<String, LlmError> {
    let request = build_chat_request(turn);
    info!(
        "Interview {:?} turn: role={}, difficulty={}, transcript_len={}",
        turn.action,
        turn.role_type,
        turn.difficulty,
        request.messages.len() - 2
    );
    llm.complete(&request).await
}

/// Grades the transcript. Unparseable model output degrades to the fixed fallback.
pub async fn evaluate(
    llm: &dyn ChatCompletion,
    turn: &ChatTurn<'_>,
) -> Result<InterviewFeedback, LlmError> {
    let request = build_chat_request(&ChatTurn {
        action: ChatAction::End,
        ..*turn
    });
    info!(
        "Evaluating interview: role={}, transcript_len={}",
        turn.role_type,
        turn.transcript.len()
    );

    let text = llm.complete(&request).await?;

    Ok(parse_feedback(&text).unwrap_or_else(|e| {
        warn!(
            "Feedback parse failed ({e}); serving fallback feedback. Model output: {:?}",
            text.chars().take(200).collect::<String>()
        );
        InterviewFeedback::fallback()
    }))
}
