//! Transcript shape checks. A session's conversation alternates
//! assistant/user starting with the assistant greeting; system turns are ignored.

use thiserror::Error;

use crate::llm_client::{ChatMessage, ChatRole};

#[derive(Debug, Error, PartialEq)]
pub enum TranscriptError {
    #[error("transcript must open with the interviewer greeting")]
    UserSpokeFirst,

    #[error("message {index} repeats the {role} turn")]
    RepeatedTurn { index: usize, role: &'static str },
}

pub fn check_alternation(messages: &[ChatMessage]) -> Result<(), TranscriptError> {
    let mut expected = ChatRole::Assistant;
    let mut opened = false;

    for (index, message) in messages.iter().enumerate() {
        if message.role == ChatRole::System {
            continue;
        }
        if message.role != expected {
            return Err(if !opened {
                TranscriptError::UserSpokeFirst
            } else {
                TranscriptError::RepeatedTurn {
                    index,
                    role: message.role.as_str(),
                }
            });
        }
        opened = true;
        expected = match expected {
            ChatRole::Assistant => ChatRole::User,
            _ => ChatRole::Assistant,
        };
    }
    Ok(())
}

/// True when the last conversational turn is the interviewer's, i.e. a candidate
/// answer is the next valid message.
pub fn awaiting_answer(messages: &[ChatMessage]) -> bool {
    messages
        .iter()
        .rev()
        .find(|m| m.role != ChatRole::System)
        .is_some_and(|m| m.role == ChatRole::Assistant)
}
