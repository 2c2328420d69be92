// Chat backend payloads, endpoint selection and the single-flight gate.

use crate::constants::LOOPBACK_HOSTS;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub text: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatMessage {
    pub content: String,
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat endpoint answered HTTP {0}")]
    Status(u16),
    #[error("chat reply had no choices")]
    EmptyReply,
    #[error("chat payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl ChatResponse {
    /// Text of the first choice, if any.
    pub fn reply_text(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

#[inline]
pub fn is_loopback(hostname: &str) -> bool {
    LOOPBACK_HOSTS.contains(&hostname)
}

/// Pick the dev endpoint when served from a loopback host.
pub fn endpoint_for_host<'a>(hostname: &str, local: &'a str, remote: &'a str) -> &'a str {
    if is_loopback(hostname) {
        local
    } else {
        remote
    }
}

pub fn encode_request(text: &str) -> Result<String, ChatError> {
    Ok(serde_json::to_string(&ChatRequest { text })?)
}

pub fn parse_reply(body: &str) -> Result<String, ChatError> {
    let response: ChatResponse = serde_json::from_str(body)?;
    response
        .reply_text()
        .map(str::to_owned)
        .ok_or(ChatError::EmptyReply)
}

/// Allows one request in flight at a time.
#[derive(Clone, Debug, Default)]
pub struct ChatGate {
    loading: bool,
}

impl ChatGate {
    /// Claim the gate for `input`. Returns the trimmed text to send, or
    /// `None` when the text is blank or a request is already pending.
    pub fn begin(&mut self, input: &str) -> Option<String> {
        let text = input.trim();
        if text.is_empty() || self.loading {
            return None;
        }
        self.loading = true;
        Some(text.to_owned())
    }

    pub fn finish(&mut self) {
        self.loading = false;
    }
}
