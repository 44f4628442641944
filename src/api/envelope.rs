//! Response envelope normalization.
//!
//! The API wraps payloads as `{ "success": true, "data": { <key>: ... } }`,
//! but some endpoints put `<key>` at the top level instead. Each resource
//! has one function here that accepts both shapes and returns the canonical
//! type from [`super::types`].

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::types::{ApiInfo, ChatMessage, Conversation, Goal, QuizQuestion, User};
use crate::client::ResponseBody;

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("response is not JSON")]
    NotJson,
    #[error("missing `{0}` in response")]
    Missing(&'static str),
    #[error("malformed `{key}`: {source}")]
    Malformed {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("`{0}` has no id")]
    MissingId(&'static str),
    #[error("empty token in response")]
    EmptyToken,
}

/// The envelope's `success` flag; absent or non-boolean counts as `false`
pub fn is_success(body: &ResponseBody) -> bool {
    body.json()
        .and_then(|v| v.get("success"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Top-level `message` string, if any
pub fn message(body: &ResponseBody) -> Option<&str> {
    body.json()?.get("message")?.as_str()
}

/// Find `key` under `data` first, then at the top level. `null` counts as absent.
pub fn locate<'a>(body: &'a ResponseBody, key: &str) -> Option<&'a Value> {
    let value = body.json()?;
    value
        .get("data")
        .and_then(|data| data.get(key))
        .filter(|v| !v.is_null())
        .or_else(|| value.get(key).filter(|v| !v.is_null()))
}

/// Deserialize the payload stored under `key`
pub fn extract<T: DeserializeOwned>(
    body: &ResponseBody,
    key: &'static str,
) -> Result<T, EnvelopeError> {
    if body.json().is_none() {
        return Err(EnvelopeError::NotJson);
    }
    let value = locate(body, key).ok_or(EnvelopeError::Missing(key))?;
    T::deserialize(value).map_err(|source| EnvelopeError::Malformed { key, source })
}

/// Like [`extract`] for arrays, but an absent key yields an empty list
pub fn extract_list<T: DeserializeOwned>(
    body: &ResponseBody,
    key: &'static str,
) -> Result<Vec<T>, EnvelopeError> {
    match locate(body, key) {
        None => Ok(Vec::new()),
        Some(value) => {
            Vec::<T>::deserialize(value).map_err(|source| EnvelopeError::Malformed { key, source })
        }
    }
}

/// Number of entries in the array under `key`, `0` when absent or not an array
pub fn count(body: &ResponseBody, key: &str) -> usize {
    locate(body, key)
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

pub fn user(body: &ResponseBody) -> Result<User, EnvelopeError> {
    extract(body, "user")
}

/// User id from a registration or login response
pub fn user_id(body: &ResponseBody) -> Result<String, EnvelopeError> {
    user(body)?.ids.get().ok_or(EnvelopeError::MissingId("user"))
}

pub fn token(body: &ResponseBody) -> Result<String, EnvelopeError> {
    let token: String = extract(body, "token")?;
    if token.trim().is_empty() {
        return Err(EnvelopeError::EmptyToken);
    }
    Ok(token)
}

pub fn conversation_id(body: &ResponseBody) -> Result<String, EnvelopeError> {
    let conversation: Conversation = extract(body, "conversation")?;
    conversation
        .ids
        .get()
        .ok_or(EnvelopeError::MissingId("conversation"))
}

pub fn messages(body: &ResponseBody) -> Result<Vec<ChatMessage>, EnvelopeError> {
    extract_list(body, "messages")
}

pub fn goal(body: &ResponseBody) -> Result<Goal, EnvelopeError> {
    extract(body, "goal")
}

pub fn goal_id(body: &ResponseBody) -> Result<String, EnvelopeError> {
    goal(body)?.ids.get().ok_or(EnvelopeError::MissingId("goal"))
}

pub fn quiz_questions(body: &ResponseBody) -> Result<Vec<QuizQuestion>, EnvelopeError> {
    extract_list(body, "questions")
}

/// Root endpoint info is always top-level
pub fn api_info(body: &ResponseBody) -> Result<ApiInfo, EnvelopeError> {
    let value = body.json().ok_or(EnvelopeError::NotJson)?;
    ApiInfo::deserialize(value).map_err(|source| EnvelopeError::Malformed {
        key: "root",
        source,
    })
}
