//! Response decoding.
//!
//! The service signals outcomes through the shape of the body rather than
//! the status code: a cooldown is `{"detail": {"blocked_until": <unix secs>}}`,
//! success is a flag or a positive award, anything else is a refusal.
//! Each body is decoded exactly once into an `ActionResult`.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::types::{stars, ActionResult, Failure, MajorError, Session, Streak, Task, UserInfo, Visit};

/// Maximum characters of a body echoed into a failure message.
const SUMMARY_LIMIT: usize = 200;

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

/// Extract `detail.blocked_until` as a UTC timestamp, if present.
pub fn blocked_until(body: &Value) -> Option<DateTime<Utc>> {
    let raw = body.get("detail")?.get("blocked_until")?;
    let secs = raw.as_f64()?;
    let millis = (secs * 1000.0).round() as i64;
    Utc.timestamp_millis_opt(millis).single()
}

/// Decode a body with `accept` deciding success; falls back to blocked,
/// then to a refusal (objects) or malformed (anything else).
pub fn action<T>(body: &Value, accept: impl FnOnce(&Value) -> Option<T>) -> ActionResult<T> {
    if let Some(t) = accept(body) {
        return ActionResult::Success(t);
    }
    if let Some(until) = blocked_until(body) {
        return ActionResult::Blocked(until);
    }
    if body.is_object() {
        ActionResult::Failed(Failure::Rejected(summarize(body)))
    } else {
        ActionResult::Failed(Failure::Malformed(summarize(body)))
    }
}

/// True when the body has `"<field>": true`.
fn flag(body: &Value, field: &str) -> bool {
    body.get(field).and_then(Value::as_bool).unwrap_or(false)
}

/// Compact, length-capped rendering of a body for log lines.
pub fn summarize(body: &Value) -> String {
    let text = body.to_string();
    if text.chars().count() > SUMMARY_LIMIT {
        let cut: String = text.chars().take(SUMMARY_LIMIT).collect();
        format!("{cut}…")
    } else {
        text
    }
}

fn typed<T: DeserializeOwned>(body: &Value, endpoint: &str) -> Result<T, MajorError> {
    serde_json::from_value(body.clone()).map_err(|e| MajorError::Validation {
        endpoint: endpoint.to_string(),
        message: format!("{e}: {}", summarize(body)),
    })
}

/// JSON ids may arrive as numbers or strings.
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Endpoint decoders
// ---------------------------------------------------------------------------

/// `/auth/tg/`: requires a non-empty `access_token` and a `user` with both
/// `id` and `first_name`. Never yields a partial session.
pub fn session_from_auth(body: &Value) -> Result<Session, MajorError> {
    let token = body
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty());
    let user = body.get("user").filter(|u| u.is_object());

    let (token, user) = match (token, user) {
        (Some(token), Some(user)) => (token, user),
        _ => {
            return Err(MajorError::Authentication(format!(
                "missing token or user in response: {}",
                summarize(body)
            )))
        }
    };

    let id = user.get("id").and_then(id_string);
    let first_name = user
        .get("first_name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|n| !n.is_empty());

    match (id, first_name) {
        (Some(id), Some(name)) => Ok(Session::new(token, id, name)),
        _ => Err(MajorError::Authentication(format!(
            "invalid user data: {}",
            summarize(user)
        ))),
    }
}

pub fn user_info(body: &Value) -> Result<UserInfo, MajorError> {
    typed(body, "users")
}

pub fn streak(body: &Value) -> Result<Streak, MajorError> {
    typed(body, "user-visits/streak")
}

/// Check-in succeeds whenever the body carries the increment flag; its value
/// only distinguishes "new day" from "already done". The streak is cosmetic.
pub fn visit(body: &Value) -> ActionResult<Visit> {
    action(body, |b| {
        let is_increased = b.get("is_increased").and_then(Value::as_bool)?;
        let streak = b
            .get("streak")
            .and_then(Value::as_u64)
            .and_then(|s| u32::try_from(s).ok())
            .unwrap_or(0);
        Some(Visit { is_increased, streak })
    })
}

/// Roulette succeeds only with a positive `rating_award`.
pub fn roulette(body: &Value) -> ActionResult<u64> {
    action(body, |b| {
        b.get("rating_award")
            .and_then(stars)
            .filter(|award| *award > 0)
    })
}

/// Hold-coins and swipe-coin submissions succeed on `"success": true`.
pub fn success_flag(body: &Value) -> ActionResult<()> {
    action(body, |b| flag(b, "success").then_some(()))
}

/// The swipe-coin probe grants a round only on `"success": true`.
pub fn swipe_probe(body: &Value) -> bool {
    flag(body, "success")
}

pub fn tasks(body: &Value) -> Result<Vec<Task>, MajorError> {
    typed(body, "tasks")
}

/// Task submissions succeed on `"is_completed": true`.
pub fn task_completion(body: &Value) -> ActionResult<()> {
    action(body, |b| flag(b, "is_completed").then_some(()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
