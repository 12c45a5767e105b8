//! Shared types for the MAJOR-BOT runner.
//!
//! These types form the data model used across all modules: credentials
//! and sessions, decoded API payloads, the tagged `ActionResult` every
//! remote action resolves to, and the per-account / per-pass reports the
//! run loop folds into totals.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

// ---------------------------------------------------------------------------
// Credentials & sessions
// ---------------------------------------------------------------------------

/// Opaque per-account login payload (Telegram `init_data`).
///
/// Wrapped in a secret so it never shows up in `Debug` output or logs.
#[derive(Debug, Clone)]
pub struct Credential(SecretString);

impl Credential {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(SecretString::new(raw.into()))
    }

    /// The raw init data, for the login request body only.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

/// Authenticated context for one account's processing.
#[derive(Debug, Clone)]
pub struct Session {
    access_token: SecretString,
    pub user_id: String,
    pub display_name: String,
}

impl Session {
    /// Build a session. Callers must have checked that every field is
    /// non-empty; see `api::decode::session_from_auth`.
    pub fn new(
        access_token: impl Into<String>,
        user_id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            access_token: SecretString::new(access_token.into()),
            user_id: user_id.into(),
            display_name: display_name.into(),
        }
    }

    pub fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }

    /// Helper to build a session for tests.
    #[cfg(test)]
    pub fn sample() -> Self {
        Session::new("token-abc", "42", "Alice")
    }
}

// ---------------------------------------------------------------------------
// Decoded payloads
// ---------------------------------------------------------------------------

/// Star amounts arrive as integers or floats. Rounded, negatives clamp to 0.
pub(crate) fn stars(value: &Value) -> Option<u64> {
    let n = value.as_f64()?;
    n.is_finite().then(|| n.max(0.0).round() as u64)
}

fn required_stars<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(d)?;
    stars(&value).ok_or_else(|| D::Error::custom(format!("expected a star amount, got {value}")))
}

fn optional_stars<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    Ok(stars(&Value::deserialize(d)?).unwrap_or(0))
}

/// Profile returned by `/users/{id}/`. Only the balance is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Star balance.
    #[serde(deserialize_with = "required_stars")]
    pub rating: u64,
}

/// Response from `/user-visits/streak/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub streak: u32,
}

/// Check-in payload from `/user-visits/visit/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    /// True when this call advanced the streak; false when already done today.
    pub is_increased: bool,
    #[serde(default)]
    pub streak: u32,
}

/// A one-off (non-daily) task from `/tasks/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "optional_stars")]
    pub award: u64,
}

// ---------------------------------------------------------------------------
// Action results
// ---------------------------------------------------------------------------

/// Outcome of one remote action, decoded once per response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult<T> {
    Success(T),
    /// Remote cooldown; the action becomes available again at the timestamp.
    Blocked(DateTime<Utc>),
    Failed(Failure),
}

impl<T> ActionResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success(_))
    }

    pub fn success(self) -> Option<T> {
        match self {
            ActionResult::Success(t) => Some(t),
            _ => None,
        }
    }
}

/// Why an action produced no result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Network or HTTP-level error; the request never yielded JSON.
    Transport(String),
    /// Well-formed reply that is neither success nor cooldown.
    Rejected(String),
    /// Reply of the wrong shape.
    Malformed(String),
    /// Swipe-coin probe did not grant a round.
    Ineligible,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Transport(msg) => write!(f, "transport error: {msg}"),
            Failure::Rejected(msg) => write!(f, "rejected: {msg}"),
            Failure::Malformed(msg) => write!(f, "malformed response: {msg}"),
            Failure::Ineligible => write!(f, "not eligible"),
        }
    }
}

// ---------------------------------------------------------------------------
// Reports & totals
// ---------------------------------------------------------------------------

/// How fetched ratings count toward the pass total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingPolicy {
    /// Every profile fetch adds its rating. The profile is fetched twice per
    /// account, so each account's balance is counted twice.
    #[default]
    EveryFetch,
    /// Only the most recent successful fetch counts.
    LatestOnly,
}

/// How far an account got through the daily sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountOutcome {
    /// Login failed or returned an incomplete identity.
    AuthFailed,
    /// Logged in but the initial profile fetch failed.
    ProfileUnavailable,
    Completed,
}

impl fmt::Display for AccountOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountOutcome::AuthFailed => write!(f, "auth-failed"),
            AccountOutcome::ProfileUnavailable => write!(f, "profile-unavailable"),
            AccountOutcome::Completed => write!(f, "completed"),
        }
    }
}

/// Completed vs fetched task counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskTally {
    pub completed: usize,
    pub total: usize,
}

/// Everything one account contributed during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountReport {
    /// Zero-based position in the credentials file.
    pub index: usize,
    pub display_name: Option<String>,
    pub outcome: AccountOutcome,
    /// Ratings from each successful profile fetch, in fetch order.
    pub ratings: Vec<u64>,
    /// Stars won on the bonus wheel.
    pub wheel_award: u64,
    /// `None` when the task list could not be fetched.
    pub tasks: Option<TaskTally>,
}

impl AccountReport {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            display_name: None,
            outcome: AccountOutcome::AuthFailed,
            ratings: Vec::new(),
            wheel_award: 0,
            tasks: None,
        }
    }

    /// Stars this account adds to the pass total under `policy`.
    pub fn contribution(&self, policy: RatingPolicy) -> u64 {
        let ratings = match policy {
            RatingPolicy::EveryFetch => self.ratings.iter().sum(),
            RatingPolicy::LatestOnly => self.ratings.last().copied().unwrap_or(0),
        };
        ratings + self.wheel_award
    }
}

/// Running sum of stars across one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunTotals {
    pub stars: u64,
}

impl RunTotals {
    pub fn absorb(&mut self, report: &AccountReport, policy: RatingPolicy) {
        self.stars += report.contribution(policy);
    }
}

/// Summary of one full pass over all accounts.
#[derive(Debug, Clone)]
pub struct PassReport {
    pub pass_number: u64,
    pub accounts: Vec<AccountReport>,
    pub totals: RunTotals,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl PassReport {
    pub fn completed_accounts(&self) -> usize {
        self.accounts
            .iter()
            .filter(|a| a.outcome == AccountOutcome::Completed)
            .count()
    }
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pass #{}: {}/{} accounts completed | {} stars | {}s",
            self.pass_number,
            self.completed_accounts(),
            self.accounts.len(),
            self.totals.stars,
            (self.finished_at - self.started_at).num_seconds(),
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for MAJOR-BOT.
#[derive(Debug, thiserror::Error)]
pub enum MajorError {
    #[error("Transport error ({endpoint}): {message}")]
    Transport { endpoint: String, message: String },

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Unexpected response from {endpoint}: {message}")]
    Validation { endpoint: String, message: String },

    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
