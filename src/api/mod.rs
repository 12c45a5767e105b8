//! Major game API integration.
//!
//! Defines the `GameApi` trait the account processor drives, the
//! reqwest-backed `MajorClient` implementation, and the response decoders
//! that turn raw JSON into typed results.

pub mod client;
pub mod decode;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{ActionResult, Credential, Session, Streak, Task, UserInfo, Visit};

/// Abstraction over the remote reward-game service.
///
/// `Err` means the call itself failed (transport, non-JSON body, or a
/// response that could not be interpreted at all). Cooldowns and refusals
/// are not errors: they come back as `ActionResult::Blocked` / `Failed`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameApi: Send + Sync {
    /// Exchange init data for a session. Fails unless the response carries
    /// both a token and a complete user identity.
    async fn authenticate(&self, credential: &Credential) -> Result<Session>;

    /// Fetch the logged-in user's profile.
    async fn user_info(&self, session: &Session) -> Result<UserInfo>;

    /// Current check-in streak.
    async fn streak(&self, session: &Session) -> Result<Streak>;

    /// Record today's visit.
    async fn visit(&self, session: &Session) -> Result<ActionResult<Visit>>;

    /// Spin the bonus wheel. Success carries the star award.
    async fn spin_roulette(&self, session: &Session) -> Result<ActionResult<u64>>;

    /// Claim passive coins.
    async fn hold_coins(&self, session: &Session, coins: u32) -> Result<ActionResult<()>>;

    /// Ask whether a swipe-coin round may be submitted.
    async fn swipe_coin_probe(&self, session: &Session) -> Result<bool>;

    /// Submit a swipe-coin round.
    async fn swipe_coin_submit(&self, session: &Session, coins: u32) -> Result<ActionResult<()>>;

    /// List one-off (non-daily) tasks.
    async fn tasks(&self, session: &Session) -> Result<Vec<Task>>;

    /// Submit a task for completion. Success means the server reports it
    /// completed.
    async fn complete_task(&self, session: &Session, task: &Task) -> Result<ActionResult<()>>;

    /// Service name for logging.
    fn name(&self) -> &str;
}
