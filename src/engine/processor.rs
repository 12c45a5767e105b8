//! Account processor: one account through login and every daily action.
//!
//! Sequence: authenticate → profile → streak → check-in → roulette →
//! hold coins → swipe coin → tasks → profile again. Each step prints one
//! status line. A failed login or initial profile fetch ends the account;
//! any other failure only affects its own step.

use rand::Rng;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::pacing::{Pacer, Pause};
use crate::api::GameApi;
use crate::config::{PacingConfig, RewardsConfig};
use crate::console::{format_blocked_time, LineKind, StatusLine, StatusSink};
use crate::types::{
    AccountOutcome, AccountReport, ActionResult, Credential, Failure, Session, TaskTally, UserInfo,
};

pub struct AccountProcessor {
    api: Arc<dyn GameApi>,
    rewards: RewardsConfig,
    task_delay: Duration,
}

impl AccountProcessor {
    pub fn new(api: Arc<dyn GameApi>, rewards: RewardsConfig, pacing: &PacingConfig) -> Self {
        Self {
            api,
            rewards,
            task_delay: pacing.task_delay(),
        }
    }

    pub fn api_name(&self) -> &str {
        self.api.name()
    }

    /// Run the daily sequence for the account at `index` (zero-based).
    ///
    /// Never fails: every error is logged, printed, and folded into the
    /// returned report.
    pub async fn process(
        &self,
        index: usize,
        credential: &Credential,
        pacer: &dyn Pacer,
        sink: &mut dyn StatusSink,
    ) -> AccountReport {
        let number = index + 1;
        let mut report = AccountReport::new(index);

        let session = match self.api.authenticate(credential).await {
            Ok(session) => session,
            Err(e) => {
                error!(account = number, error = %e, "Authentication failed");
                say(sink, LineKind::Error, format!("Unable to authenticate account {number}: {e}"));
                return report;
            }
        };

        info!(account = number, user_id = %session.user_id, "Authenticated");
        report.display_name = Some(session.display_name.clone());
        say(
            sink,
            LineKind::Account,
            format!("[ Account {number} | {} ]", session.display_name),
        );

        let Some(profile) = self.fetch_profile(&session, &mut report).await else {
            say(
                sink,
                LineKind::Error,
                format!("Error processing account {number}: Failed to get user info"),
            );
            report.outcome = AccountOutcome::ProfileUnavailable;
            return report;
        };
        say(sink, LineKind::Info, format!("Stars: {}", profile.rating));

        let streak = match self.api.streak(&session).await {
            Ok(s) => s.streak.to_string(),
            Err(e) => {
                error!(account = number, error = %e, "Streak lookup failed");
                "N/A".to_string()
            }
        };
        say(sink, LineKind::Info, format!("Streak: {streak} days"));

        self.check_in(&session, sink).await;
        report.wheel_award = self.spin_roulette(&session, sink).await;
        self.hold_coins(&session, sink).await;
        self.swipe_coin(&session, sink).await;
        report.tasks = self.complete_tasks(&session, pacer, sink).await;

        // Latest balance. Counts toward the pass total again.
        self.fetch_profile(&session, &mut report).await;

        report.outcome = AccountOutcome::Completed;
        debug!(
            account = number,
            ratings = ?report.ratings,
            wheel_award = report.wheel_award,
            "Account processed"
        );
        report
    }

    /// Fetch the profile and record its rating on success.
    async fn fetch_profile(&self, session: &Session, report: &mut AccountReport) -> Option<UserInfo> {
        match self.api.user_info(session).await {
            Ok(info) => {
                report.ratings.push(info.rating);
                Some(info)
            }
            Err(e) => {
                error!(user_id = %session.user_id, error = %e, "Profile fetch failed");
                None
            }
        }
    }

    async fn check_in(&self, session: &Session, sink: &mut dyn StatusSink) {
        let result = settle("visit", self.api.visit(session).await);
        let line = describe("Check-in", &result, |visit| {
            if visit.is_increased {
                StatusLine::new(LineKind::Success, format!("Check-in: Success (Day {})", visit.streak))
            } else {
                StatusLine::new(
                    LineKind::Warning,
                    format!("Check-in: Already done (Day {})", visit.streak),
                )
            }
        });
        sink.emit(line);
    }

    /// Returns the stars won, zero unless the spin succeeded.
    async fn spin_roulette(&self, session: &Session, sink: &mut dyn StatusSink) -> u64 {
        let result = settle("roulette", self.api.spin_roulette(session).await);
        sink.emit(describe("Roulette", &result, |award| {
            StatusLine::new(LineKind::Success, format!("Roulette: +{award} stars"))
        }));
        result.success().unwrap_or(0)
    }

    async fn hold_coins(&self, session: &Session, sink: &mut dyn StatusSink) {
        let coins = draw_coins(self.rewards.hold_coins());
        debug!(coins, "Submitting hold coins");
        let result = settle("hold_coins", self.api.hold_coins(session, coins).await);
        sink.emit(describe("Hold Coins", &result, |_| {
            StatusLine::new(LineKind::Success, "Hold Coins: Success")
        }));
    }

    /// Probe first; submit only when the probe grants a round.
    async fn swipe_coin(&self, session: &Session, sink: &mut dyn StatusSink) {
        let result = match self.api.swipe_coin_probe(session).await {
            Ok(true) => {
                let coins = draw_coins(self.rewards.swipe_coins());
                debug!(coins, "Submitting swipe coin");
                settle("swipe_coin", self.api.swipe_coin_submit(session, coins).await)
            }
            Ok(false) => ActionResult::Failed(Failure::Ineligible),
            Err(e) => settle::<()>("swipe_coin_probe", Err(e)),
        };
        sink.emit(describe("Swipe Coin", &result, |_| {
            StatusLine::new(LineKind::Success, "Swipe Coin: Success")
        }));
    }

    /// Submit every listed task in order, pausing between submissions.
    async fn complete_tasks(
        &self,
        session: &Session,
        pacer: &dyn Pacer,
        sink: &mut dyn StatusSink,
    ) -> Option<TaskTally> {
        let tasks = match self.api.tasks(session).await {
            Ok(tasks) => tasks,
            Err(e) => {
                error!(error = %e, "Task list fetch failed");
                say(sink, LineKind::Error, "Tasks: Failed to retrieve");
                return None;
            }
        };

        let mut tally = TaskTally {
            completed: 0,
            total: tasks.len(),
        };

        for (i, task) in tasks.iter().enumerate() {
            if i > 0 {
                pacer.pause(Pause::BetweenTasks(self.task_delay)).await;
            }
            let result = settle("complete_task", self.api.complete_task(session, task).await);
            if result.is_success() {
                tally.completed += 1;
            } else {
                debug!(task_id = task.id, title = ?task.title, result = ?result, "Task not completed");
            }
        }

        say(
            sink,
            LineKind::Info,
            format!("Tasks: Completed {}/{}", tally.completed, tally.total),
        );
        Some(tally)
    }
}

fn say(sink: &mut dyn StatusSink, kind: LineKind, text: impl Into<String>) {
    sink.emit(StatusLine::new(kind, text));
}

/// Uniform draw from an inclusive range.
fn draw_coins(range: RangeInclusive<u32>) -> u32 {
    rand::thread_rng().gen_range(range)
}

/// Collapse a call error into a transport failure, logging it.
fn settle<T>(action: &str, result: anyhow::Result<ActionResult<T>>) -> ActionResult<T> {
    match result {
        Ok(r) => r,
        Err(e) => {
            error!(action, error = %e, "Request failed");
            ActionResult::Failed(Failure::Transport(e.to_string()))
        }
    }
}

/// Status line for an action result; `on_success` renders the success case.
fn describe<T>(
    label: &str,
    result: &ActionResult<T>,
    on_success: impl FnOnce(&T) -> StatusLine,
) -> StatusLine {
    match result {
        ActionResult::Success(t) => on_success(t),
        ActionResult::Blocked(until) => {
            warn!(action = label, until = %until, "Action blocked");
            StatusLine::new(
                LineKind::Warning,
                format!("{label}: Blocked until {}", format_blocked_time(*until)),
            )
        }
        ActionResult::Failed(reason) => {
            if !matches!(reason, Failure::Transport(_)) {
                warn!(action = label, reason = %reason, "Action failed");
            }
            StatusLine::new(LineKind::Error, format!("{label}: Failed"))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
