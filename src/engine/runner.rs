//! Run loop: every account, then the aggregate, then a long idle.
//!
//! Totals are folded from the per-account reports of a single pass and
//! start from zero on every pass.

use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::pacing::{Pacer, Pause};
use super::processor::AccountProcessor;
use crate::config::PacingConfig;
use crate::console::{LineKind, StatusLine, StatusSink};
use crate::types::{Credential, PassReport, RatingPolicy, RunTotals};

pub struct Runner {
    processor: AccountProcessor,
    pacer: Arc<dyn Pacer>,
    account_gap: Duration,
    pass_interval: Duration,
    rating_policy: RatingPolicy,
}

impl Runner {
    pub fn new(
        processor: AccountProcessor,
        pacer: Arc<dyn Pacer>,
        pacing: &PacingConfig,
        rating_policy: RatingPolicy,
    ) -> Self {
        Self {
            processor,
            pacer,
            account_gap: pacing.account_gap(),
            pass_interval: pacing.pass_interval(),
            rating_policy,
        }
    }

    /// Process every account once, in order, and print the aggregate.
    pub async fn run_pass(
        &self,
        pass_number: u64,
        credentials: &[Credential],
        sink: &mut dyn StatusSink,
    ) -> PassReport {
        let started_at = Utc::now();
        info!(
            pass = pass_number,
            accounts = credentials.len(),
            api = self.processor.api_name(),
            "Starting pass"
        );

        let mut totals = RunTotals::default();
        let mut accounts = Vec::with_capacity(credentials.len());

        for (index, credential) in credentials.iter().enumerate() {
            let report = self
                .processor
                .process(index, credential, self.pacer.as_ref(), sink)
                .await;
            totals.absorb(&report, self.rating_policy);
            accounts.push(report);

            if index + 1 < credentials.len() {
                self.pacer.pause(Pause::BetweenAccounts(self.account_gap)).await;
            }
        }

        sink.emit(StatusLine::new(
            LineKind::Success,
            format!("Total balance for all accounts: {} stars", totals.stars),
        ));

        PassReport {
            pass_number,
            accounts,
            totals,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Wait out the interval before the next pass.
    pub async fn idle(&self) {
        info!(secs = self.pass_interval.as_secs(), "Waiting for next pass");
        self.pacer.pause(Pause::NextPass(self.pass_interval)).await;
    }

    /// Alternate passes and idles until `shutdown` resolves. Returns the
    /// number of passes that ran to completion.
    pub async fn run<F>(
        &self,
        credentials: &[Credential],
        sink: &mut dyn StatusSink,
        shutdown: F,
    ) -> u64
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut completed = 0;

        loop {
            tokio::select! {
                report = self.run_pass(completed + 1, credentials, sink) => {
                    log_pass_report(&report);
                    completed += 1;
                }
                _ = &mut shutdown => {
                    info!(completed, "Shutdown signal received.");
                    return completed;
                }
            }

            tokio::select! {
                _ = self.idle() => {}
                _ = &mut shutdown => {
                    info!(completed, "Shutdown signal received.");
                    return completed;
                }
            }
        }
    }
}

fn log_pass_report(report: &PassReport) {
    info!(
        pass = report.pass_number,
        accounts = report.accounts.len(),
        completed = report.completed_accounts(),
        stars = report.totals.stars,
        duration_secs = (report.finished_at - report.started_at).num_seconds(),
        "Pass complete"
    );
}
