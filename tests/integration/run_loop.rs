//! Whole-pass tests for the run loop.
//!
//! Drive `Runner` over several scripted accounts and check totals, pacing,
//! and that one account's failures never stop the rest.

use std::sync::Arc;
use std::time::Duration;

use major_bot::config::{PacingConfig, RewardsConfig};
use major_bot::console::{LineKind, StatusLine};
use major_bot::engine::pacing::Pause;
use major_bot::engine::processor::AccountProcessor;
use major_bot::engine::runner::Runner;
use major_bot::types::*;

use crate::mock_api::{task, Call, MockAccount, MockGameApi, RecordingPacer};

fn three_accounts() -> MockGameApi {
    let mut carol = MockAccount::new("Carol", 300, 20);
    carol.tasks = vec![task(1), task(2), task(3), task(4)];
    carol.completes = vec![1, 4];

    let mut bob = MockAccount::new("Bob", 200, 0);
    bob.wheel_award = None;

    MockGameApi::new(vec![
        ("cred-alice", MockAccount::new("Alice", 100, 10)),
        ("cred-bob", bob),
        ("cred-carol", carol),
    ])
}

fn credentials(raw: &[&str]) -> Vec<Credential> {
    raw.iter().map(|r| Credential::new(*r)).collect()
}

fn runner(api: Arc<MockGameApi>, pacer: Arc<RecordingPacer>, policy: RatingPolicy) -> Runner {
    let pacing = PacingConfig::default();
    let processor = AccountProcessor::new(api, RewardsConfig::default(), &pacing);
    Runner::new(processor, pacer, &pacing, policy)
}

fn aggregate_lines(lines: &[StatusLine]) -> Vec<&str> {
    lines
        .iter()
        .filter(|l| l.text.starts_with("Total balance"))
        .map(|l| l.text.as_str())
        .collect()
}

#[tokio::test]
async fn test_pass_totals_count_both_profile_fetches() {
    let api = Arc::new(three_accounts());
    let pacer = Arc::new(RecordingPacer::default());
    let runner = runner(api, pacer, RatingPolicy::EveryFetch);
    let creds = credentials(&["cred-alice", "cred-bob", "cred-carol"]);

    let mut lines = Vec::new();
    let report = runner.run_pass(1, &creds, &mut lines).await;

    // Ratings fetched twice each: 2 × (100 + 200 + 300), plus wheel 10 + 20.
    assert_eq!(report.totals.stars, 1230);
    assert_eq!(report.completed_accounts(), 3);

    let last = lines.last().unwrap();
    assert_eq!(last.kind, LineKind::Success);
    assert_eq!(last.text, "Total balance for all accounts: 1230 stars");
}

#[tokio::test]
async fn test_pass_totals_latest_only() {
    let api = Arc::new(three_accounts());
    let pacer = Arc::new(RecordingPacer::default());
    let runner = runner(api, pacer, RatingPolicy::LatestOnly);
    let creds = credentials(&["cred-alice", "cred-bob", "cred-carol"]);

    let mut lines = Vec::new();
    let report = runner.run_pass(1, &creds, &mut lines).await;

    assert_eq!(report.totals.stars, 630);
    assert_eq!(aggregate_lines(&lines), vec!["Total balance for all accounts: 630 stars"]);
}

#[tokio::test]
async fn test_account_gap_only_between_accounts() {
    let api = Arc::new(three_accounts());
    let pacer = Arc::new(RecordingPacer::default());
    let runner = runner(api, pacer.clone(), RatingPolicy::EveryFetch);
    let creds = credentials(&["cred-alice", "cred-bob", "cred-carol"]);

    runner.run_pass(1, &creds, &mut Vec::new()).await;

    let gaps: Vec<Pause> = pacer
        .pauses()
        .into_iter()
        .filter(|p| matches!(p, Pause::BetweenAccounts(_)))
        .collect();
    assert_eq!(gaps, vec![Pause::BetweenAccounts(Duration::from_secs(3)); 2]);

    // The last pause of the pass is a task gap inside Carol's run, not an
    // account gap.
    assert!(matches!(pacer.pauses().last(), Some(Pause::BetweenTasks(_))));
}

#[tokio::test]
async fn test_single_account_has_no_gap() {
    let api = Arc::new(three_accounts());
    let pacer = Arc::new(RecordingPacer::default());
    let runner = runner(api, pacer.clone(), RatingPolicy::EveryFetch);

    runner
        .run_pass(1, &credentials(&["cred-alice"]), &mut Vec::new())
        .await;

    assert!(pacer.pauses().is_empty());
}

#[tokio::test]
async fn test_empty_account_list() {
    let api = Arc::new(three_accounts());
    let pacer = Arc::new(RecordingPacer::default());
    let runner = runner(api.clone(), pacer.clone(), RatingPolicy::EveryFetch);

    let mut lines = Vec::new();
    let report = runner.run_pass(1, &[], &mut lines).await;

    assert_eq!(report.totals, RunTotals::default());
    assert!(report.accounts.is_empty());
    assert!(api.calls().is_empty());
    assert!(pacer.pauses().is_empty());
    assert_eq!(aggregate_lines(&lines), vec!["Total balance for all accounts: 0 stars"]);
}

#[tokio::test]
async fn test_failed_login_does_not_stop_batch() {
    let api = Arc::new(three_accounts());
    let pacer = Arc::new(RecordingPacer::default());
    let runner = runner(api.clone(), pacer.clone(), RatingPolicy::EveryFetch);
    let creds = credentials(&["cred-alice", "garbage", "cred-carol"]);

    let mut lines = Vec::new();
    let report = runner.run_pass(1, &creds, &mut lines).await;

    assert_eq!(report.accounts[1].outcome, AccountOutcome::AuthFailed);
    assert_eq!(report.accounts[2].outcome, AccountOutcome::Completed);
    // Alice 2×100 + 10, Carol 2×300 + 20.
    assert_eq!(report.totals.stars, 830);
    assert!(lines
        .iter()
        .any(|l| l.kind == LineKind::Error && l.text.starts_with("Unable to authenticate account 2")));
    // Gaps still surround the failed account.
    let gaps = pacer
        .pauses()
        .into_iter()
        .filter(|p| matches!(p, Pause::BetweenAccounts(_)))
        .count();
    assert_eq!(gaps, 2);
}

#[tokio::test]
async fn test_transport_failure_on_one_action_keeps_going() {
    let api = Arc::new(three_accounts());
    api.fail("roulette");
    api.fail("tasks");
    let pacer = Arc::new(RecordingPacer::default());
    let runner = runner(api.clone(), pacer, RatingPolicy::EveryFetch);
    let creds = credentials(&["cred-alice", "cred-bob", "cred-carol"]);

    let mut lines = Vec::new();
    let report = runner.run_pass(1, &creds, &mut lines).await;

    // No wheel awards, but every balance fetched twice.
    assert_eq!(report.totals.stars, 1200);
    assert!(report.accounts.iter().all(|a| a.outcome == AccountOutcome::Completed));
    assert!(report.accounts.iter().all(|a| a.tasks.is_none()));

    let holds = api
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::HoldCoins(_)))
        .count();
    assert_eq!(holds, 3);
    assert_eq!(
        lines.iter().filter(|l| l.text == "Roulette: Failed").count(),
        3
    );
}

#[tokio::test]
async fn test_swipe_submission_only_when_eligible_and_in_range() {
    let mut ineligible = MockAccount::new("Dave", 50, 1);
    ineligible.swipe_eligible = false;
    let api = Arc::new(MockGameApi::new(vec![
        ("cred-alice", MockAccount::new("Alice", 100, 10)),
        ("cred-dave", ineligible),
    ]));
    let pacer = Arc::new(RecordingPacer::default());
    let runner = runner(api.clone(), pacer, RatingPolicy::EveryFetch);

    runner
        .run_pass(1, &credentials(&["cred-alice", "cred-dave"]), &mut Vec::new())
        .await;

    let calls = api.calls();
    let submits: Vec<u32> = calls
        .iter()
        .filter_map(|c| match c {
            Call::SwipeSubmit(coins) => Some(*coins),
            _ => None,
        })
        .collect();
    assert_eq!(submits.len(), 1);
    assert!((1000..=1300).contains(&submits[0]));

    // Dave's probe is the last swipe-related call and nothing follows it.
    let dave_start = calls
        .iter()
        .position(|c| *c == Call::Auth("cred-dave".to_string()))
        .unwrap();
    assert!(!calls[dave_start..]
        .iter()
        .any(|c| matches!(c, Call::SwipeSubmit(_))));

    for call in &calls {
        if let Call::HoldCoins(coins) = call {
            assert!((900..=950).contains(coins));
        }
    }
}

#[tokio::test]
async fn test_task_tally() {
    let api = Arc::new(three_accounts());
    let pacer = Arc::new(RecordingPacer::default());
    let runner = runner(api, pacer, RatingPolicy::EveryFetch);

    let mut lines = Vec::new();
    let report = runner
        .run_pass(1, &credentials(&["cred-carol"]), &mut lines)
        .await;

    assert_eq!(report.accounts[0].tasks, Some(TaskTally { completed: 2, total: 4 }));
    assert!(lines.iter().any(|l| l.text == "Tasks: Completed 2/4"));
}

#[tokio::test]
async fn test_run_loop_resets_totals_and_idles_between_passes() {
    let api = Arc::new(three_accounts());
    let notify = Arc::new(tokio::sync::Notify::new());
    let pacer = Arc::new(RecordingPacer::stopping_after(2, notify.clone()));
    let runner = runner(api, pacer.clone(), RatingPolicy::EveryFetch);
    let creds = credentials(&["cred-alice", "cred-bob"]);

    let mut lines = Vec::new();
    let shutdown = async move { notify.notified().await };
    let passes = runner.run(&creds, &mut lines, shutdown).await;

    assert_eq!(passes, 2);
    // Alice 2×100 + 10, Bob 2×200 on cooldown. Same every pass.
    assert_eq!(
        aggregate_lines(&lines),
        vec![
            "Total balance for all accounts: 610 stars",
            "Total balance for all accounts: 610 stars",
        ]
    );

    let idles: Vec<Pause> = pacer
        .pauses()
        .into_iter()
        .filter(|p| matches!(p, Pause::NextPass(_)))
        .collect();
    assert_eq!(idles, vec![Pause::NextPass(Duration::from_secs(28_850)); 2]);
}
