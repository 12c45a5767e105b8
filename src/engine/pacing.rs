//! Scheduled pauses.
//!
//! Every fixed delay in a pass goes through a `Pacer`: the gap between task
//! submissions, the countdown between accounts, and the long idle before the
//! next pass. Pauses are not cancellable once started.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::console;

/// A fixed delay the run loop asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pause {
    /// Between two task completion submissions.
    BetweenTasks(Duration),
    /// Between two accounts of the same pass.
    BetweenAccounts(Duration),
    /// After a pass, before the next one.
    NextPass(Duration),
}

impl Pause {
    pub fn duration(&self) -> Duration {
        match self {
            Pause::BetweenTasks(d) | Pause::BetweenAccounts(d) | Pause::NextPass(d) => *d,
        }
    }

    /// Account and pass pauses show a countdown; task pacing is silent.
    pub fn shows_countdown(&self) -> bool {
        !matches!(self, Pause::BetweenTasks(_))
    }
}

#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, pause: Pause);
}

/// Sleeps on the tokio timer, redrawing a countdown once per second.
#[derive(Debug, Default, Clone)]
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, pause: Pause) {
        debug!(pause = ?pause, "Pausing");
        if pause.shows_countdown() {
            countdown(pause.duration()).await;
        } else {
            tokio::time::sleep(pause.duration()).await;
        }
    }
}

/// Count down whole seconds from `total` to zero, one frame per tick.
async fn countdown(total: Duration) {
    let secs = total.as_secs();
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    for remaining in (0..=secs).rev() {
        ticker.tick().await;
        console::render_countdown(remaining);
    }
    console::clear_countdown();
}
