//! Bounded-interval polling for asynchronous remote operations
//!
//! Stack mutations and cache invalidations complete asynchronously on the
//! provider side. [`poll_status`] turns that into a blocking wait with a
//! fixed set of outcomes: a classifier maps each observed status to pending,
//! success or failure, and the loop stops on the first terminal verdict.
//! Fetch errors are fatal rather than retried; only "still in progress"
//! keeps the loop alive.

use std::future::Future;
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};

/// Classification of one observed status value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Not terminal, keep polling
    Pending,
    /// Success terminal state
    Success,
    /// Failure terminal state
    Failure,
}

/// Why a poll stopped without reaching a success status.
#[derive(Debug)]
pub enum PollError<S, E> {
    /// A status fetch failed; transport errors are not retried
    Fetch(E),
    /// The status reached a failure-class terminal value
    Terminal(S),
    /// The deadline elapsed before any terminal status was observed
    DeadlineExceeded,
}

/// Fetch a status every `interval` until `classify` reports a terminal
/// verdict or `deadline` passes.
///
/// The first fetch happens one full interval after the call, not
/// immediately: the operations polled here never finish instantly.
pub async fn poll_status<S, E, F, Fut, C>(
    interval: Duration,
    deadline: Instant,
    mut fetch: F,
    classify: C,
) -> Result<S, PollError<S, E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<S, E>>,
    C: Fn(&S) -> Verdict,
{
    let wait = async {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of a tokio interval completes immediately; consume
        // it so the first fetch waits a full period.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let status = fetch().await.map_err(PollError::Fetch)?;
            match classify(&status) {
                Verdict::Pending => continue,
                Verdict::Success => return Ok(status),
                Verdict::Failure => return Err(PollError::Terminal(status)),
            }
        }
    };

    match time::timeout_at(deadline, wait).await {
        Ok(result) => result,
        Err(_) => Err(PollError::DeadlineExceeded),
    }
}
