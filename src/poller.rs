//! Polls a submission until the judge reports a terminal status.
//!
//! The first request goes out one interval after start, then one per
//! interval. A failed request ends polling; there is no retry.

use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::api::{JudgeApi, SubmissionId, SubmissionStatus};
use crate::error::{ClientError, Result};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Reported after every non-terminal reply.
#[derive(Debug, Clone, PartialEq)]
pub struct PollProgress {
    pub attempt: u32,
    pub description: String,
}

impl PollProgress {
    pub fn message(&self) -> String {
        let description = if self.description.is_empty() {
            "Pending"
        } else {
            self.description.as_str()
        };
        format!(
            "Waiting for results... {} (poll {})",
            description, self.attempt
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StatusPoller {
    interval: Duration,
    timeout: Option<Duration>,
}

impl StatusPoller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            timeout: None,
        }
    }

    /// Upper bound on the whole poll. `None` polls until a verdict arrives.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn run<F>(
        &self,
        api: &dyn JudgeApi,
        id: &SubmissionId,
        cancel: CancellationToken,
        mut on_progress: F,
    ) -> Result<SubmissionStatus>
    where
        F: FnMut(PollProgress) + Send,
    {
        let started = Instant::now();
        let deadline = self.timeout.map(|t| started + t);
        let timed_out = || ClientError::PollTimedOut(self.timeout.unwrap_or_default().as_secs());

        let mut ticker = time::interval_at(started + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut attempt = 0u32;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ClientError::PollCancelled),
                _ = sleep_until(deadline) => return Err(timed_out()),
                _ = ticker.tick() => {}
            }

            attempt += 1;
            tracing::debug!(submission_id = %id, attempt, "polling submission status");

            let reply = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ClientError::PollCancelled),
                _ = sleep_until(deadline) => return Err(timed_out()),
                reply = api.fetch_status(id) => reply,
            };

            let status = match reply {
                Ok(status) => status,
                Err(err) => {
                    tracing::error!(submission_id = %id, attempt, error = %err, "status poll failed");
                    return Err(err);
                }
            };

            if !status.is_pending() {
                tracing::info!(
                    submission_id = %id,
                    attempt,
                    status = %status.status.description,
                    "submission reached a terminal status"
                );
                return Ok(status);
            }

            on_progress(PollProgress {
                attempt,
                description: status.status.description.clone(),
            });
        }
    }
}

impl Default for StatusPoller {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::scripted::{status, Scripted, ScriptedJudge};
    use assert_matches::assert_matches;

    fn accepted(time: f64, memory: f64) -> SubmissionStatus {
        let mut s = status(3, "Accepted");
        s.time = Some(time);
        s.memory = Some(memory);
        s
    }

    #[tokio::test(start_paused = true)]
    async fn stops_on_first_terminal_status() {
        let judge = ScriptedJudge::new();
        judge.push_status(Scripted::Reply(status(0, "In Queue")));
        judge.push_status(Scripted::Reply(status(0, "Processing")));
        judge.push_status(Scripted::Reply(accepted(12.0, 1024.0)));
        judge.push_status(Scripted::Reply(status(4, "Wrong Answer")));

        let mut progress = Vec::new();
        let started = Instant::now();
        let result = StatusPoller::default()
            .run(&judge, &"42".into(), CancellationToken::new(), |p| {
                progress.push(p)
            })
            .await
            .unwrap();

        assert_eq!(result.status.description, "Accepted");
        assert_eq!(result.time, Some(12.0));
        assert_eq!(result.memory, Some(1024.0));
        assert_eq!(judge.status_calls(), 3);
        assert_eq!(progress.len(), 2);
        assert_eq!(progress[1].attempt, 2);
        assert_eq!(started.elapsed(), Duration::from_millis(6000));
    }

    #[tokio::test(start_paused = true)]
    async fn first_request_waits_one_interval() {
        let judge = ScriptedJudge::new();
        judge.push_status(Scripted::Reply(status(6, "Compilation Error")));

        let started = Instant::now();
        StatusPoller::new(Duration::from_millis(500))
            .run(&judge, &"1".into(), CancellationToken::new(), |_| {})
            .await
            .unwrap();
        assert_eq!(started.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn request_failure_halts_polling() {
        let judge = ScriptedJudge::new();
        judge.push_status(Scripted::Reply(status(0, "In Queue")));
        judge.push_status(Scripted::Fail(502, "bad gateway".into()));
        judge.push_status(Scripted::Reply(accepted(1.0, 1.0)));

        let result = StatusPoller::default()
            .run(&judge, &"7".into(), CancellationToken::new(), |_| {})
            .await;
        assert_matches!(result, Err(ClientError::Http { status: 502, .. }));
        assert_eq!(judge.status_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_polling() {
        let judge = ScriptedJudge::new();
        let cancel = CancellationToken::new();
        let child = cancel.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(4500)).await;
            child.cancel();
        });

        let result = StatusPoller::default()
            .run(&judge, &"9".into(), cancel, |_| {})
            .await;
        assert_matches!(result, Err(ClientError::PollCancelled));
        assert_eq!(judge.status_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn overall_timeout_ends_a_stuck_poll() {
        let judge = ScriptedJudge::new();
        let result = StatusPoller::default()
            .with_timeout(Some(Duration::from_secs(5)))
            .run(&judge, &"9".into(), CancellationToken::new(), |_| {})
            .await;
        assert_matches!(result, Err(ClientError::PollTimedOut(5)));
        assert_eq!(judge.status_calls(), 2);
    }

    #[test]
    fn progress_message_names_the_attempt() {
        let p = PollProgress {
            attempt: 3,
            description: "In Queue".into(),
        };
        assert_eq!(p.message(), "Waiting for results... In Queue (poll 3)");
    }
}
