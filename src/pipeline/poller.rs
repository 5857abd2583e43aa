//! Completion polling
//!
//! ```text
//! RUNNING --(deadline passed)--> TIMED_OUT
//! RUNNING --(terminal payload)--> DONE
//! RUNNING --(sleep interval)--> RUNNING
//! ```
//!
//! The deadline is checked before each status query, never during one: a
//! request in flight when the deadline passes still completes, but no further
//! request is issued.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::api::{ExecutionApi, ExecutionHandle, ExecutionStatus};
use crate::error::{BridgeError, Result};

/// Time source and sleep primitive used by the poll loop
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by tokio timers
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Simulated clock: `sleep` returns immediately and advances `now`
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
        }
    }

    /// Time advanced so far
    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn advance(&self, duration: Duration) {
        let mut elapsed = self.elapsed.lock().unwrap_or_else(|e| e.into_inner());
        *elapsed += duration;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

/// Interval and deadline of one poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(600),
        }
    }
}

#[derive(Debug)]
enum PollState {
    Running { attempt: u32 },
    Done(ExecutionStatus),
    TimedOut,
}

/// Query status until the payload is terminal or the deadline passes.
///
/// `on_poll` sees every payload, terminal or not, with its 1-based attempt
/// number. A failed or errored remote execution is still a terminal payload
/// and is returned as `Ok`; callers inspect it.
pub async fn poll_until_complete<F>(
    api: &dyn ExecutionApi,
    handle: &ExecutionHandle,
    settings: PollSettings,
    clock: &dyn Clock,
    on_poll: F,
) -> Result<ExecutionStatus>
where
    F: FnMut(u32, &ExecutionStatus) + Send,
{
    poll_since(api, handle, settings, clock, clock.now(), on_poll).await
}

/// Same as [`poll_until_complete`], with the deadline measured from `started`
/// (typically the moment the execution was submitted).
pub async fn poll_since<F>(
    api: &dyn ExecutionApi,
    handle: &ExecutionHandle,
    settings: PollSettings,
    clock: &dyn Clock,
    started: Instant,
    mut on_poll: F,
) -> Result<ExecutionStatus>
where
    F: FnMut(u32, &ExecutionStatus) + Send,
{
    let variant = api.variant();
    let mut state = PollState::Running { attempt: 0 };

    loop {
        state = match state {
            PollState::Running { attempt } => {
                let elapsed = clock.now().saturating_duration_since(started);
                if elapsed > settings.timeout {
                    PollState::TimedOut
                } else {
                    let attempt = attempt + 1;
                    let status = api.status(handle).await?;
                    on_poll(attempt, &status);

                    if status.is_terminal(variant) {
                        PollState::Done(status)
                    } else {
                        debug!(
                            execution_id = %handle,
                            attempt,
                            elapsed_ms = elapsed.as_millis() as u64,
                            "Execution still running"
                        );
                        clock.sleep(settings.interval).await;
                        PollState::Running { attempt }
                    }
                }
            }
            PollState::Done(status) => {
                debug!(execution_id = %handle, status = ?status.status(), "Execution reached terminal state");
                return Ok(status);
            }
            PollState::TimedOut => {
                warn!(execution_id = %handle, timeout = ?settings.timeout, "Polling deadline exceeded");
                return Err(BridgeError::Timeout {
                    timeout: settings.timeout,
                });
            }
        };
    }
}
