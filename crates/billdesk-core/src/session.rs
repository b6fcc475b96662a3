// ── Voice call sessions ──
//
// A `CallSession` is the client-side timer behind a live voice call. It
// counts whole seconds while active and hands the final count back for
// settlement as a voice-call transaction. Nothing is sent to the backend
// until the session ends.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use strum::Display;
use tokio::sync::watch;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info};

use crate::error::CoreError;
use crate::model::{Msisdn, Subscriber};

/// Lifecycle of a session instance. `Ended` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
pub enum CallState {
    Idle,
    Active,
    Ended,
}

/// Snapshot of the call clock, as published to watchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallClock {
    pub active: bool,
    pub elapsed_secs: u64,
}

/// Final result of a session, ready for settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallSummary {
    pub caller: Msisdn,
    pub callee: Msisdn,
    pub elapsed_secs: u64,
}

pub struct CallSession {
    caller: Msisdn,
    callee: Msisdn,
    state: CallState,
    clock: Arc<watch::Sender<CallClock>>,
    ticker: Option<DropGuard>,
}

impl CallSession {
    pub fn new(caller: Msisdn, callee: Msisdn) -> Self {
        Self {
            caller,
            callee,
            state: CallState::Idle,
            clock: Arc::new(watch::channel(CallClock::default()).0),
            ticker: None,
        }
    }

    pub fn caller(&self) -> &Msisdn {
        &self.caller
    }

    pub fn callee(&self) -> &Msisdn {
        &self.callee
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.clock.borrow().elapsed_secs
    }

    /// Follow the clock while the call runs.
    pub fn subscribe(&self) -> watch::Receiver<CallClock> {
        self.clock.subscribe()
    }

    /// Begin counting. Only valid from `Idle`; requires a tokio runtime.
    pub fn start(&mut self) -> Result<(), CoreError> {
        if self.state != CallState::Idle {
            return Err(self.invalid_state("start"));
        }
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| CoreError::Internal(format!("call timer needs a tokio runtime: {e}")))?;

        self.clock.send_replace(CallClock {
            active: true,
            elapsed_secs: 0,
        });

        let cancel = CancellationToken::new();
        handle.spawn(tick_task(
            Arc::clone(&self.clock),
            Duration::from_secs(1),
            cancel.clone(),
        ));
        self.ticker = Some(cancel.drop_guard());
        self.state = CallState::Active;

        info!(caller = %self.caller, callee = %self.callee, "call started");
        Ok(())
    }

    /// Advance the clock by one second. No-op unless `Active`.
    pub fn tick(&self) {
        tick(&self.clock);
    }

    /// Stop counting and return the final elapsed time. Only valid from `Active`.
    pub fn end(&mut self) -> Result<CallSummary, CoreError> {
        if self.state != CallState::Active {
            return Err(self.invalid_state("end"));
        }

        // Freeze first so a tick racing the cancellation cannot land.
        self.clock.send_modify(|c| c.active = false);
        self.ticker = None;
        self.state = CallState::Ended;

        let summary = CallSummary {
            caller: self.caller.clone(),
            callee: self.callee.clone(),
            elapsed_secs: self.elapsed_secs(),
        };
        info!(
            caller = %summary.caller,
            callee = %summary.callee,
            elapsed = summary.elapsed_secs,
            "call ended"
        );
        Ok(summary)
    }

    fn invalid_state(&self, action: &str) -> CoreError {
        CoreError::InvalidCallState {
            action: action.into(),
            state: self.state.to_string(),
        }
    }
}

impl Drop for CallSession {
    fn drop(&mut self) {
        if self.ticker.take().is_some() {
            debug!(caller = %self.caller, "call session dropped while active");
        }
    }
}

impl std::fmt::Debug for CallSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallSession")
            .field("caller", &self.caller)
            .field("callee", &self.callee)
            .field("state", &self.state)
            .field("elapsed_secs", &self.elapsed_secs())
            .finish_non_exhaustive()
    }
}

// ── Clock ───────────────────────────────────────────────────────────

fn tick(clock: &watch::Sender<CallClock>) {
    clock.send_if_modified(|c| {
        if c.active {
            c.elapsed_secs += 1;
        }
        c.active
    });
}

async fn tick_task(clock: Arc<watch::Sender<CallClock>>, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => tick(&clock),
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Balance gate checked once before a call may start. The threshold never
/// drops below zero, so an empty or negative balance is always refused.
pub fn check_call_balance(subscriber: &Subscriber, threshold: f64) -> Result<(), CoreError> {
    if subscriber.can_afford(threshold.max(0.0)) {
        Ok(())
    } else {
        Err(CoreError::InsufficientBalance {
            msisdn: subscriber.msisdn.to_string(),
            balance: subscriber.balance,
        })
    }
}

/// Render elapsed seconds as `MM:SS`. Minutes keep growing past 59.
pub fn format_elapsed(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn session() -> CallSession {
        CallSession::new(
            Msisdn::parse("250788000001").unwrap(),
            Msisdn::parse("250788000002").unwrap(),
        )
    }

    fn subscriber(balance: f64) -> Subscriber {
        Subscriber {
            msisdn: Msisdn::parse("250788000001").unwrap(),
            user_id: Some(1),
            name: "Ana".into(),
            balance,
            nin: None,
            is_active: true,
            spn: None,
            imsi: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn counts_whole_seconds_while_active() {
        let mut s = session();
        s.start().unwrap();
        tokio::time::sleep(Duration::from_millis(3500)).await;

        let summary = s.end().unwrap();
        assert_eq!(summary.elapsed_secs, 3);
        assert_eq!(s.state(), CallState::Ended);
    }

    #[tokio::test(start_paused = true)]
    async fn frozen_after_end() {
        let mut s = session();
        s.start().unwrap();
        tokio::time::sleep(Duration::from_millis(2100)).await;
        s.end().unwrap();

        tokio::time::sleep(Duration::from_secs(5)).await;
        s.tick();
        assert_eq!(s.elapsed_secs(), 2);
    }

    #[test]
    fn tick_before_start_is_noop() {
        let s = session();
        s.tick();
        s.tick();
        assert_eq!(s.elapsed_secs(), 0);
        assert_eq!(s.state(), CallState::Idle);
    }

    #[test]
    fn idle_ticks_wake_no_watcher() {
        let s = session();
        let mut rx = s.subscribe();
        let mut changed = tokio_test::task::spawn(rx.changed());
        s.tick();
        tokio_test::assert_pending!(changed.poll());
        assert!(!changed.is_woken());
    }

    #[tokio::test(start_paused = true)]
    async fn manual_ticks_count_while_active() {
        let mut s = session();
        s.start().unwrap();
        s.tick();
        s.tick();
        assert_eq!(s.end().unwrap().elapsed_secs, 2);
    }

    #[tokio::test]
    async fn end_without_start_is_rejected() {
        let mut s = session();
        let err = s.end().unwrap_err();
        assert!(matches!(err, CoreError::InvalidCallState { .. }));
        assert_eq!(s.state(), CallState::Idle);
    }

    #[tokio::test]
    async fn ended_session_cannot_restart() {
        let mut s = session();
        s.start().unwrap();
        s.end().unwrap();
        assert!(s.start().is_err());
        assert!(s.end().is_err());
        assert_eq!(s.state(), CallState::Ended);
    }

    #[test]
    fn start_outside_runtime_fails_cleanly() {
        let mut s = session();
        assert!(matches!(s.start(), Err(CoreError::Internal(_))));
        assert_eq!(s.state(), CallState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_ticker() {
        let mut s = session();
        s.start().unwrap();
        let rx = s.subscribe();
        drop(s);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(rx.borrow().elapsed_secs, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn watchers_see_progress() {
        let mut s = session();
        let mut rx = s.subscribe();
        s.start().unwrap();

        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().active);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().elapsed_secs, 1);
        s.end().unwrap();
    }

    #[test]
    fn balance_gate_is_strict() {
        assert!(check_call_balance(&subscriber(0.0), 0.0).is_err());
        assert!(check_call_balance(&subscriber(0.01), 0.0).is_ok());
        assert!(matches!(
            check_call_balance(&subscriber(5.0), 10.0),
            Err(CoreError::InsufficientBalance { .. })
        ));
    }

    #[test]
    fn negative_threshold_still_refuses_empty_balance() {
        assert!(check_call_balance(&subscriber(0.0), -10.0).is_err());
        assert!(check_call_balance(&subscriber(-3.0), -10.0).is_err());
        assert!(check_call_balance(&subscriber(0.5), -10.0).is_ok());
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(93), "01:33");
        assert_eq!(format_elapsed(3600), "60:00");
    }
}
