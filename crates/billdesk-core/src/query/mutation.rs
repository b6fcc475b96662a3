// ── Mutation tracking ──
//
// A mutation is a write whose result is never cached. The tracker only
// records how the most recent run went.

use std::future::Future;

use tokio::sync::watch;

use crate::error::CoreError;

/// Progress of the latest run of a mutation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MutationStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Error(CoreError),
}

impl MutationStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Reports `Idle -> Pending -> Success | Error` for one mutation family.
#[derive(Debug)]
pub struct MutationTracker {
    status: watch::Sender<MutationStatus>,
}

impl Default for MutationTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl MutationTracker {
    pub fn new() -> Self {
        Self {
            status: watch::channel(MutationStatus::Idle).0,
        }
    }

    pub fn status(&self) -> MutationStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MutationStatus> {
        self.status.subscribe()
    }

    /// Drive `op` to completion, publishing its progress.
    pub async fn run<T, Fut>(&self, op: Fut) -> Result<T, CoreError>
    where
        Fut: Future<Output = Result<T, CoreError>>,
    {
        self.status.send_replace(MutationStatus::Pending);
        let result = op.await;
        self.status.send_replace(match &result {
            Ok(_) => MutationStatus::Success,
            Err(e) => MutationStatus::Error(e.clone()),
        });
        result
    }

    /// Record a failure that happened before the mutation could be sent.
    pub fn reject(&self, err: &CoreError) {
        self.status.send_replace(MutationStatus::Error(err.clone()));
    }

    pub fn reset(&self) {
        self.status.send_replace(MutationStatus::Idle);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn success_path() {
        let tracker = MutationTracker::new();
        assert_eq!(tracker.status(), MutationStatus::Idle);

        let out = tracker.run(async { Ok::<_, CoreError>(42) }).await.unwrap();
        assert_eq!(out, 42);
        assert_eq!(tracker.status(), MutationStatus::Success);
    }

    #[tokio::test]
    async fn error_path() {
        let tracker = MutationTracker::new();
        let err = tracker
            .run(async { Err::<(), _>(CoreError::Timeout) })
            .await
            .unwrap_err();
        assert_eq!(err, CoreError::Timeout);
        assert_eq!(tracker.status(), MutationStatus::Error(CoreError::Timeout));
    }

    #[tokio::test]
    async fn pending_is_observable() {
        let tracker = MutationTracker::new();
        let mut rx = tracker.subscribe();
        let (tx, gate) = tokio::sync::oneshot::channel::<()>();

        let run = tracker.run(async move {
            gate.await.ok();
            Ok::<_, CoreError>(())
        });
        let observe = async {
            rx.changed().await.unwrap();
            assert!(rx.borrow_and_update().is_pending());
            tx.send(()).unwrap();
        };

        let (result, ()) = tokio::join!(run, observe);
        result.unwrap();
        assert_eq!(tracker.status(), MutationStatus::Success);
    }
}
