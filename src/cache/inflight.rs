use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, Weak};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tracing::debug;

use crate::error::{StoreError, StoreResult};

use super::{Signature, lock};

pub type SharedResult<T> = Shared<BoxFuture<'static, StoreResult<T>>>;

struct Pending<T> {
    next_token: u64,
    entries: HashMap<Signature, (u64, SharedResult<T>)>,
}

/// Collapses concurrent identical requests into one shared pending result.
///
/// Each operation runs as its own task, so it settles even when every waiter
/// has gone away. The entry is removed by that task whatever the outcome,
/// so a signature never stays stuck behind a finished request.
pub struct InFlight<T> {
    pending: Arc<Mutex<Pending<T>>>,
}

impl<T> InFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(Pending {
                next_token: 0,
                entries: HashMap::new(),
            })),
        }
    }

    pub fn pending(&self, signature: &Signature) -> Option<SharedResult<T>> {
        lock(&self.pending)
            .entries
            .get(signature)
            .map(|(_, shared)| shared.clone())
    }

    /// Joins the request already running for `signature`, or spawns
    /// `operation` and records it until it settles.
    ///
    /// Must be called from within a tokio runtime.
    pub fn coalesce<F>(&self, signature: Signature, operation: F) -> SharedResult<T>
    where
        F: Future<Output = StoreResult<T>> + Send + 'static,
    {
        let mut pending = lock(&self.pending);
        if let Some((_, shared)) = pending.entries.get(&signature) {
            debug!(%signature, "joining in-flight request");
            return shared.clone();
        }

        let token = pending.next_token;
        pending.next_token += 1;

        let registry = Arc::downgrade(&self.pending);
        let key = signature.clone();
        let task = tokio::spawn(async move {
            let result = operation.await;
            settle(&registry, &key, token);
            result
        });
        let shared = async move {
            task.await.unwrap_or_else(|err| {
                Err(StoreError::remote(None, format!("request task failed: {err}")))
            })
        }
        .boxed()
        .shared();

        pending.entries.insert(signature, (token, shared.clone()));
        shared
    }

    /// Detaches every pending request whose signature starts with `prefix`.
    ///
    /// Callers already waiting keep their result; later callers start fresh.
    pub fn forget(&self, prefix: &str) -> usize {
        let mut pending = lock(&self.pending);
        let before = pending.entries.len();
        pending
            .entries
            .retain(|signature, _| !signature.starts_with(prefix));
        before - pending.entries.len()
    }

    pub fn len(&self) -> usize {
        lock(&self.pending).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for InFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for InFlight<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InFlight")
            .field("pending", &lock(&self.pending).entries.len())
            .finish()
    }
}

fn settle<T>(registry: &Weak<Mutex<Pending<T>>>, signature: &Signature, token: u64) {
    let Some(registry) = registry.upgrade() else {
        return;
    };

    let mut pending = lock(&registry);
    if pending
        .entries
        .get(signature)
        .is_some_and(|(current, _)| *current == token)
    {
        pending.entries.remove(signature);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::oneshot;

    use super::*;

    #[tokio::test]
    async fn identical_requests_share_one_operation() {
        let inflight = InFlight::<u32>::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let (release, gate) = oneshot::channel::<()>();
        let key = Signature::get("/letters", &[]);

        let counter = Arc::clone(&calls);
        let first = inflight.coalesce(key.clone(), async move {
            counter.fetch_add(1, Ordering::SeqCst);
            let _ = gate.await;
            Ok(7)
        });

        let counter = Arc::clone(&calls);
        let second = inflight.coalesce(key.clone(), async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(8)
        });

        assert_eq!(inflight.len(), 1);
        release.send(()).expect("gate open");

        let (a, b) = tokio::join!(first, second);
        assert_eq!(a, Ok(7));
        assert_eq!(b, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(inflight.is_empty());
    }

    #[tokio::test]
    async fn failure_settles_and_clears_entry() {
        let inflight = InFlight::<u32>::new();
        let key = Signature::get("/letters/1", &[]);

        let result = inflight
            .coalesce(key.clone(), async { Err(StoreError::Timeout) })
            .await;

        assert_eq!(result, Err(StoreError::Timeout));
        assert!(inflight.pending(&key).is_none());

        let retry = inflight.coalesce(key, async { Ok(1) }).await;
        assert_eq!(retry, Ok(1));
    }

    #[tokio::test]
    async fn forgotten_request_does_not_evict_its_successor() {
        let inflight = InFlight::<u32>::new();
        let key = Signature::get("/letters", &[]);
        let (release_old, gate_old) = oneshot::channel::<()>();
        let (release_new, gate_new) = oneshot::channel::<()>();

        let old = inflight.coalesce(key.clone(), async move {
            let _ = gate_old.await;
            Ok(1)
        });
        assert_eq!(inflight.forget("/letters"), 1);

        let new = inflight.coalesce(key.clone(), async move {
            let _ = gate_new.await;
            Ok(2)
        });

        release_old.send(()).expect("gate open");
        assert_eq!(old.await, Ok(1));
        assert!(inflight.pending(&key).is_some());

        release_new.send(()).expect("gate open");
        assert_eq!(new.await, Ok(2));
        assert!(inflight.is_empty());
    }

    #[tokio::test]
    async fn abandoned_request_still_settles() {
        let inflight = InFlight::<u32>::new();
        let key = Signature::get("/letters", &[]);
        let (release, gate) = oneshot::channel::<()>();
        let (done_tx, done_rx) = oneshot::channel::<()>();

        let waiter = inflight.coalesce(key, async move {
            let _ = gate.await;
            let _ = done_tx.send(());
            Ok(3)
        });
        drop(waiter);
        assert_eq!(inflight.len(), 1);

        release.send(()).expect("gate open");
        done_rx.await.expect("operation ran without waiters");
        tokio::task::yield_now().await;

        assert!(inflight.is_empty());
    }
}
