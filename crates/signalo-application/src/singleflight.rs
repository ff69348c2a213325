//! Keyed deduplication of in-flight requests.
//!
//! Rapid re-navigation re-triggers the same fetches; instead of issuing a
//! duplicate call, later arrivals join the future already in flight for the
//! same key and share its result.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use signalo_core::error::Result;
use tokio::sync::Mutex;

type SharedCall<T> = Shared<BoxFuture<'static, Result<T>>>;

/// One in-flight slot per key.
///
/// The result type must be `Clone` so every joiner gets its own copy;
/// errors clone too, so a failure is shared by everyone who joined.
pub struct Singleflight<K, T>
where
    K: Eq + Hash + Clone + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    inflight: Arc<Mutex<HashMap<K, SharedCall<T>>>>,
}

impl<K, T> Singleflight<K, T>
where
    K: Eq + Hash + Clone + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            inflight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Runs `make()` under `key`, unless a call with the same key is
    /// already in flight, in which case its future is joined instead.
    ///
    /// The slot is released by the call itself before its result is handed
    /// out, so a fresh `run` never observes a settled slot. A detached task
    /// drives the call to completion even when every waiter has been
    /// cancelled; abandonment discards results, it does not abort the
    /// request.
    pub async fn run<F, Fut>(&self, key: K, make: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let call = {
            let mut inflight = self.inflight.lock().await;
            match inflight.get(&key) {
                Some(existing) => {
                    tracing::debug!("joining request already in flight");
                    existing.clone()
                }
                None => {
                    let map = Arc::clone(&self.inflight);
                    let slot_key = key.clone();
                    let fut = make();
                    let shared = async move {
                        let result = fut.await;
                        // Free the slot before anyone sees the result.
                        map.lock().await.remove(&slot_key);
                        result
                    }
                    .boxed()
                    .shared();

                    inflight.insert(key.clone(), shared.clone());
                    tokio::spawn(shared.clone().map(|_| ()));

                    shared
                }
            }
        };

        call.await
    }
}

impl<K, T> Default for Singleflight<K, T>
where
    K: Eq + Hash + Clone + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
