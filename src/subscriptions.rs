use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// One running live listener.
struct ActiveSubscription {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl ActiveSubscription {
    fn cancel(self) {
        self.token.cancel();
        self.handle.abort();
    }
}

/// Owns background listeners keyed by what they watch (a user id, a
/// conversation key, ...). Opening a key that is already open cancels the old
/// listener first. Everything still open is cancelled on drop.
pub struct SubscriptionManager<K: Eq + Hash> {
    active: HashMap<K, ActiveSubscription>,
}

impl<K: Eq + Hash> SubscriptionManager<K> {
    pub fn new() -> Self {
        Self {
            active: HashMap::new(),
        }
    }

    /// Spawns `listener` under `key`. The listener receives a token that is
    /// cancelled when the key is re-opened, closed, or the manager dropped.
    pub fn open<F, Fut>(&mut self, key: K, listener: F)
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if let Some(previous) = self.active.remove(&key) {
            previous.cancel();
        }

        let token = CancellationToken::new();
        let handle = tokio::spawn(listener(token.clone()));
        self.active.insert(key, ActiveSubscription { token, handle });
    }

    pub fn close(&mut self, key: &K) -> bool {
        match self.active.remove(key) {
            Some(subscription) => {
                subscription.cancel();
                true
            }
            None => false,
        }
    }

    pub fn close_all(&mut self) {
        for (_, subscription) in self.active.drain() {
            subscription.cancel();
        }
    }

    pub fn is_open(&self, key: &K) -> bool {
        self.active
            .get(key)
            .is_some_and(|subscription| !subscription.handle.is_finished())
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

impl<K: Eq + Hash> Default for SubscriptionManager<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash> Drop for SubscriptionManager<K> {
    fn drop(&mut self) {
        self.close_all();
    }
}
