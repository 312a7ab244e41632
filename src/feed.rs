//! In-process change notifications and live snapshot sequences.
//!
//! Writers call [`ChangeFeed::publish`] after a successful commit. Readers turn
//! a topic plus a fetch function into an endless stream of snapshots: one
//! immediately, then one after every change on that topic.

use std::fmt;
use std::future::Future;

use futures_util::stream::{self, Stream};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::error::AppError;

/// A watched collection or document. `Display` yields the collection path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Topic {
    User(String),
    Users,
    Applications,
    Tasks(String),
    Documents(String),
    GlobalEvents,
    PublicEvents,
    Conversation(String),
    Inquiries,
}

impl Topic {
    /// A per-user profile change also changes the profile collection.
    fn matches(&self, changed: &Topic) -> bool {
        self == changed || (matches!(self, Topic::Users) && matches!(changed, Topic::User(_)))
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::User(id) => write!(f, "users/{id}"),
            Topic::Users => f.write_str("users"),
            Topic::Applications => f.write_str("applications"),
            Topic::Tasks(user_id) => write!(f, "tasks?userId={user_id}"),
            Topic::Documents(user_id) => write!(f, "documents?userId={user_id}"),
            Topic::GlobalEvents => f.write_str("globalEvents"),
            Topic::PublicEvents => f.write_str("publicEvents"),
            Topic::Conversation(user_id) => write!(f, "conversations/{user_id}/messages"),
            Topic::Inquiries => f.write_str("inquiries"),
        }
    }
}

#[derive(Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<Topic>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn publish(&self, topic: Topic) {
        tracing::trace!(%topic, "change published");
        // No receivers simply means nobody is watching.
        let _ = self.tx.send(topic);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Live sequence of snapshots for `topic`.
    ///
    /// The receiver is registered before the first fetch so a write landing
    /// between the two is never lost. A lagged receiver re-fetches, which is
    /// always correct for snapshot semantics. The stream ends only when the
    /// feed itself is dropped; dropping the stream unsubscribes.
    pub fn snapshots<T, F, Fut>(
        &self,
        topic: Topic,
        fetch: F,
    ) -> impl Stream<Item = Result<T, AppError>> + Send + 'static
    where
        T: Send + 'static,
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, AppError>> + Send + 'static,
    {
        let rx = self.tx.subscribe();
        stream::unfold(
            (rx, fetch, topic, true),
            |(mut rx, fetch, topic, first)| async move {
                if !first {
                    loop {
                        match rx.recv().await {
                            Ok(changed) if topic.matches(&changed) => break,
                            Ok(_) => continue,
                            Err(RecvError::Lagged(skipped)) => {
                                tracing::debug!(%topic, skipped, "live subscriber lagged");
                                break;
                            }
                            Err(RecvError::Closed) => return None,
                        }
                    }
                }
                let snapshot = fetch().await;
                Some((snapshot, (rx, fetch, topic, false)))
            },
        )
    }
}
