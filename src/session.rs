//! Resolves an authenticated identity into a profile and role.
//!
//! A [`SessionResolver`] consumes identity events and keeps a
//! [`SessionSnapshot`] current in a `watch` channel. While signed in it holds a
//! live subscription on the identity's profile, creating the profile and its
//! starter checklist the first time it is found missing.

use futures_util::stream::{self, Stream, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

use crate::db::models::Role;
use crate::db::pool::Db;
use crate::db::queries;
use crate::error::AppError;
use crate::feed::{ChangeFeed, Topic};
use crate::subscriptions::SubscriptionManager;

const PROFILE: &str = "profile";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
}

#[derive(Clone, Debug)]
pub enum IdentityEvent {
    SignedIn(Identity),
    SignedOut,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub identity: Option<Identity>,
    pub role: Option<Role>,
    pub loading: bool,
}

impl SessionSnapshot {
    /// Nothing known yet.
    pub fn initial() -> Self {
        Self {
            identity: None,
            role: None,
            loading: true,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            identity: None,
            role: None,
            loading: false,
        }
    }

    pub fn is_father(&self) -> bool {
        self.role == Some(Role::Father)
    }

    pub fn is_superadmin(&self) -> bool {
        self.role == Some(Role::Superadmin)
    }

    fn belongs_to(&self, identity_id: &str) -> bool {
        self.identity.as_ref().is_some_and(|i| i.id == identity_id)
    }
}

/// Creates the profile (role `user`) with its starter tasks and documents if
/// it does not exist yet. Returns whether this call created it.
pub async fn ensure_profile(db: &Db, feed: &ChangeFeed, identity: &Identity) -> Result<bool, AppError> {
    let created =
        queries::users::create_with_starters(db, &identity.id, &identity.email, Role::User).await?;

    if created {
        tracing::info!(user_id = %identity.id, email = %identity.email, "profile created");
        feed.publish(Topic::User(identity.id.clone()));
        feed.publish(Topic::Tasks(identity.id.clone()));
        feed.publish(Topic::Documents(identity.id.clone()));
    }
    Ok(created)
}

/// One-shot role lookup for request handling, creating the profile if needed.
pub async fn stored_role(db: &Db, feed: &ChangeFeed, identity: &Identity) -> Result<Role, AppError> {
    if let Some(profile) = queries::users::find_by_id(db, &identity.id).await? {
        return profile.role.parse();
    }
    ensure_profile(db, feed, identity).await?;
    Ok(Role::User)
}

pub struct SessionResolver {
    db: Db,
    feed: ChangeFeed,
    state: Arc<watch::Sender<SessionSnapshot>>,
    subscriptions: SubscriptionManager<&'static str>,
}

impl SessionResolver {
    pub fn new(db: Db, feed: ChangeFeed) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::initial());
        Self {
            db,
            feed,
            state: Arc::new(state),
            subscriptions: SubscriptionManager::new(),
        }
    }

    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn apply(&mut self, event: IdentityEvent) {
        match event {
            IdentityEvent::SignedOut => {
                self.subscriptions.close(&PROFILE);
                self.state.send_replace(SessionSnapshot::signed_out());
            }
            IdentityEvent::SignedIn(identity) => {
                // The old listener must be gone before the new identity is visible.
                self.subscriptions.close(&PROFILE);
                self.state.send_replace(SessionSnapshot {
                    identity: Some(identity.clone()),
                    role: None,
                    loading: true,
                });
                self.watch_profile(identity);
            }
        }
    }

    fn watch_profile(&mut self, identity: Identity) {
        let db = self.db.clone();
        let feed = self.feed.clone();
        let state = self.state.clone();

        let fetch_db = self.db.clone();
        let user_id = identity.id.clone();
        let live = self.feed.snapshots(Topic::User(identity.id.clone()), move || {
            let db = fetch_db.clone();
            let user_id = user_id.clone();
            async move { queries::users::find_by_id(&db, &user_id).await }
        });

        self.subscriptions.open(PROFILE, move |token| async move {
            let mut live = std::pin::pin!(live);
            loop {
                let next = tokio::select! {
                    _ = token.cancelled() => break,
                    next = live.next() => next,
                };
                let Some(result) = next else { break };

                match result {
                    Ok(Some(profile)) => match profile.role.parse::<Role>() {
                        Ok(role) => {
                            state.send_if_modified(|current| {
                                if !current.belongs_to(&identity.id) {
                                    return false;
                                }
                                let changed = current.role != Some(role) || current.loading;
                                current.role = Some(role);
                                current.loading = false;
                                changed
                            });
                        }
                        Err(e) => {
                            tracing::error!(user_id = %identity.id, error = %e, "profile has an unreadable role");
                        }
                    },
                    // The creation publishes the profile topic, which brings the next snapshot.
                    Ok(None) => {
                        if let Err(e) = ensure_profile(&db, &feed, &identity).await {
                            tracing::error!(user_id = %identity.id, error = %e, "profile creation failed");
                        }
                    }
                    Err(e) => {
                        tracing::error!(user_id = %identity.id, error = %e, "profile snapshot failed");
                    }
                }
            }
        });
    }

    /// Snapshots starting with the current one, then one per change. Owns the
    /// resolver: dropping the stream cancels its subscriptions.
    pub fn into_stream(self) -> impl Stream<Item = SessionSnapshot> + Send + 'static {
        let rx = self.watch();
        stream::unfold((self, rx, true), |(resolver, mut rx, first)| async move {
            if !first && rx.changed().await.is_err() {
                return None;
            }
            let snapshot = rx.borrow_and_update().clone();
            Some((snapshot, (resolver, rx, false)))
        })
    }
}
