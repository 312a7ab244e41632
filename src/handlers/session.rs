use std::time::Duration;

use axum::{
    extract::State,
    response::{sse::Event, Sse},
    Json,
};
use futures_util::stream::{Stream, StreamExt};
use serde::Serialize;

use crate::auth::middleware::AuthenticatedUser;
use crate::db::models::Role;
use crate::error::AppError;
use crate::handlers::live;
use crate::session::{Identity, IdentityEvent, SessionResolver, SessionSnapshot};
use crate::AppState;

const RESOLVE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub authenticated: bool,
    pub user: Option<Identity>,
    pub role: Option<Role>,
    pub is_father: bool,
    pub is_superadmin: bool,
    pub loading: bool,
}

impl From<&SessionSnapshot> for SessionResponse {
    fn from(snapshot: &SessionSnapshot) -> Self {
        Self {
            authenticated: snapshot.identity.is_some(),
            user: snapshot.identity.clone(),
            role: snapshot.role,
            is_father: snapshot.is_father(),
            is_superadmin: snapshot.is_superadmin(),
            loading: snapshot.loading,
        }
    }
}

/// Current session for the bearer. No bearer (or a bad one) is a signed-out session.
pub async fn current(
    user: Option<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, AppError> {
    let Some(user) = user else {
        return Ok(Json(SessionResponse::from(&SessionSnapshot::signed_out())));
    };

    let mut resolver = SessionResolver::new(state.db.clone(), state.feed.clone());
    let mut rx = resolver.watch();
    resolver.apply(IdentityEvent::SignedIn(user.identity()));

    let settled = tokio::time::timeout(RESOLVE_TIMEOUT, rx.wait_for(|s| !s.loading)).await;
    let snapshot = settled
        .map_err(|_| AppError::Internal("session did not resolve in time".to_string()))?
        .map_err(|_| AppError::Internal("session resolver closed".to_string()))?
        .clone();

    Ok(Json(SessionResponse::from(&snapshot)))
}

pub async fn stream(
    user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, std::convert::Infallible>>> {
    let mut resolver = SessionResolver::new(state.db.clone(), state.feed.clone());
    resolver.apply(IdentityEvent::SignedIn(user.identity()));

    let snapshots = resolver
        .into_stream()
        .map(|snapshot| Ok::<_, AppError>(SessionResponse::from(&snapshot)));
    live(snapshots)
}
