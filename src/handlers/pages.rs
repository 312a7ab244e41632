use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::middleware::AuthenticatedUser;
use crate::error::AppError;
use crate::guards::{Decision, Guard};
use crate::pages::Page;
use crate::session;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NavigateQuery {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct NavigateResponse {
    #[serde(flatten)]
    pub page: Page,
    pub guard: Option<Guard>,
    #[serde(flatten)]
    pub decision: Decision,
}

pub async fn navigate(
    user: Option<AuthenticatedUser>,
    State(state): State<AppState>,
    Query(query): Query<NavigateQuery>,
) -> Result<Json<NavigateResponse>, AppError> {
    let page = Page::resolve(&query.path);
    let guard = page.guard();

    let decision = match guard {
        None => Decision::Allow,
        Some(guard) => {
            let role = match &user {
                Some(user) => {
                    Some(session::stored_role(&state.db, &state.feed, &user.identity()).await?)
                }
                None => None,
            };
            guard.decide(user.is_some(), role)
        }
    };

    tracing::debug!(path = %query.path, ?page, ?decision, "navigation resolved");
    Ok(Json(NavigateResponse {
        page,
        guard,
        decision,
    }))
}
