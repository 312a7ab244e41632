use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::password::{hash_password, validate_password, verify_password};
use crate::db::models::Role;
use crate::db::queries;
use crate::error::AppError;
use crate::session::{self, Identity};
use crate::AppState;

// --- Request / Response types ---

#[derive(Debug, Deserialize, Validate)]
pub struct CredentialsRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

// --- Handlers ---

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    req.validate()?;
    validate_password(&req.password)?;

    let email = normalize_email(&req.email);
    if queries::accounts::find_by_email(&state.db, &email).await?.is_some() {
        return Err(AppError::UserAlreadyExists);
    }

    let password_hash = hash_password(&req.password)?;
    let account = queries::accounts::insert(&state.db, &email, password_hash).await?;
    tracing::info!(user_id = %account.id, "account registered");

    signed_in(&state, account).await.map(Json)
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let email = normalize_email(&req.email);
    let account = queries::accounts::find_by_email(&state.db, &email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&req.password, &account.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    signed_in(&state, account).await.map(Json)
}

/// Makes sure the profile exists, then issues the access token.
async fn signed_in(
    state: &AppState,
    account: entity::account::Model,
) -> Result<TokenResponse, AppError> {
    let identity = Identity {
        id: account.id,
        email: account.email,
    };
    session::ensure_profile(&state.db, &state.feed, &identity).await?;

    let profile = queries::users::find_by_id(&state.db, &identity.id)
        .await?
        .ok_or(AppError::UserNotFound)?;
    let role: Role = profile.role.parse()?;

    let access_token = state.jwt.issue_access_token(&identity.id, &identity.email)?;

    Ok(TokenResponse {
        user_id: identity.id,
        email: identity.email,
        role,
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt.expiry_secs(),
    })
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
