use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::db::models::Role;
use crate::error::AppError;
use crate::guards::{Decision, Guard, Redirect};
use crate::session::{self, Identity};

/// Extracts the authenticated identity from a Bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
}

impl AuthenticatedUser {
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.user_id.clone(),
            email: self.email.clone(),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync + AsRef<crate::AppState>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state: &crate::AppState = state.as_ref();

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::Unauthorized)?;

        let claims = app_state.jwt.verify_access_token(token)?;

        Ok(AuthenticatedUser {
            user_id: claims.sub,
            email: claims.email,
        })
    }
}

/// A signed-in caller with the role currently stored on their profile.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync + AsRef<crate::AppState>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state: &crate::AppState = state.as_ref();
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;

        // Never trust a role from the client; read it from the profile every time.
        let role = session::stored_role(&app_state.db, &app_state.feed, &user.identity()).await?;

        Ok(Caller {
            user_id: user.user_id,
            email: user.email,
            role,
        })
    }
}

fn enforce(guard: Guard, role: Role) -> Result<(), AppError> {
    match guard.decide(true, Some(role)) {
        Decision::Allow => Ok(()),
        Decision::Redirect(Redirect::Login) | Decision::Pending => Err(AppError::Unauthorized),
        Decision::Redirect(_) => Err(AppError::Forbidden),
    }
}

/// Caller whose role is `user`.
#[derive(Debug, Clone)]
pub struct UserAuth(pub Caller);

#[async_trait]
impl<S> FromRequestParts<S> for UserAuth
where
    S: Send + Sync + AsRef<crate::AppState>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let caller = Caller::from_request_parts(parts, state).await?;
        enforce(Guard::UserOnly, caller.role)?;
        Ok(UserAuth(caller))
    }
}

/// Admin auth: father or superadmin, per the stored profile role.
#[derive(Debug, Clone)]
pub struct AdminAuth(pub Caller);

#[async_trait]
impl<S> FromRequestParts<S> for AdminAuth
where
    S: Send + Sync + AsRef<crate::AppState>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let caller = Caller::from_request_parts(parts, state).await?;
        enforce(Guard::AdminOnly, caller.role)?;
        Ok(AdminAuth(caller))
    }
}

/// Father only. Moderation and role changes.
#[derive(Debug, Clone)]
pub struct FatherAuth(pub Caller);

#[async_trait]
impl<S> FromRequestParts<S> for FatherAuth
where
    S: Send + Sync + AsRef<crate::AppState>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let caller = Caller::from_request_parts(parts, state).await?;
        if !caller.role.can_moderate_events() {
            return Err(AppError::Forbidden);
        }
        Ok(FatherAuth(caller))
    }
}
