use crate::auth::password::{hash_password, validate_password};
use crate::db::models::Role;
use crate::db::pool::Db;
use crate::db::queries;
use crate::error::AppError;

/// Result of a bootstrap/seed operation.
#[derive(Debug)]
pub struct SeedResult {
    pub user_id: String,
    /// What happened to the profile: "created", "promoted", or "already_admin".
    pub user_action: String,
}

/// Bootstrap a privileged account.
///
/// - Creates the account if the email is unknown (`password` is then required).
/// - Creates the profile with `role` and the usual starter checklist, or
///   promotes an existing profile to `role`.
pub async fn bootstrap(
    db: &Db,
    email: &str,
    password: Option<&str>,
    role: Role,
) -> Result<SeedResult, Box<dyn std::error::Error>> {
    let email = email.trim().to_lowercase();

    let account = match queries::accounts::find_by_email(db, &email).await? {
        Some(account) => account,
        None => {
            let password = password.ok_or_else(|| {
                AppError::BadRequest(
                    "Password is required when creating a new account. Usage: cargo run -- seed <email> <password> [role]".to_string(),
                )
            })?;
            validate_password(password)?;
            queries::accounts::insert(db, &email, hash_password(password)?).await?
        }
    };

    let user_action = match queries::users::find_by_id(db, &account.id).await? {
        Some(profile) if profile.role == role.as_str() => "already_admin",
        Some(_) => {
            queries::users::set_role(db, &account.id, role).await?;
            "promoted"
        }
        None => {
            queries::users::create_with_starters(db, &account.id, &email, role).await?;
            "created"
        }
    };

    tracing::info!(user_id = %account.id, role = role.as_str(), user_action, "bootstrap complete");

    Ok(SeedResult {
        user_id: account.id,
        user_action: user_action.to_string(),
    })
}
