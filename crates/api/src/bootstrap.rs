//! Startup seeding of the default admin and CEO accounts.

use boardroom_core::roles::{ROLE_ADMIN, ROLE_CEO};
use boardroom_db::models::user::CreateUser;
use boardroom_db::repositories::user_repo::UserRepo;
use boardroom_db::DbPool;

use crate::auth::password::hash_password;
use crate::error::AppError;

/// Ensure the default admin and CEO users exist.
///
/// Credentials come from `ADMIN_EMAIL` / `ADMIN_PASSWORD` and `CEO_EMAIL` /
/// `CEO_PASSWORD`, with development defaults. Existing accounts are left
/// untouched (passwords are never reset on restart), so this is safe to run
/// on every boot.
pub async fn seed_default_users(pool: &DbPool) -> Result<(), AppError> {
    let admin_email =
        std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@boardroom.local".into());
    let admin_password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".into());
    ensure_user(pool, &admin_email, &admin_password, ROLE_ADMIN).await?;

    let ceo_email = std::env::var("CEO_EMAIL").unwrap_or_else(|_| "ceo@boardroom.local".into());
    let ceo_password = std::env::var("CEO_PASSWORD").unwrap_or_else(|_| "ceo123".into());
    ensure_user(pool, &ceo_email, &ceo_password, ROLE_CEO).await?;

    Ok(())
}

async fn ensure_user(
    pool: &DbPool,
    email: &str,
    password: &str,
    role: &str,
) -> Result<(), AppError> {
    if UserRepo::find_by_email(pool, email).await?.is_some() {
        return Ok(());
    }

    let password_hash = hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;

    let user = UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            password_hash,
            role: role.to_string(),
        },
    )
    .await?;

    tracing::info!(user_id = user.id, email = %user.email, role = %user.role, "Seeded user");
    Ok(())
}
