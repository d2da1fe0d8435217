use sea_orm::{ConnectionTrait, DbErr, SqlErr};

use crate::auth::password;
use crate::db::users as user_db;
use crate::error::{AppError, AppResult};
use crate::models::users::{self, CreateUser, LoginUser, RegisterUser};

use super::required_text;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Register a new account. Emails are compared case-insensitively.
pub async fn register<C: ConnectionTrait>(db: &C, input: RegisterUser) -> AppResult<users::Model> {
    let email = required_text(input.email, "email")?.to_lowercase();
    if !email.contains('@') {
        return Err(AppError::Validation("email is invalid".to_string()));
    }

    let password = input
        .password
        .ok_or_else(|| AppError::Validation("password is required".to_string()))?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let role = input
        .role
        .ok_or_else(|| AppError::Validation("role is required".to_string()))?;

    if user_db::get_user_by_email(db, &email).await?.is_some() {
        return Err(AppError::Conflict("Email is already registered".to_string()));
    }

    let password_hash = password::hash_password(&password).map_err(AppError::Internal)?;
    let display_name = input
        .display_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    let user = user_db::insert_user(
        db,
        CreateUser {
            email,
            password_hash,
            display_name,
            role,
        },
    )
    .await
    .map_err(unique_violation_as_conflict)?;

    tracing::info!(user_id = %user.id, role = ?user.role, "User registered");
    Ok(user)
}

/// Check credentials. Unknown email and wrong password are indistinguishable.
pub async fn login<C: ConnectionTrait>(db: &C, input: LoginUser) -> AppResult<users::Model> {
    let email = input.email.trim().to_lowercase();

    match user_db::get_user_by_email(db, &email).await? {
        Some(user) if password::verify_password(&input.password, &user.password_hash) => Ok(user),
        _ => Err(AppError::Unauthenticated),
    }
}

// Two concurrent registrations can both pass the existence check.
fn unique_violation_as_conflict(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Email is already registered".to_string())
        }
        _ => AppError::Database(err),
    }
}
