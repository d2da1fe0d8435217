use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;

use crate::auth::AuthenticatedUser;
use crate::auth::jwt;
use crate::auth::middleware::{cleared_session_cookie, session_cookie};
use crate::cache::UserCache;
use crate::config::SessionConfig;
use crate::error::AppError;
use crate::models::users::{self, LoginUser, RegisterUser, UserResponse};
use crate::services::accounts;

fn issue_session(
    user: &users::Model,
    session: &SessionConfig,
) -> Result<actix_web::cookie::Cookie<'static>, AppError> {
    let token = jwt::issue_token(user, &session.jwt_secret, session.ttl_secs)
        .map_err(AppError::Internal)?;
    Ok(session_cookie(token, session))
}

/// POST /api/auth/register — create an account and start a session.
pub async fn register(
    db: web::Data<DatabaseConnection>,
    session: web::Data<SessionConfig>,
    body: web::Json<RegisterUser>,
) -> Result<HttpResponse, AppError> {
    let user = accounts::register(db.get_ref(), body.into_inner()).await?;
    let cookie = issue_session(&user, &session)?;

    Ok(HttpResponse::Created()
        .cookie(cookie)
        .json(UserResponse::from(user)))
}

/// POST /api/auth/login — exchange email and password for a session cookie.
pub async fn login(
    db: web::Data<DatabaseConnection>,
    session: web::Data<SessionConfig>,
    body: web::Json<LoginUser>,
) -> Result<HttpResponse, AppError> {
    let user = accounts::login(db.get_ref(), body.into_inner()).await?;
    let cookie = issue_session(&user, &session)?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(HttpResponse::Ok().cookie(cookie).json(UserResponse::from(user)))
}

/// GET /api/auth/me — return the currently authenticated user's profile.
pub async fn me(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(UserResponse::from(user.0))
}

/// POST /api/auth/logout — drop the session cookie.
///
/// Works without a valid session so a stale cookie can always be cleared.
pub async fn logout(
    user: Option<AuthenticatedUser>,
    session: web::Data<SessionConfig>,
    cache: Option<web::Data<UserCache>>,
) -> HttpResponse {
    if let (Some(user), Some(cache)) = (user, cache) {
        cache.invalidate(user.0.id).await;
    }

    HttpResponse::Ok()
        .cookie(cleared_session_cookie(&session))
        .json(serde_json::json!({ "message": "Logged out" }))
}
