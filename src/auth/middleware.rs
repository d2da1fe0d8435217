use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header;
use actix_web::{Error, FromRequest, HttpRequest, dev::Payload, web};
use sea_orm::DatabaseConnection;
use std::future::Future;
use std::pin::Pin;
use uuid::Uuid;

use crate::auth::jwt;
use crate::cache::UserCache;
use crate::config::SessionConfig;
use crate::db::users as user_db;
use crate::error::AppError;
use crate::models::users::{self, Roles};

/// Name of the httpOnly cookie carrying the session token.
pub const SESSION_COOKIE: &str = "token";

/// Who is performing an operation. Lifecycle functions take this instead of
/// looking up a "current user" themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Roles,
}

impl Actor {
    pub fn new(id: Uuid, role: Roles) -> Self {
        Self { id, role }
    }
}

pub struct AuthenticatedUser(pub users::Model);

impl AuthenticatedUser {
    pub fn actor(&self) -> Actor {
        Actor::new(self.0.id, self.0.role)
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            // 1. Pull the session token from the cookie (or a Bearer header).
            let token = session_token(&req).ok_or(AppError::Unauthenticated)?;

            // 2. Validate it against the configured secret.
            let session = req.app_data::<web::Data<SessionConfig>>().ok_or_else(|| {
                AppError::Internal("Session config not configured".to_string())
            })?;

            let claims = jwt::validate_token(&token, &session.jwt_secret).map_err(|e| {
                tracing::debug!("Rejected session token: {e}");
                AppError::Unauthenticated
            })?;

            let user_id = claims.user_id().map_err(|_| AppError::Unauthenticated)?;

            // 3. Resolve the user, through the cache when one is configured.
            let db = req
                .app_data::<web::Data<DatabaseConnection>>()
                .ok_or_else(|| AppError::Internal("Database not configured".to_string()))?;

            let user = match req.app_data::<web::Data<UserCache>>() {
                Some(cache) => cache.get_or_load(db.get_ref(), user_id).await,
                None => user_db::get_user_by_id(db.get_ref(), user_id).await,
            }
            .map_err(AppError::from)?
            .ok_or(AppError::Unauthenticated)?;

            Ok(AuthenticatedUser(user))
        })
    }
}

fn session_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Build the session cookie for a freshly issued token.
pub fn session_cookie(token: String, config: &SessionConfig) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(config.cookie_secure)
        .max_age(CookieDuration::seconds(config.ttl_secs))
        .finish()
}

/// An expired, empty session cookie that makes the browser drop the session.
pub fn cleared_session_cookie(config: &SessionConfig) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(config.cookie_secure)
        .max_age(CookieDuration::ZERO)
        .finish()
}
