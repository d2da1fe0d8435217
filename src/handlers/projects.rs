use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::models::projects::{CreateProject, ProjectListQuery};
use crate::services::projects;

/// GET /api/projects — list projects, optionally filtered by `?status=`.
pub async fn get_projects(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    query: web::Query<ProjectListQuery>,
) -> Result<HttpResponse, AppError> {
    let list = projects::list_projects(db.get_ref(), query.into_inner().status).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// POST /api/projects — a client posts a new project, open for bids.
pub async fn create_project(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateProject>,
) -> Result<HttpResponse, AppError> {
    let project = projects::create_project(db.get_ref(), &user.actor(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(project))
}

/// GET /api/projects/{id}
pub async fn get_project(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let project = projects::get_project(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(project))
}
