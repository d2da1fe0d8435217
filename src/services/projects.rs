use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::auth::Actor;
use crate::auth::authorization::require_role;
use crate::db::projects as project_db;
use crate::error::{AppError, AppResult};
use crate::models::projects::{self, CreateProject, ProjectStatus};
use crate::models::users::Roles;

use super::{positive_amount, required_text};

pub async fn create_project<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    input: CreateProject,
) -> AppResult<projects::Model> {
    require_role(actor, Roles::Client, "Only clients can post projects")?;

    let title = required_text(input.title, "title")?;
    let description = required_text(input.description, "description")?;
    let budget = positive_amount(input.budget, "budget")?;

    let project = project_db::insert_project(db, actor.id, title, description, budget).await?;
    tracing::info!(project_id = %project.id, client_id = %actor.id, "Project posted");
    Ok(project)
}

pub async fn list_projects<C: ConnectionTrait>(
    db: &C,
    status: Option<ProjectStatus>,
) -> AppResult<Vec<projects::Model>> {
    Ok(project_db::get_projects(db, status).await?)
}

pub async fn get_project<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<projects::Model> {
    project_db::get_project_by_id(db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {id} not found")))
}
