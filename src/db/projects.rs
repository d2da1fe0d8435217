use sea_orm::prelude::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::projects::{self, ProjectStatus};

/// Insert a new project (always starts Open).
pub async fn insert_project<C: ConnectionTrait>(
    db: &C,
    client_id: Uuid,
    title: String,
    description: String,
    budget: f64,
) -> Result<projects::Model, DbErr> {
    let new_project = projects::ActiveModel {
        id: Set(Uuid::new_v4()),
        client_id: Set(client_id),
        title: Set(title),
        description: Set(description),
        budget: Set(budget),
        status: Set(ProjectStatus::Open),
        created_at: Set(chrono::Utc::now()),
    };

    new_project.insert(db).await
}

/// Fetch projects, newest first, optionally filtered by status.
pub async fn get_projects<C: ConnectionTrait>(
    db: &C,
    status: Option<ProjectStatus>,
) -> Result<Vec<projects::Model>, DbErr> {
    let mut query = projects::Entity::find();
    if let Some(status) = status {
        query = query.filter(projects::Column::Status.eq(status));
    }

    query
        .order_by_desc(projects::Column::CreatedAt)
        .all(db)
        .await
}

/// Fetch a single project by ID.
pub async fn get_project_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<projects::Model>, DbErr> {
    projects::Entity::find_by_id(id).one(db).await
}

/// Move an Open project to InProgress in a single conditional UPDATE.
///
/// Returns `false` when the project was not Open, so of two concurrent
/// claims exactly one sees `true`.
pub async fn claim_open_project<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<bool, DbErr> {
    let result = projects::Entity::update_many()
        .col_expr(
            projects::Column::Status,
            Expr::value(ProjectStatus::InProgress.to_value()),
        )
        .filter(projects::Column::Id.eq(id))
        .filter(projects::Column::Status.eq(ProjectStatus::Open))
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}

/// Update the status of a project.
pub async fn update_project_status<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    status: ProjectStatus,
) -> Result<projects::Model, DbErr> {
    let project = projects::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("Project not found".to_string()))?;

    let mut active: projects::ActiveModel = project.into();
    active.status = Set(status);

    active.update(db).await
}
