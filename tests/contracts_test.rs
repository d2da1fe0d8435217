mod common;

use common::{accepted_contract, actor, add_milestone, create_user, setup_db};
use sea_orm::ConnectionTrait;
use escrow_market_backend::error::AppError;
use escrow_market_backend::models::contracts::Stage;
use escrow_market_backend::models::milestones::MilestoneStatus;
use escrow_market_backend::models::projects::ProjectStatus;
use escrow_market_backend::models::users::Roles;
use escrow_market_backend::services::{contracts, milestones, projects};

#[tokio::test]
async fn test_third_party_cannot_touch_contract() {
    let db = setup_db().await;
    let f = accepted_contract(&db).await;
    let stranger = create_user(&db, "stranger@example.com", Roles::Freelancer).await;

    let accept = contracts::accept_terms(&db, &actor(&stranger), f.contract.id).await;
    assert!(matches!(accept, Err(AppError::Forbidden(_))));

    let stage = contracts::advance_stage(&db, &actor(&stranger), f.contract.id, Stage::Payment).await;
    assert!(matches!(stage, Err(AppError::Forbidden(_))));

    let details = contracts::get_contract_details(&db, &actor(&stranger), f.contract.id).await;
    assert!(matches!(details, Err(AppError::Forbidden(_))));

    // Nothing changed.
    let details = contracts::get_contract_details(&db, &actor(&f.client), f.contract.id)
        .await
        .unwrap();
    assert_eq!(details.contract.stage, Stage::Approval);
    assert!(!details.contract.terms_accepted);
}

#[tokio::test]
async fn test_missing_contract_is_not_found() {
    let db = setup_db().await;
    let f = accepted_contract(&db).await;

    let result = contracts::accept_terms(&db, &actor(&f.client), uuid::Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_parties_accept_terms_and_move_stages() {
    let db = setup_db().await;
    let f = accepted_contract(&db).await;

    let accepted = contracts::accept_terms(&db, &actor(&f.freelancer), f.contract.id)
        .await
        .unwrap();
    assert!(accepted.terms_accepted);

    let moved = contracts::advance_stage(&db, &actor(&f.client), f.contract.id, Stage::Review)
        .await
        .unwrap();
    assert_eq!(moved.stage, Stage::Review);

    // No ordering is enforced between non-terminal stages.
    let back = contracts::advance_stage(&db, &actor(&f.freelancer), f.contract.id, Stage::Approval)
        .await
        .unwrap();
    assert_eq!(back.stage, Stage::Approval);

    // Completion only goes through the milestone check.
    let result =
        contracts::advance_stage(&db, &actor(&f.client), f.contract.id, Stage::Completed).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_complete_requires_every_milestone_completed() {
    let db = setup_db().await;
    let f = accepted_contract(&db).await;
    let design = add_milestone(&db, &f, "Design", 200.0).await;
    let build = add_milestone(&db, &f, "Build", 250.0).await;
    assert_eq!(design.position, 0);
    assert_eq!(build.position, 1);

    milestones::update_milestone_status(
        &db,
        &actor(&f.freelancer),
        design.id,
        MilestoneStatus::Completed,
    )
    .await
    .unwrap();

    let result = contracts::complete(&db, &actor(&f.client), f.contract.id).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    // The failed attempt left both rows untouched.
    let details = contracts::get_contract_details(&db, &actor(&f.client), f.contract.id)
        .await
        .unwrap();
    assert_eq!(details.contract.stage, Stage::Approval);
    assert!(!details.all_milestones_completed());
    let project = projects::get_project(&db, f.project.id).await.unwrap();
    assert_eq!(project.status, ProjectStatus::InProgress);

    milestones::update_milestone_status(
        &db,
        &actor(&f.freelancer),
        build.id,
        MilestoneStatus::Completed,
    )
    .await
    .unwrap();

    let completion = contracts::complete(&db, &actor(&f.client), f.contract.id)
        .await
        .unwrap();
    assert_eq!(completion.contract.stage, Stage::Completed);
    assert_eq!(completion.project.status, ProjectStatus::Completed);

    let project = projects::get_project(&db, f.project.id).await.unwrap();
    assert_eq!(project.status, ProjectStatus::Completed);

    let again = contracts::complete(&db, &actor(&f.client), f.contract.id).await;
    assert!(matches!(again, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_complete_with_no_milestones_succeeds() {
    let db = setup_db().await;
    let f = accepted_contract(&db).await;

    let completion = contracts::complete(&db, &actor(&f.freelancer), f.contract.id)
        .await
        .unwrap();
    assert_eq!(completion.contract.stage, Stage::Completed);
    assert_eq!(completion.project.status, ProjectStatus::Completed);
}

#[tokio::test]
async fn test_completed_contract_freezes_milestones() {
    let db = setup_db().await;
    let f = accepted_contract(&db).await;
    let only = add_milestone(&db, &f, "Everything", 450.0).await;

    milestones::update_milestone_status(&db, &actor(&f.client), only.id, MilestoneStatus::Completed)
        .await
        .unwrap();
    contracts::complete(&db, &actor(&f.client), f.contract.id)
        .await
        .unwrap();

    let result = milestones::update_milestone_status(
        &db,
        &actor(&f.client),
        only.id,
        MilestoneStatus::Pending,
    )
    .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_only_client_adds_milestones() {
    let db = setup_db().await;
    let f = accepted_contract(&db).await;

    let result = milestones::create_milestone(
        &db,
        &actor(&f.freelancer),
        f.contract.id,
        escrow_market_backend::models::milestones::CreateMilestone {
            title: Some("Extra".to_string()),
            description: None,
            amount: Some(50.0),
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let listed = milestones::list_milestones(&db, &actor(&f.freelancer), f.contract.id)
        .await
        .unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_concurrent_stage_changes_both_finish() {
    let db = setup_db().await;
    let f = accepted_contract(&db).await;
    let client = actor(&f.client);
    let freelancer = actor(&f.freelancer);

    let (a, b) = tokio::join!(
        contracts::advance_stage(&db, &client, f.contract.id, Stage::Payment),
        contracts::advance_stage(&db, &freelancer, f.contract.id, Stage::Review),
    );
    a.unwrap();
    b.unwrap();

    let details = contracts::get_contract_details(&db, &client, f.contract.id)
        .await
        .unwrap();
    assert!(matches!(details.contract.stage, Stage::Payment | Stage::Review));
}

#[tokio::test]
async fn test_completion_commits_even_if_notifications_fail() {
    let db = setup_db().await;
    let f = accepted_contract(&db).await;

    db.execute_unprepared("DROP TABLE notifications").await.unwrap();

    let completion = contracts::complete(&db, &actor(&f.client), f.contract.id)
        .await
        .unwrap();
    assert_eq!(completion.contract.stage, Stage::Completed);

    let details = contracts::get_contract_details(&db, &actor(&f.client), f.contract.id)
        .await
        .unwrap();
    assert_eq!(details.contract.stage, Stage::Completed);
    let project = projects::get_project(&db, f.project.id).await.unwrap();
    assert_eq!(project.status, ProjectStatus::Completed);
}

#[tokio::test]
async fn test_concurrent_milestones_get_distinct_positions() {
    let db = setup_db().await;
    let f = accepted_contract(&db).await;

    let (a, b, c) = tokio::join!(
        add_milestone(&db, &f, "Design", 100.0),
        add_milestone(&db, &f, "Build", 200.0),
        add_milestone(&db, &f, "Launch", 150.0),
    );

    let mut positions = vec![a.position, b.position, c.position];
    positions.sort();
    assert_eq!(positions, vec![0, 1, 2]);

    let listed = milestones::list_milestones(&db, &actor(&f.client), f.contract.id)
        .await
        .unwrap();
    let ordered: Vec<_> = listed.iter().map(|m| m.position).collect();
    assert_eq!(ordered, vec![0, 1, 2]);
}
