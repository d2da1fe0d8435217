mod common;

use common::{actor, create_user, setup_db};
use sea_orm::ConnectionTrait;
use escrow_market_backend::db::{
    contracts as contract_db, notifications as notification_db, projects as project_db,
};
use escrow_market_backend::error::AppError;
use escrow_market_backend::models::bids::{BidStatus, CreateBidRequest};
use escrow_market_backend::models::contracts::Stage;
use escrow_market_backend::models::projects::{CreateProject, ProjectStatus};
use escrow_market_backend::models::users::Roles;
use escrow_market_backend::services::{bids, projects};

fn project_input(budget: f64) -> CreateProject {
    CreateProject {
        title: Some("Landing page".to_string()),
        description: Some("Marketing site with a contact form".to_string()),
        budget: Some(budget),
    }
}

fn bid_input(project_id: uuid::Uuid, amount: f64) -> CreateBidRequest {
    CreateBidRequest {
        project_id: Some(project_id),
        amount: Some(amount),
        delivery_time: Some(5),
        cover_letter: Some("I have built many of these.".to_string()),
    }
}

#[tokio::test]
async fn test_freelancer_can_bid_on_open_project() {
    let db = setup_db().await;
    let client = create_user(&db, "client@example.com", Roles::Client).await;
    let freelancer = create_user(&db, "free@example.com", Roles::Freelancer).await;

    let project = projects::create_project(&db, &actor(&client), project_input(500.0))
        .await
        .unwrap();
    assert_eq!(project.status, ProjectStatus::Open);

    let bid = bids::create_bid(&db, &actor(&freelancer), bid_input(project.id, 450.0))
        .await
        .unwrap();

    assert_eq!(bid.status, BidStatus::Pending);
    assert_eq!(bid.freelancer_id, freelancer.id);
    assert_eq!(bid.delivery_time, 5);

    // The project owner hears about it.
    assert_eq!(notification_db::count_unread(&db, client.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_bid_on_non_open_project_is_a_conflict() {
    let db = setup_db().await;
    let client = create_user(&db, "client@example.com", Roles::Client).await;
    let first = create_user(&db, "first@example.com", Roles::Freelancer).await;
    let late = create_user(&db, "late@example.com", Roles::Freelancer).await;

    let project = projects::create_project(&db, &actor(&client), project_input(500.0))
        .await
        .unwrap();
    let bid = bids::create_bid(&db, &actor(&first), bid_input(project.id, 450.0))
        .await
        .unwrap();
    bids::update_bid_status(&db, &actor(&client), bid.id, BidStatus::Accepted)
        .await
        .unwrap();

    let result = bids::create_bid(&db, &actor(&late), bid_input(project.id, 400.0)).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_clients_cannot_bid() {
    let db = setup_db().await;
    let client = create_user(&db, "client@example.com", Roles::Client).await;
    let project = projects::create_project(&db, &actor(&client), project_input(500.0))
        .await
        .unwrap();

    let result = bids::create_bid(&db, &actor(&client), bid_input(project.id, 450.0)).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn test_missing_bid_fields_are_validation_errors() {
    let db = setup_db().await;
    let client = create_user(&db, "client@example.com", Roles::Client).await;
    let freelancer = create_user(&db, "free@example.com", Roles::Freelancer).await;
    let project = projects::create_project(&db, &actor(&client), project_input(500.0))
        .await
        .unwrap();

    let mut input = bid_input(project.id, 450.0);
    input.cover_letter = None;
    let result = bids::create_bid(&db, &actor(&freelancer), input).await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let mut input = bid_input(project.id, 450.0);
    input.delivery_time = Some(0);
    let result = bids::create_bid(&db, &actor(&freelancer), input).await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let result = bids::create_bid(&db, &actor(&freelancer), bid_input(project.id, 0.0)).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_bid_on_missing_project_is_not_found() {
    let db = setup_db().await;
    let freelancer = create_user(&db, "free@example.com", Roles::Freelancer).await;

    let result = bids::create_bid(
        &db,
        &actor(&freelancer),
        bid_input(uuid::Uuid::new_v4(), 450.0),
    )
    .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_accepting_a_bid_creates_contract_and_starts_project() {
    let db = setup_db().await;
    let client = create_user(&db, "client@example.com", Roles::Client).await;
    let freelancer = create_user(&db, "free@example.com", Roles::Freelancer).await;

    let project = projects::create_project(&db, &actor(&client), project_input(500.0))
        .await
        .unwrap();
    let bid = bids::create_bid(&db, &actor(&freelancer), bid_input(project.id, 450.0))
        .await
        .unwrap();

    let decision = bids::update_bid_status(&db, &actor(&client), bid.id, BidStatus::Accepted)
        .await
        .unwrap();

    assert_eq!(decision.bid.status, BidStatus::Accepted);
    let contract = decision.contract.expect("acceptance creates a contract");
    assert_eq!(contract.stage, Stage::Approval);
    assert!(!contract.terms_accepted);
    assert_eq!(contract.amount, 450.0);
    assert_eq!(contract.client_id, client.id);
    assert_eq!(contract.freelancer_id, freelancer.id);

    let project = projects::get_project(&db, project.id).await.unwrap();
    assert_eq!(project.status, ProjectStatus::InProgress);

    // Accepted bids cannot be decided again.
    let again = bids::update_bid_status(&db, &actor(&client), bid.id, BidStatus::Rejected).await;
    assert!(matches!(again, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_second_acceptance_on_same_project_is_refused() {
    let db = setup_db().await;
    let client = create_user(&db, "client@example.com", Roles::Client).await;
    let a = create_user(&db, "a@example.com", Roles::Freelancer).await;
    let b = create_user(&db, "b@example.com", Roles::Freelancer).await;

    let project = projects::create_project(&db, &actor(&client), project_input(500.0))
        .await
        .unwrap();
    let bid_a = bids::create_bid(&db, &actor(&a), bid_input(project.id, 450.0))
        .await
        .unwrap();
    let bid_b = bids::create_bid(&db, &actor(&b), bid_input(project.id, 420.0))
        .await
        .unwrap();

    bids::update_bid_status(&db, &actor(&client), bid_a.id, BidStatus::Accepted)
        .await
        .unwrap();
    let result = bids::update_bid_status(&db, &actor(&client), bid_b.id, BidStatus::Accepted).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    // Only one contract exists for the client.
    let contracts = contract_db::get_contracts_for_user(&db, client.id).await.unwrap();
    assert_eq!(contracts.len(), 1);
    assert_eq!(contracts[0].bid_id, bid_a.id);
}

#[tokio::test]
async fn test_only_project_owner_decides_bids() {
    let db = setup_db().await;
    let owner = create_user(&db, "owner@example.com", Roles::Client).await;
    let other = create_user(&db, "other@example.com", Roles::Client).await;
    let freelancer = create_user(&db, "free@example.com", Roles::Freelancer).await;

    let project = projects::create_project(&db, &actor(&owner), project_input(500.0))
        .await
        .unwrap();
    let bid = bids::create_bid(&db, &actor(&freelancer), bid_input(project.id, 450.0))
        .await
        .unwrap();

    let result = bids::update_bid_status(&db, &actor(&other), bid.id, BidStatus::Accepted).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let pending = bids::update_bid_status(&db, &actor(&owner), bid.id, BidStatus::Pending).await;
    assert!(matches!(pending, Err(AppError::Validation(_))));

    let rejected = bids::update_bid_status(&db, &actor(&owner), bid.id, BidStatus::Rejected)
        .await
        .unwrap();
    assert_eq!(rejected.bid.status, BidStatus::Rejected);
    assert!(rejected.contract.is_none());

    let listed = bids::list_client_bids(&db, &actor(&owner)).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(bids::list_client_bids(&db, &actor(&other)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_acceptances_pick_one_winner() {
    let db = setup_db().await;
    let client = create_user(&db, "client@example.com", Roles::Client).await;
    let a = create_user(&db, "a@example.com", Roles::Freelancer).await;
    let b = create_user(&db, "b@example.com", Roles::Freelancer).await;

    let project = projects::create_project(&db, &actor(&client), project_input(500.0))
        .await
        .unwrap();
    let bid_a = bids::create_bid(&db, &actor(&a), bid_input(project.id, 450.0))
        .await
        .unwrap();
    let bid_b = bids::create_bid(&db, &actor(&b), bid_input(project.id, 420.0))
        .await
        .unwrap();

    let client_actor = actor(&client);
    let (first, second) = tokio::join!(
        bids::update_bid_status(&db, &client_actor, bid_a.id, BidStatus::Accepted),
        bids::update_bid_status(&db, &client_actor, bid_b.id, BidStatus::Accepted),
    );

    let wins = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1);
    assert!(
        matches!(first, Err(AppError::Conflict(_))) || matches!(second, Err(AppError::Conflict(_)))
    );

    let contracts = contract_db::get_contracts_for_user(&db, client.id).await.unwrap();
    assert_eq!(contracts.len(), 1);

    let project = projects::get_project(&db, project.id).await.unwrap();
    assert_eq!(project.status, ProjectStatus::InProgress);
}

#[tokio::test]
async fn test_claiming_a_project_only_succeeds_while_open() {
    let db = setup_db().await;
    let client = create_user(&db, "client@example.com", Roles::Client).await;
    let project = projects::create_project(&db, &actor(&client), project_input(500.0))
        .await
        .unwrap();

    assert!(project_db::claim_open_project(&db, project.id).await.unwrap());
    assert!(!project_db::claim_open_project(&db, project.id).await.unwrap());
    assert!(!project_db::claim_open_project(&db, uuid::Uuid::new_v4()).await.unwrap());
}

#[tokio::test]
async fn test_acceptance_commits_even_if_notifications_fail() {
    let db = setup_db().await;
    let client = create_user(&db, "client@example.com", Roles::Client).await;
    let freelancer = create_user(&db, "free@example.com", Roles::Freelancer).await;

    let project = projects::create_project(&db, &actor(&client), project_input(500.0))
        .await
        .unwrap();
    let bid = bids::create_bid(&db, &actor(&freelancer), bid_input(project.id, 450.0))
        .await
        .unwrap();

    db.execute_unprepared("DROP TABLE notifications").await.unwrap();

    let decision = bids::update_bid_status(&db, &actor(&client), bid.id, BidStatus::Accepted)
        .await
        .unwrap();
    assert!(decision.contract.is_some());

    let contracts = contract_db::get_contracts_for_user(&db, client.id).await.unwrap();
    assert_eq!(contracts.len(), 1);
    let project = projects::get_project(&db, project.id).await.unwrap();
    assert_eq!(project.status, ProjectStatus::InProgress);
}
