#![allow(dead_code)]

use async_trait::async_trait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Mutex;

use escrow_market_backend::auth::Actor;
use escrow_market_backend::auth::password::hash_password;
use escrow_market_backend::db::users as user_db;
use escrow_market_backend::models::bids::{BidStatus, CreateBidRequest};
use escrow_market_backend::models::milestones::{self, CreateMilestone};
use escrow_market_backend::models::projects::{self, CreateProject};
use escrow_market_backend::models::contracts;
use escrow_market_backend::models::users::{self, CreateUser, Roles};
use escrow_market_backend::services::{
    bids as bids_service, milestones as milestones_service, projects as projects_service,
};
use escrow_market_backend::payments::{
    CheckoutRequest, CheckoutSession, PaymentError, PaymentIntent, PaymentIntentRequest,
    PaymentProvider,
};
use migration::{Migrator, MigratorTrait};

/// Fresh in-memory database with all migrations applied. A single pooled
/// connection keeps every query on the same SQLite memory instance.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub async fn create_user(db: &DatabaseConnection, email: &str, role: Roles) -> users::Model {
    user_db::insert_user(
        db,
        CreateUser {
            email: email.to_string(),
            password_hash: hash_password("correct horse battery").unwrap(),
            display_name: Some(email.split('@').next().unwrap_or(email).to_string()),
            role,
        },
    )
    .await
    .unwrap()
}

pub fn actor(user: &users::Model) -> Actor {
    Actor::new(user.id, user.role)
}

/// Records every provider call and hands out predictable identifiers.
#[derive(Default)]
pub struct FakeProvider {
    pub checkouts: Mutex<Vec<CheckoutRequest>>,
    pub intents: Mutex<Vec<PaymentIntentRequest>>,
}

#[async_trait]
impl PaymentProvider for FakeProvider {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let mut checkouts = self.checkouts.lock().unwrap();
        checkouts.push(request);
        let n = checkouts.len();

        Ok(CheckoutSession {
            id: format!("cs_test_{n}"),
            url: format!("https://checkout.test/pay/cs_test_{n}"),
            payment_intent: Some(format!("pi_checkout_{n}")),
        })
    }

    async fn create_payment_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> Result<PaymentIntent, PaymentError> {
        let mut intents = self.intents.lock().unwrap();
        intents.push(request);
        let n = intents.len();

        Ok(PaymentIntent {
            id: format!("pi_test_{n}"),
            client_secret: format!("pi_test_{n}_secret"),
        })
    }
}

pub struct ContractFixture {
    pub client: users::Model,
    pub freelancer: users::Model,
    pub project: projects::Model,
    pub contract: contracts::Model,
}

/// Client posts a project (budget 500), freelancer bids 450 over 5 days,
/// client accepts.
pub async fn accepted_contract(db: &DatabaseConnection) -> ContractFixture {
    let client = create_user(db, "client@example.com", Roles::Client).await;
    let freelancer = create_user(db, "freelancer@example.com", Roles::Freelancer).await;

    let project = projects_service::create_project(
        db,
        &actor(&client),
        CreateProject {
            title: Some("Mobile app".to_string()),
            description: Some("An app for booking appointments".to_string()),
            budget: Some(500.0),
        },
    )
    .await
    .unwrap();

    let bid = bids_service::create_bid(
        db,
        &actor(&freelancer),
        CreateBidRequest {
            project_id: Some(project.id),
            amount: Some(450.0),
            delivery_time: Some(5),
            cover_letter: Some("Happy to help.".to_string()),
        },
    )
    .await
    .unwrap();

    let contract = bids_service::update_bid_status(db, &actor(&client), bid.id, BidStatus::Accepted)
        .await
        .unwrap()
        .contract
        .unwrap();

    ContractFixture {
        client,
        freelancer,
        project,
        contract,
    }
}

pub async fn add_milestone(
    db: &DatabaseConnection,
    fixture: &ContractFixture,
    title: &str,
    amount: f64,
) -> milestones::Model {
    milestones_service::create_milestone(
        db,
        &actor(&fixture.client),
        fixture.contract.id,
        CreateMilestone {
            title: Some(title.to_string()),
            description: None,
            amount: Some(amount),
        },
    )
    .await
    .unwrap()
}
