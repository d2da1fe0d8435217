mod common;

use common::{FakeProvider, accepted_contract, actor, add_milestone, setup_db};
use sea_orm::ConnectionTrait;
use escrow_market_backend::db::{invoices as invoice_db, payments as payment_db};
use escrow_market_backend::error::AppError;
use escrow_market_backend::models::contracts::Stage;
use escrow_market_backend::models::milestones::MilestoneStatus;
use escrow_market_backend::models::payments::PaymentStatus;
use escrow_market_backend::models::projects::ProjectStatus;
use escrow_market_backend::payments::CaptureMethod;
use escrow_market_backend::services::{contracts, invoices, milestones, payments};

#[tokio::test]
async fn test_full_escrow_scenario() {
    let db = setup_db().await;
    let provider = FakeProvider::default();
    let f = accepted_contract(&db).await;
    assert_eq!(f.project.budget, 500.0);
    assert_eq!(f.contract.stage, Stage::Approval);
    assert_eq!(f.contract.amount, 450.0);

    let milestone = add_milestone(&db, &f, "Deliver app", 450.0).await;

    let redirect = payments::request_payment(&db, &provider, &actor(&f.client), milestone.id)
        .await
        .unwrap();
    assert_eq!(redirect.url, "https://checkout.test/pay/cs_test_1");
    assert_eq!(redirect.redirect_url, redirect.url);
    assert_eq!(provider.checkouts.lock().unwrap()[0].amount_minor, 45_000);

    let payment = payment_db::get_payment_by_milestone(&db, milestone.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.amount, milestone.amount);
    assert_eq!(payment.payment_intent_id, "pi_checkout_1");

    // Simulated provider confirmation.
    let confirmed = payments::confirm_payment(
        &db,
        &["pi_checkout_1".to_string(), "cs_test_1".to_string()],
        PaymentStatus::Completed,
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(confirmed.status, PaymentStatus::Completed);

    let invoice = invoice_db::get_invoice_by_payment(&db, payment.id)
        .await
        .unwrap()
        .expect("completion issues an invoice");
    assert_eq!(invoice.amount, 450.0);
    assert!(invoice.invoice_number.starts_with("INV-"));

    milestones::update_milestone_status(
        &db,
        &actor(&f.freelancer),
        milestone.id,
        MilestoneStatus::Completed,
    )
    .await
    .unwrap();

    let completion = contracts::complete(&db, &actor(&f.client), f.contract.id)
        .await
        .unwrap();
    assert_eq!(completion.contract.stage, Stage::Completed);
    assert_eq!(completion.project.status, ProjectStatus::Completed);

    let details = contracts::get_contract_details(&db, &actor(&f.freelancer), f.contract.id)
        .await
        .unwrap();
    assert!(details.all_milestones_completed());
    assert_eq!(
        details.milestones[0].payment.as_ref().map(|p| p.status),
        Some(PaymentStatus::Completed)
    );
}

#[tokio::test]
async fn test_confirmation_is_idempotent_and_terminal() {
    let db = setup_db().await;
    let provider = FakeProvider::default();
    let f = accepted_contract(&db).await;
    let milestone = add_milestone(&db, &f, "Design", 120.5).await;

    payments::request_payment(&db, &provider, &actor(&f.client), milestone.id)
        .await
        .unwrap();
    let handle = vec!["pi_checkout_1".to_string()];

    payments::confirm_payment(&db, &handle, PaymentStatus::Completed)
        .await
        .unwrap();
    payments::confirm_payment(&db, &handle, PaymentStatus::Completed)
        .await
        .unwrap();
    let late = payments::confirm_payment(&db, &handle, PaymentStatus::Processing)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(late.status, PaymentStatus::Completed);

    let listed = invoices::list_invoices(&db, &actor(&f.client)).await.unwrap();
    assert_eq!(listed.len(), 1);

    // Paying a paid milestone again is refused.
    let again = payments::request_payment(&db, &provider, &actor(&f.client), milestone.id).await;
    assert!(matches!(again, Err(AppError::Conflict(_))));

    let unknown = payments::confirm_payment(&db, &["pi_nope".to_string()], PaymentStatus::Completed)
        .await
        .unwrap();
    assert!(unknown.is_none());
}

#[tokio::test]
async fn test_only_client_requests_payment() {
    let db = setup_db().await;
    let provider = FakeProvider::default();
    let f = accepted_contract(&db).await;
    let milestone = add_milestone(&db, &f, "Design", 100.0).await;

    let result =
        payments::request_payment(&db, &provider, &actor(&f.freelancer), milestone.id).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert!(provider.checkouts.lock().unwrap().is_empty());

    let missing =
        payments::request_payment(&db, &provider, &actor(&f.client), uuid::Uuid::new_v4()).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_repeated_request_reuses_open_payment() {
    let db = setup_db().await;
    let provider = FakeProvider::default();
    let f = accepted_contract(&db).await;
    let milestone = add_milestone(&db, &f, "Design", 99.99).await;

    payments::request_payment(&db, &provider, &actor(&f.client), milestone.id)
        .await
        .unwrap();
    let first = payment_db::get_payment_by_milestone(&db, milestone.id)
        .await
        .unwrap()
        .unwrap();

    payments::request_payment(&db, &provider, &actor(&f.client), milestone.id)
        .await
        .unwrap();
    let second = payment_db::get_payment_by_milestone(&db, milestone.id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.payment_intent_id, "pi_checkout_2");
    assert_eq!(second.amount, 99.99);
    assert_eq!(provider.checkouts.lock().unwrap()[1].amount_minor, 9_999);

    // The abandoned first checkout can still complete the payment.
    let confirmed = payments::confirm_payment(
        &db,
        &["pi_checkout_1".to_string()],
        PaymentStatus::Completed,
    )
    .await
    .unwrap()
    .expect("earlier handles stay matchable");
    assert_eq!(confirmed.id, first.id);
    assert_eq!(confirmed.status, PaymentStatus::Completed);
}

#[tokio::test]
async fn test_request_while_processing_is_refused_and_intent_still_confirms() {
    let db = setup_db().await;
    let provider = FakeProvider::default();
    let f = accepted_contract(&db).await;
    let milestone = add_milestone(&db, &f, "Build", 300.0).await;

    payments::request_payment(&db, &provider, &actor(&f.client), milestone.id)
        .await
        .unwrap();
    payments::create_payment_intent(&db, &provider, &actor(&f.client), milestone.id, 300.0)
        .await
        .unwrap();

    let again = payments::request_payment(&db, &provider, &actor(&f.client), milestone.id).await;
    assert!(matches!(again, Err(AppError::Conflict(_))));
    assert_eq!(provider.checkouts.lock().unwrap().len(), 1);

    let confirmed = payments::confirm_payment(
        &db,
        &["pi_test_1".to_string()],
        PaymentStatus::Completed,
    )
    .await
    .unwrap()
    .expect("the in-flight intent is matched");
    assert_eq!(confirmed.status, PaymentStatus::Completed);
    assert_eq!(confirmed.payment_intent_id, "pi_test_1");

    let listed = invoices::list_invoices(&db, &actor(&f.client)).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn test_checkout_handle_still_confirms_after_intent() {
    let db = setup_db().await;
    let provider = FakeProvider::default();
    let f = accepted_contract(&db).await;
    let milestone = add_milestone(&db, &f, "Build", 300.0).await;

    payments::request_payment(&db, &provider, &actor(&f.client), milestone.id)
        .await
        .unwrap();
    payments::create_payment_intent(&db, &provider, &actor(&f.client), milestone.id, 300.0)
        .await
        .unwrap();

    let confirmed = payments::confirm_payment(
        &db,
        &["pi_checkout_1".to_string(), "cs_test_1".to_string()],
        PaymentStatus::Completed,
    )
    .await
    .unwrap()
    .expect("the checkout handle is still recorded");
    assert_eq!(confirmed.status, PaymentStatus::Completed);
}

#[tokio::test]
async fn test_create_intent_requires_matching_amount() {
    let db = setup_db().await;
    let provider = FakeProvider::default();
    let f = accepted_contract(&db).await;
    let milestone = add_milestone(&db, &f, "Deliver app", 450.0).await;

    payments::request_payment(&db, &provider, &actor(&f.client), milestone.id)
        .await
        .unwrap();

    let cheap =
        payments::create_payment_intent(&db, &provider, &actor(&f.client), milestone.id, 0.01)
            .await;
    assert!(matches!(cheap, Err(AppError::Validation(_))));
    assert!(provider.intents.lock().unwrap().is_empty());

    let payment = payment_db::get_payment_by_milestone(&db, milestone.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.payment_intent_id, "pi_checkout_1");

    // Sub-cent differences round to the same minor units.
    payments::create_payment_intent(&db, &provider, &actor(&f.client), milestone.id, 450.001)
        .await
        .unwrap();
    assert_eq!(provider.intents.lock().unwrap()[0].amount_minor, 45_000);
}

#[tokio::test]
async fn test_freelancer_cannot_create_intent() {
    let db = setup_db().await;
    let provider = FakeProvider::default();
    let f = accepted_contract(&db).await;
    let milestone = add_milestone(&db, &f, "Design", 100.0).await;

    payments::request_payment(&db, &provider, &actor(&f.client), milestone.id)
        .await
        .unwrap();

    let result =
        payments::create_payment_intent(&db, &provider, &actor(&f.freelancer), milestone.id, 100.0)
            .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert!(provider.intents.lock().unwrap().is_empty());

    let payment = payment_db::get_payment_by_milestone(&db, milestone.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Pending);
}

#[tokio::test]
async fn test_confirmation_commits_even_if_notifications_fail() {
    let db = setup_db().await;
    let provider = FakeProvider::default();
    let f = accepted_contract(&db).await;
    let milestone = add_milestone(&db, &f, "Design", 100.0).await;

    payments::request_payment(&db, &provider, &actor(&f.client), milestone.id)
        .await
        .unwrap();
    db.execute_unprepared("DROP TABLE notifications").await.unwrap();

    payments::confirm_payment(&db, &["pi_checkout_1".to_string()], PaymentStatus::Completed)
        .await
        .unwrap();

    let payment = payment_db::get_payment_by_milestone(&db, milestone.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Completed);
    assert!(invoice_db::get_invoice_by_payment(&db, payment.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_create_intent_marks_payment_processing() {
    let db = setup_db().await;
    let provider = FakeProvider::default();
    let f = accepted_contract(&db).await;
    let milestone = add_milestone(&db, &f, "Build", 1234.56).await;

    // No payment yet.
    let missing = payments::create_payment_intent(
        &db,
        &provider,
        &actor(&f.client),
        milestone.id,
        1234.56,
    )
    .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    payments::request_payment(&db, &provider, &actor(&f.client), milestone.id)
        .await
        .unwrap();

    let secret = payments::create_payment_intent(
        &db,
        &provider,
        &actor(&f.client),
        milestone.id,
        1234.56,
    )
    .await
    .unwrap();
    assert_eq!(secret.client_secret, "pi_test_1_secret");

    let intents = provider.intents.lock().unwrap().clone();
    assert_eq!(intents[0].amount_minor, 123_456);
    assert_eq!(intents[0].capture, CaptureMethod::Automatic);

    let payment = payment_db::get_payment_by_milestone(&db, milestone.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.id, secret.payment_id);
    assert_eq!(payment.status, PaymentStatus::Processing);
    assert_eq!(payment.payment_intent_id, "pi_test_1");
}

#[tokio::test]
async fn test_escrow_hold_checks_freelancer() {
    let db = setup_db().await;
    let provider = FakeProvider::default();
    let f = accepted_contract(&db).await;

    let wrong = payments::create_escrow(
        &db,
        &provider,
        &actor(&f.client),
        f.contract.id,
        450.0,
        f.client.id,
    )
    .await;
    assert!(matches!(wrong, Err(AppError::Validation(_))));

    let secret = payments::create_escrow(
        &db,
        &provider,
        &actor(&f.client),
        f.contract.id,
        450.0,
        f.freelancer.id,
    )
    .await
    .unwrap();
    assert_eq!(secret.client_secret, "pi_test_1_secret");

    let intents = provider.intents.lock().unwrap().clone();
    assert_eq!(intents.len(), 1);
    assert_eq!(intents[0].capture, CaptureMethod::Manual);
    assert!(
        intents[0]
            .metadata
            .contains(&("contract_id".to_string(), f.contract.id.to_string()))
    );
}

#[tokio::test]
async fn test_invoice_download_is_party_only() {
    let db = setup_db().await;
    let provider = FakeProvider::default();
    let f = accepted_contract(&db).await;
    let milestone = add_milestone(&db, &f, "Deliver app", 450.0).await;

    payments::request_payment(&db, &provider, &actor(&f.client), milestone.id)
        .await
        .unwrap();
    // Checkout completion events carry both the intent and the session id.
    payments::confirm_payment(
        &db,
        &["pi_checkout_1".to_string(), "cs_test_1".to_string()],
        PaymentStatus::Completed,
    )
    .await
    .unwrap();

    let invoice = invoices::list_invoices(&db, &actor(&f.freelancer))
        .await
        .unwrap()
        .remove(0);

    let (loaded, pdf) = invoices::download_invoice(&db, &actor(&f.client), invoice.id, "usd")
        .await
        .unwrap();
    assert_eq!(loaded.id, invoice.id);
    assert!(pdf.starts_with(b"%PDF"));

    let stranger = common::create_user(
        &db,
        "stranger@example.com",
        escrow_market_backend::models::users::Roles::Client,
    )
    .await;
    let result = invoices::download_invoice(&db, &actor(&stranger), invoice.id, "usd").await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}
