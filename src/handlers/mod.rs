pub mod auth;
pub mod bids;
pub mod contracts;
pub mod invoices;
pub mod milestones;
pub mod notifications;
pub mod payments;
pub mod projects;

use actix_web::web;

use crate::error::{json_error_handler, path_error_handler, query_error_handler};

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // Malformed bodies, paths and queries all surface as 400 {"error": ...}.
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler));

    // ── Auth routes ──
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(auth::register))
            .route("/login", web::post().to(auth::login))
            .route("/me", web::get().to(auth::me))
            .route("/logout", web::post().to(auth::logout)),
    );

    // ── Everything below requires a session (AuthenticatedUser extractor) ──
    cfg.service(
        web::scope("/projects")
            .route("", web::get().to(projects::get_projects))
            .route("", web::post().to(projects::create_project))
            .route("/{id}", web::get().to(projects::get_project)),
    );

    cfg.service(
        web::resource("/bids")
            .route(web::get().to(bids::get_my_bids))
            .route(web::post().to(bids::create_bid)),
    );
    cfg.service(
        web::resource("/client/bids")
            .route(web::get().to(bids::get_client_bids))
            .route(web::patch().to(bids::update_bid_status)),
    );

    cfg.service(
        web::scope("/contracts")
            .route("", web::get().to(contracts::get_contracts))
            .route("/{id}", web::get().to(contracts::get_contract))
            .route("/{id}/accept", web::put().to(contracts::accept_terms))
            .route("/{id}/stage", web::put().to(contracts::update_stage))
            .route("/{id}/complete", web::post().to(contracts::complete_contract))
            .route("/{id}/payment", web::post().to(contracts::create_escrow))
            .route("/{id}/milestones", web::get().to(contracts::get_milestones))
            .route("/{id}/milestones", web::post().to(contracts::create_milestone)),
    );

    cfg.service(
        web::scope("/milestones")
            .route("/{id}", web::patch().to(milestones::update_status))
            .route("/{id}/request-payment", web::post().to(milestones::request_payment)),
    );

    // The webhook is signature-checked instead of session-checked.
    cfg.service(
        web::scope("/payments")
            .route("/create-intent", web::post().to(payments::create_intent))
            .route("/webhook", web::post().to(payments::webhook)),
    );

    // mark-all-read must be registered before /{id}.
    cfg.service(
        web::scope("/notifications")
            .route("", web::get().to(notifications::get_notifications))
            .route("/mark-all-read", web::patch().to(notifications::mark_all_read))
            .route("/{id}", web::patch().to(notifications::mark_read)),
    );

    cfg.service(
        web::scope("/invoices")
            .route("", web::get().to(invoices::get_invoices))
            .route("/{id}/download", web::get().to(invoices::download_invoice)),
    );
}
