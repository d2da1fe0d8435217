use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use escrow_market_backend::cache::UserCache;
use escrow_market_backend::config::AppConfig;
use escrow_market_backend::create_pool;
use escrow_market_backend::handlers;
use escrow_market_backend::payments::PaymentProvider;
use escrow_market_backend::payments::stripe::StripeClient;
use migration::{Migrator, MigratorTrait};
use std::io;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = AppConfig::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let db = create_pool(&config.database_url)
        .await
        .map_err(|e| io::Error::other(format!("Failed to connect to database: {e}")))?;

    if config.run_migrations {
        Migrator::up(&db, None)
            .await
            .map_err(|e| io::Error::other(format!("Failed to run migrations: {e}")))?;
        tracing::info!("Migrations applied");
    }

    let db_data = web::Data::new(db);
    let session_data = web::Data::new(config.session.clone());
    let payment_data = web::Data::new(config.payments.clone());
    let user_cache = web::Data::new(UserCache::new(&config.cache));

    let provider: Arc<dyn PaymentProvider> = Arc::new(StripeClient::new(config.payments.clone()));
    let provider_data: web::Data<dyn PaymentProvider> = web::Data::from(provider);

    let allowed_origin = config.payments.app_base_url.clone();
    let bind_addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Server running at http://{bind_addr}");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&allowed_origin)
            .supports_credentials()
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(db_data.clone())
            .app_data(session_data.clone())
            .app_data(payment_data.clone())
            .app_data(user_cache.clone())
            .app_data(provider_data.clone())
            .service(web::scope("/api").configure(handlers::init_routes))
    })
    .bind(&bind_addr)?
    .run()
    .await
}
