use sea_orm::Database;
use tracing::info;

use yamdb_auth_types::identity::JwtSecret;
use yamdb_core::config::Config;
use yamdb_core::tracing::init_tracing;

use yamdb_api::config::ApiConfig;
use yamdb_api::infra::mail::MailTransport;
use yamdb_api::router::build_router;
use yamdb_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::from_env().expect("failed to load api config");

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let mailer = MailTransport::from_config(config.mail_relay_url.as_deref(), &config.mail_from);
    if config.mail_relay_url.is_none() {
        info!("MAIL_RELAY_URL unset, confirmation codes will be logged");
    }

    let state = AppState {
        db,
        jwt_secret: JwtSecret::new(config.jwt_secret),
        access_token_ttl_secs: config.access_token_ttl_secs,
        mailer,
    };

    let router = build_router(state);
    let http_addr = format!("0.0.0.0:{}", config.api_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!("api service listening on {http_addr}");
    axum::serve(listener, router).await.expect("server error");
}
