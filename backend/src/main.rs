//! Ice Cream Directory - Backend Server

use std::{net::SocketAddr, sync::Arc, time::Duration};

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use icecream_directory_backend::{
    config::StoreBackend,
    create_app,
    external::{DisabledMailer, MailFunctionsClient, MailSender},
    store::{MemoryStore, PgStore, RecordStore},
    AppState, Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "icd_server=debug,icecream_directory_backend=debug,tower_http=debug,sqlx=warn"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Ice Cream Directory Server");
    tracing::info!("Environment: {}", config.environment);

    let store: Arc<dyn RecordStore> = match config.store.backend {
        StoreBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .acquire_timeout(Duration::from_secs(30))
                .connect(&config.database.url)
                .await?;

            tracing::info!("Database connection established");

            // Run migrations in development
            if config.is_development() {
                tracing::info!("Running database migrations...");
                sqlx::migrate!("./migrations").run(&db_pool).await?;
                tracing::info!("Migrations completed");
            }

            Arc::new(PgStore::new(db_pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let mailer: Arc<dyn MailSender> = if config.notifications.enabled {
        Arc::new(MailFunctionsClient::new(
            &config.notifications.functions_url,
            &config.notifications.api_key,
            Duration::from_secs(config.notifications.timeout_secs),
        )?)
    } else {
        tracing::info!("Notifications disabled");
        Arc::new(DisabledMailer)
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));

    // Build application
    let app = create_app(AppState::new(store, mailer, config));

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
