use std::sync::Arc;

use auth::Authenticator;
use auth::PasswordHasher;
use auth_service::config::Config;
use auth_service::domain::auth::ports::AuthServicePort;
use auth_service::domain::auth::ports::DirectoryCache;
use auth_service::domain::auth::ports::EventNotifier;
use auth_service::domain::auth::service::AuthService;
use auth_service::inbound::http::router::create_router;
use auth_service::outbound::cache::NoopDirectoryCache;
use auth_service::outbound::cache::RedisDirectoryCache;
use auth_service::outbound::events::KafkaEventNotifier;
use auth_service::outbound::events::NoopEventNotifier;
use auth_service::outbound::repositories::PostgresServiceKeyStore;
use auth_service::outbound::repositories::PostgresSessionStore;
use auth_service::outbound::repositories::PostgresUserDirectory;
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "auth-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        access_token_ttl_minutes = config.jwt.access_token_ttl_minutes,
        refresh_token_ttl_hours = config.jwt.refresh_token_ttl_hours,
        cache_enabled = config.cache.redis_url.is_some(),
        kafka_enabled = config.kafka.brokers.is_some(),
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let password_hasher = PasswordHasher::with_cost(
        config.password.memory_kib,
        config.password.iterations,
        config.password.parallelism,
    )?;
    let authenticator = Arc::new(
        Authenticator::new(
            config.jwt.secret.as_bytes(),
            config.jwt.access_token_ttl(),
            config.jwt.refresh_token_ttl(),
        )
        .with_password_hasher(password_hasher),
    );

    let cache: Box<dyn DirectoryCache> = match &config.cache.redis_url {
        Some(url) => match RedisDirectoryCache::connect(url).await {
            Ok(cache) => Box::new(cache),
            Err(e) => {
                tracing::error!(error = %e, "Redis unavailable, continuing without cache");
                Box::new(NoopDirectoryCache)
            }
        },
        None => Box::new(NoopDirectoryCache),
    };

    let notifier: Box<dyn EventNotifier> = match &config.kafka.brokers {
        Some(brokers) => Box::new(KafkaEventNotifier::new(brokers, &config.kafka)?),
        None => {
            tracing::info!("No Kafka brokers configured, events will not be published");
            Box::new(NoopEventNotifier)
        }
    };

    let auth_service: Arc<dyn AuthServicePort> = Arc::new(AuthService::new(
        Arc::new(PostgresUserDirectory::new(pg_pool.clone())),
        Arc::new(PostgresSessionStore::new(pg_pool.clone())),
        Arc::new(PostgresServiceKeyStore::new(pg_pool)),
        Arc::new(cache),
        Arc::new(notifier),
        authenticator,
        config.cache.settings(),
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(auth_service, config.server.request_timeout());
    axum::serve(http_listener, http_application)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server exited successfully");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
