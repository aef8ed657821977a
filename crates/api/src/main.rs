use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use courier_dispatch::channels::{EmailChannel, EmailConfig, WebhookChannel, WebhookConfig};
use courier_dispatch::preferences::StorePermissionOracle;
use courier_dispatch::template::StaticTemplates;
use courier_dispatch::{bootstrap, ChannelHandler, Dispatcher};

use courier_api::config::ServerConfig;
use courier_api::router::build_app_router;
use courier_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "courier_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = courier_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    courier_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    courier_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Channel handlers ---
    // Pre-rendered message templates for the email channel. Missing
    // directory just means no templates, which the email channel reports
    // per delivery.
    let templates = match StaticTemplates::from_dir(&config.template_dir) {
        Ok(templates) => templates,
        Err(e) => {
            tracing::warn!(dir = %config.template_dir, error = %e, "Template directory unavailable");
            StaticTemplates::new()
        }
    };
    let templates = Arc::new(templates);

    let mut handlers: Vec<Arc<dyn ChannelHandler>> = Vec::new();
    match EmailConfig::from_env() {
        Some(email_config) => {
            handlers.push(Arc::new(EmailChannel::new(email_config, templates)));
        }
        None => tracing::info!("SMTP_HOST not set, email channel disabled"),
    }
    match WebhookConfig::from_env() {
        Some(webhook_config) => {
            handlers.push(Arc::new(WebhookChannel::new(webhook_config)));
        }
        None => tracing::info!("WEBHOOK_URL not set, webhook channel disabled"),
    }

    // --- Bootstrap ---
    let registry = bootstrap::bootstrap(&pool, handlers)
        .await
        .expect("Channel bootstrap failed");

    let dispatcher = Arc::new(Dispatcher::new(pool.clone(), Arc::new(registry)));
    let oracle = Arc::new(StorePermissionOracle::new(pool.clone()));

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        dispatcher,
        oracle,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
