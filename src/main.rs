use std::sync::Arc;

use actix_multipart::form::MultipartFormConfig;
use actix_web::{App, HttpServer, web};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{Layer, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt};

use job_board::admin::AdminConsole;
use job_board::api::{routes, state::AppState};
use job_board::cli::{Cli, Command};
use job_board::config::Config;
use job_board::db::{self, MemoryStore, PgStore, Store};
use job_board::shutdown::ShutdownCoordinator;

fn other_error(message: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(message.to_string())
}

/// Console output plus daily rotating files per level:
/// logs/info.log.2024-12-22, logs/error.log.2024-12-22, ...
fn init_tracing(log_dir: &str) -> std::io::Result<()> {
    std::fs::create_dir_all(log_dir)?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    let info_layer = tracing_subscriber::fmt::layer()
        .with_writer(tracing_appender::rolling::daily(log_dir, "info.log"))
        .with_ansi(false)
        .with_filter(LevelFilter::INFO);

    let warn_layer = tracing_subscriber::fmt::layer()
        .with_writer(tracing_appender::rolling::daily(log_dir, "warn.log"))
        .with_ansi(false)
        .with_filter(LevelFilter::WARN);

    let error_layer = tracing_subscriber::fmt::layer()
        .with_writer(tracing_appender::rolling::daily(log_dir, "error.log"))
        .with_ansi(false)
        .with_filter(LevelFilter::ERROR);

    let debug_layer = tracing_subscriber::fmt::layer()
        .with_writer(tracing_appender::rolling::daily(log_dir, "debug.log"))
        .with_ansi(false)
        .with_filter(LevelFilter::DEBUG);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(info_layer)
        .with(warn_layer)
        .with(error_layer)
        .with(debug_layer)
        .init();
    Ok(())
}

async fn connect(config: &Config) -> std::io::Result<PgStore> {
    let database_url = config.require_database_url().map_err(other_error)?;
    let pool = db::connection::get_connection(database_url, config.max_db_connections)
        .await
        .map_err(other_error)?;
    info!("Database connection pool established");

    db::migrations::run_migrations(&pool)
        .await
        .map_err(other_error)?;
    Ok(PgStore::new(pool))
}

async fn serve(config: Config, in_memory: bool) -> std::io::Result<()> {
    info!("Starting job-board application");
    info!("Configuration loaded successfully:");
    info!("  - Bind address: {}:{}", config.host, config.port);
    info!("  - Max payload size: {} bytes", config.max_payload_size);
    info!("  - Max database connections: {}", config.max_db_connections);
    info!("  - Media root: {}", config.media_root.display());

    let store: Arc<dyn Store> = if in_memory {
        warn!("Using the in-memory store; all data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(connect(&config).await?)
    };

    let state = web::Data::new(AppState::new(store.clone(), &config));
    let max_payload_size = config.max_payload_size;

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(web::PayloadConfig::default().limit(max_payload_size))
            .app_data(web::FormConfig::default().limit(max_payload_size))
            .app_data(MultipartFormConfig::default().total_limit(max_payload_size))
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .disable_signals()
    .run();

    info!("Server starting on http://{}:{}", config.host, config.port);

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    ShutdownCoordinator::new(server_handle, server_task, store)
        .wait_for_shutdown()
        .await
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();
    init_tracing(&config.log_dir)?;

    match cli.command() {
        Command::Serve { in_memory } => serve(config, in_memory).await,
        Command::Migrate => {
            let store = connect(&config).await?;
            store.close().await;
            Ok(())
        }
        Command::Admin { command } => {
            let store: Arc<dyn Store> = Arc::new(connect(&config).await?);
            let console = AdminConsole::new(config.admin.clone(), store.clone());
            let result = console.run(command, &mut std::io::stdout()).await;
            store.close().await;
            result.map_err(other_error)
        }
    }
}
