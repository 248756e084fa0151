//! Box office access-control HTTP server.
//!
//! Wires the Redis directory, the `PostgreSQL` local identity table, the
//! identity provider and the image bucket into the access and event routers.

mod config;

use axum::{Router, middleware, routing::get};
use boxoffice_auth::handlers::{AccessState, EventState};
use boxoffice_auth::providers::{
    CloudStorageBlobStore, CloudStorageConfig, IdentityToolkitConfig, IdentityToolkitProvider,
};
use boxoffice_auth::router::{access_router, event_router};
use boxoffice_auth::stores::{PostgresLocalIdentityRepository, RedisDocumentStore};
use boxoffice_auth::{AccessEnvironment, SystemClock};
use boxoffice_web::{handlers::health_check, request_context};
use config::Config;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "boxoffice=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting box office access server");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        redis_url = %config.redis.url,
        project_id = %config.identity.project_id,
        bucket = %config.storage.bucket,
        "Configuration loaded"
    );

    // Directory store
    info!("Connecting to Redis directory...");
    let store = RedisDocumentStore::new(&config.redis.url).await?;
    info!("Directory connected");

    // Local identity table
    info!("Connecting to local identity database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.postgres.max_connections)
        .acquire_timeout(Duration::from_secs(config.postgres.connect_timeout))
        .connect(&config.postgres.url)
        .await?;
    let locals = PostgresLocalIdentityRepository::new(pool);
    if config.postgres.run_migrations {
        locals.migrate().await?;
        info!("Local identity migrations applied");
    }

    // Identity provider
    let mut identity_config = IdentityToolkitConfig::new(
        config.identity.api_key.clone(),
        config.identity.project_id.clone(),
        config.identity.access_token.clone(),
    );
    if let Some(base_url) = &config.identity.base_url {
        warn!(base_url = %base_url, "Using identity provider endpoint override");
        identity_config = identity_config.with_base_url(base_url.clone());
    }
    let identity = IdentityToolkitProvider::new(identity_config);

    // Event image bucket
    let mut storage_config = CloudStorageConfig::new(
        config.storage.bucket.clone(),
        config.storage.access_token.clone(),
    );
    if let Some(api_url) = &config.storage.api_url {
        warn!(api_url = %api_url, "Using storage endpoint override");
        storage_config = storage_config.with_api_url(api_url.clone());
    }
    if let Some(public_url) = &config.storage.public_url {
        storage_config = storage_config.with_public_url(public_url.clone());
    }
    let blobs = CloudStorageBlobStore::new(storage_config);

    let env = AccessEnvironment::new(identity, store, locals, Arc::new(SystemClock));

    // Build router
    let api = access_router(AccessState::new(env.clone()))
        .merge(event_router(EventState::new(env, blobs)));
    let app = Router::new()
        .route("/health", get(health_check))
        .nest(&config.server.api_prefix, api)
        .layer(middleware::from_fn(request_context))
        .layer(TraceLayer::new_for_http());

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Server listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
