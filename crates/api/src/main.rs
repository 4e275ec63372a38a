mod config;
mod error;
mod extract;
mod filter;
mod handlers;
mod middleware;
mod models;
mod openai;
mod repos;
mod services;
mod state;
mod stores;
#[cfg(test)]
mod test_utils;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{Router, http};
use chrono::Duration;
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    config::Config,
    repos::{PgLeadRepo, Repos},
    services::{
        CaptchaVerifier, CompletionService, EmailSenderImpl, OpenAiCompletion, RecaptchaVerifier,
    },
    state::AppState,
    stores::{CooldownTracker, FixedWindowLimiter, RedisBackedQuota, Stores},
};

#[derive(Parser)]
#[command(name = "api")]
#[command(about = "Domus AI API server")]
struct Args {
    /// Run database migrations and exit
    #[arg(long)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider before any TLS operations
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let args = Args::parse();
    let config = envy::prefixed("DOMUS_").from_env::<Config>()?;

    // Initialize Sentry for error tracking (must be done early, guard must stay alive)
    let _sentry_guard = config.sentry_dsn.as_ref().map(|dsn| {
        sentry::init((
            dsn.as_str(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                environment: Some(config.env.clone().into()),
                ..Default::default()
            },
        ))
    });

    // Set up tracing: JSON in production, human-readable otherwise
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.is_production() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer())
            .init();
    }

    let database = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;

    // Run migrations via init container only (--migrate flag)
    if args.migrate {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&database).await?;
        tracing::info!("Migrations complete");
        return Ok(());
    }

    // Redis is optional: without it the daily quota degrades to memory
    let redis = match &config.redis_url {
        Some(url) => Some(redis::Client::open(url.as_str())?),
        None => {
            tracing::warn!("no redis configured; daily quota counter is in-memory only");
            None
        }
    };

    let email = EmailSenderImpl::new(config.resend_api_key.clone(), config.smtp_url.clone())?;

    let captcha = config
        .recaptcha_secret_key
        .clone()
        .filter(|s| !s.is_empty())
        .map(|secret| Arc::new(RecaptchaVerifier::new(secret)) as Arc<dyn CaptchaVerifier>);
    if captcha.is_none() {
        tracing::warn!("no captcha secret configured; lead submissions will fail");
    }

    let completion = config
        .openai_api_key
        .clone()
        .filter(|k| !k.is_empty())
        .map(|key| {
            Arc::new(OpenAiCompletion::new(openai::Client::new(key))) as Arc<dyn CompletionService>
        });
    if completion.is_none() {
        tracing::warn!("no completion API key configured; assistant queries will fail");
    }

    // Build repositories
    let repos = Repos {
        leads: Arc::new(PgLeadRepo::new(database)),
    };

    // Build rate-limit counters: 10/min per IP and 60s per email on the lead
    // endpoint, 8/day per IP on the assistant endpoint
    let stores = Stores {
        lead_ip: Arc::new(FixedWindowLimiter::new(Duration::seconds(60), 10)),
        email_cooldown: Arc::new(CooldownTracker::new(Duration::seconds(60))),
        quota: Arc::new(RedisBackedQuota::new(redis)),
    };

    let state = AppState {
        config: config.clone(),
        repos,
        stores,
        captcha,
        completion,
        email: Arc::new(email),
    };

    // Request ID header name
    let x_request_id = http::HeaderName::from_static("x-request-id");

    let app = Router::new()
        .nest("/health", handlers::health::router())
        .nest("/lead", handlers::lead::router())
        .nest("/assistant", handlers::assistant::router())
        .with_state(state)
        // Request ID: generate UUID, include in logs, return in response
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &http::Request<axum::body::Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            },
        ))
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(1024 * 1024)); // 1MB limit

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
