use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer};
use anyhow::Context;
use blog_service::db::{self, PgAccountRepository, PgCommentRepository, PgPostRepository};
use blog_service::services::{EmailService, S3MediaStore};
use blog_service::{configure, AppState, Config};
use chrono::Duration;
use crypto_core::JwtManager;
use s3_utils::S3Client;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
}

async fn liveness() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

async fn readiness(pool: web::Data<PgPool>) -> HttpResponse {
    match sqlx::query("SELECT 1").execute(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(HealthResponse {
            status: "ok",
            database: "up",
        }),
        Err(e) => {
            tracing::warn!(error = %e, "database health check failed");
            HttpResponse::ServiceUnavailable().json(HealthResponse {
                status: "degraded",
                database: "down",
            })
        }
    }
}

async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;

        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
    }

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env().map_err(anyhow::Error::msg)?;
    tracing::info!(
        env = %config.app.env,
        host = %config.app.host,
        port = config.app.port,
        "starting blog-service"
    );

    let pool = db::create_pool(&config.database.url, config.database.max_connections)
        .await
        .context("failed to connect to database")?;
    db::run_migrations(&pool)
        .await
        .context("failed to run database migrations")?;
    tracing::info!("database migrations applied");

    let s3 = S3Client::with_config(config.s3.clone()).await;
    if let Err(e) = s3.health_check().await {
        tracing::warn!(bucket = %config.s3.bucket, error = %e, "media bucket not reachable at startup");
    }
    let media = Arc::new(S3MediaStore::new(s3.operations()));

    let email = Arc::new(EmailService::new(&config.email)?);
    let jwt = Arc::new(JwtManager::from_secret(
        &config.jwt.secret,
        Duration::seconds(config.jwt.session_ttl_secs),
        Duration::seconds(config.jwt.verification_ttl_secs),
    )?);

    let state = web::Data::new(AppState::new(
        Arc::new(PgAccountRepository::new(pool.clone())),
        Arc::new(PgPostRepository::new(pool.clone())),
        Arc::new(PgCommentRepository::new(pool.clone())),
        media,
        email,
        jwt,
        config.uploads.max_file_bytes,
    ));
    let pool_data = web::Data::new(pool);

    let bind_addr = (config.app.host.clone(), config.app.port);
    let allowed_origins = config.cors.allowed_origins.clone();

    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .app_data(pool_data.clone())
            .route("/api/v1/health", web::get().to(readiness))
            .route("/api/v1/health/live", web::get().to(liveness))
            .configure(configure(state.clone()))
    })
    .bind(bind_addr)
    .context("failed to bind HTTP listener")?
    .disable_signals()
    .run();

    let handle = server.handle();

    tokio::select! {
        result = server => {
            result.context("HTTP server terminated")?;
        }
        signal = shutdown_signal() => {
            signal.context("failed to install shutdown signal handlers")?;
            tracing::info!("shutdown signal received");
            handle.stop(true).await;
        }
    }

    tracing::info!("blog-service stopped");
    Ok(())
}
