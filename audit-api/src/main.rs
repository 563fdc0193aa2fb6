use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use audit_api::{
    config::read_config,
    domain::search::{repository::PgAuditLogRepository, StatementBuilder},
    router, telemetry, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = read_config().context("failed to read configuration")?;
    telemetry::init(&config.application.log_level);

    let connection_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_with(config.database.with_db())
        .await
        .context("failed to connect to postgres")?;

    if config.database.run_migrations {
        tracing::info!("running database migrations");
        sqlx::migrate!("./migrations")
            .run(&connection_pool)
            .await
            .context("failed to run migrations")?;
    }

    let repository = PgAuditLogRepository::new(
        connection_pool,
        StatementBuilder::new(config.search.text_search_config.clone()),
    );
    let app = router::create(AppState::new(repository), &config.application);

    let addr = format!("{}:{}", config.application.host, config.application.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(address = %addr, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
