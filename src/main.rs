use tracing_subscriber::EnvFilter;

use moviereco_api::{config::Config, db, routes::create_router, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,moviereco_api=debug")),
        )
        .init();

    let state = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url).await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("connected to PostgreSQL");
            AppState::with_postgres(pool, &config)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, falling back to in-memory storage");
            AppState::in_memory(&config)
        }
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
