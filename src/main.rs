use dairy_ledger::{api, create_pool, run_migrations, AppConfig, DairyStore, MemoryStore, PgStore};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    let config = AppConfig::load()?;
    info!(
        addr = %config.bind_addr(),
        max_connections = config.database.max_connections,
        "starting dairy ledger"
    );

    let store: Arc<dyn DairyStore> = match config.database.url.as_deref() {
        Some(url) => {
            let pool = create_pool(url, config.database.max_connections).await?;
            info!("Database pool created");
            run_migrations(&pool).await?;
            info!("Migrations applied");
            Arc::new(PgStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, running on the in-memory store; data is lost on exit");
            Arc::new(MemoryStore::default())
        }
    };

    let addr = config.bind_addr();
    let app = api::router(api::AppState::new(store, config));

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
