use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use addonhub_indexer::IndexerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing (stderr, stdout carries the index) ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "addonhub_indexer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // --- Configuration ---
    let config = IndexerConfig::from_env();
    tracing::info!(page = config.page, limit = config.limit, "Loaded indexer configuration");

    // --- Database ---
    let pool = addonhub_db::create_pool(&config.database_url).await?;
    addonhub_db::health_check(&pool).await?;
    addonhub_db::run_migrations(&pool).await?;
    tracing::info!("Database ready");

    // --- Cancellation on Ctrl-C ---
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, cancelling");
            on_signal.cancel();
        }
    });

    let store = addonhub_db::PgStore::new(pool);
    let index = addonhub_indexer::render_page(
        &store,
        &config.addon,
        &cancel,
        config.page,
        config.limit,
    )
    .await?;
    println!("{index}");

    Ok(())
}
