use dotenvy::dotenv;
use moto_repuestos::{
    bot::{self, BotData},
    config::{self, database},
    core::{Catalog, report},
    errors::{Error, Result},
    store::SqliteDocumentStore,
};
use std::{env, sync::Arc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the main application configuration
    let app_config = config::load_app_configuration()?;
    info!(
        collection = %app_config.catalog.collection,
        "Successfully processed application configuration."
    );

    // 4. Connect to the database and make sure the tables exist
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Build the shared catalog and fill the mirror. A failed first load is not
    //    fatal: the mirror starts empty and `/catalog refresh` can retry.
    let threshold = app_config.catalog.low_stock_threshold;
    let catalog = Arc::new(Catalog::new(
        SqliteDocumentStore::new(db),
        app_config.catalog,
    ));
    if let Err(e) = catalog.reload().await {
        warn!("Starting with an empty catalog: {}", e);
    }
    tokio::spawn(report::watch_low_stock(catalog.subscribe(), threshold));

    // 6. Run the bot
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, BotData::new(catalog)).await?;

    Ok(())
}
