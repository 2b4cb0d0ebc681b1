//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the chat front-end for the inventory: slash commands for
//! browsing, registering, editing and selling parts, autocomplete handlers, and the
//! shared context every command receives.

/// Discord command implementations (catalog, purchase, report, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    core::{Catalog, Product, StockMutator},
    errors::{Error, Result},
    store::SqliteDocumentStore,
};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Shared data available to all bot commands.
/// Every command reads and writes through the same catalog, so all of them
/// see one consistent mirror.
pub struct BotData {
    /// The shared product catalog
    pub catalog: Arc<Catalog<SqliteDocumentStore>>,
    /// Purchase flow over the same catalog
    pub stock: StockMutator<SqliteDocumentStore>,
}

impl BotData {
    /// Creates a new `BotData` around a shared catalog.
    #[must_use]
    pub fn new(catalog: Arc<Catalog<SqliteDocumentStore>>) -> Self {
        Self {
            stock: StockMutator::new(Arc::clone(&catalog)),
            catalog,
        }
    }

    /// Looks a product up by id (what autocomplete sends) or, failing that,
    /// by exact name (what a user may type by hand).
    #[must_use]
    pub fn resolve_product(&self, input: &str) -> Option<Product> {
        self.catalog
            .get(input)
            .or_else(|| self.catalog.find_by_name(input))
    }
}

/// Poise context type used by every command.
pub type Context<'a> = poise::Context<'a, BotData, Error>;

/// Tells the user why an operation failed and logs it. User-correctable
/// problems are shown verbatim; infrastructure failures get a generic notice.
pub async fn report_failure(ctx: Context<'_>, action: &str, error: Error) -> Result<()> {
    let message = if error.is_user_facing() {
        warn!("Could not {action}: {error}");
        format!("⚠️ {error}")
    } else {
        error!("Failed to {action}: {error}");
        format!("❌ Failed to {action}. Please try again later.")
    };
    ctx.say(message).await?;
    Ok(())
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx.say(format!("An error occurred: {error}")).await {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Builds the poise framework and runs the Discord client until it stops.
#[instrument(skip(token, data))]
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::catalog(),
                commands::buy(),
                commands::stock_report(),
                commands::ping(),
                commands::help(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {:?}", e))?;
    Ok(())
}
