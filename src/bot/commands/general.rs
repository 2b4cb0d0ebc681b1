//! General Discord commands - ping, help, and other utility commands.
//! This module contains simple commands that don't touch the catalog
//! and provide basic bot functionality and user assistance.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**MotoRepuestos Help**\n\
        Here is a summary of all available commands.\n\n\
        **Browsing**\n\
        • `/catalog list [query] [category]` - Lists parts matching name, description or price.\n\
        • `/catalog search <query>` - Searches name, description, brand and model.\n\
        • `/stock_chart` - Shows stock per part and what is running low.\n\n\
        **Sales**\n\
        • `/buy <part>` - Sells one unit after you confirm.\n\n\
        **Management**\n\
        • `/catalog add` - Registers a new part. Every field is required.\n\
        • `/catalog edit <part>` - Changes any of a part's details.\n\
        • `/catalog delete <part>` - Removes a part.\n\
        • `/catalog refresh` - Reloads the catalog from the database.\n\n\
        **Utility Commands**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
