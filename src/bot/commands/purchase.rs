//! Purchase Discord command - sells one unit after the user confirms.
//!
//! The command shows the quote with Confirm and Cancel buttons and waits for a press.
//! Nothing is written until Confirm is pressed.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, report_failure},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::time::Duration;
    use tracing::{error, warn};

    /// How long the confirm buttons stay live.
    const CONFIRM_TIMEOUT: Duration = Duration::from_secs(60);

    /// Sells one unit of a part.
    #[poise::command(slash_command)]
    pub async fn buy(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Part to buy"]
        #[autocomplete = "autocomplete::autocomplete_product"]
        product: String,
    ) -> Result<()> {
        let Some(existing) = ctx.data().resolve_product(&product) else {
            ctx.say(format!("❌ Part '{product}' not found.")).await?;
            return Ok(());
        };

        let stock = &ctx.data().stock;
        let quote = match stock.prepare(&existing.id) {
            Ok(quote) => quote,
            Err(e) => return report_failure(ctx, "start the purchase", e).await,
        };

        let ctx_id = ctx.id();
        let confirm_id = format!("{ctx_id}confirm");
        let cancel_id = format!("{ctx_id}cancel");
        let prompt = poise::CreateReply::default()
            .content(format!(
                "Buy one **{}**? {} in stock.",
                quote.name, quote.stock
            ))
            .components(vec![serenity::CreateActionRow::Buttons(vec![
                serenity::CreateButton::new(&confirm_id)
                    .label("Confirm")
                    .style(serenity::ButtonStyle::Success),
                serenity::CreateButton::new(&cancel_id)
                    .label("Cancel")
                    .style(serenity::ButtonStyle::Secondary),
            ])]);
        let handle = ctx.send(prompt).await?;

        let author_id = ctx.author().id;
        let press = serenity::ComponentInteractionCollector::new(ctx)
            .filter(move |press| {
                press.user.id == author_id && press.data.custom_id.starts_with(&ctx_id.to_string())
            })
            .timeout(CONFIRM_TIMEOUT)
            .await;

        let Some(press) = press else {
            handle
                .edit(
                    ctx,
                    poise::CreateReply::default()
                        .content(format!("⌛ Purchase of '{}' timed out.", quote.name))
                        .components(vec![]),
                )
                .await?;
            return Ok(());
        };

        let outcome = if press.data.custom_id == confirm_id {
            match stock.confirm(&quote).await {
                Ok(sold) => format!("✅ Sold one **{}**. {} left.", sold.name, sold.stock),
                Err(e) => purchase_failure(&e),
            }
        } else {
            "Purchase cancelled.".to_string()
        };

        press
            .create_response(
                ctx.serenity_context(),
                serenity::CreateInteractionResponse::UpdateMessage(
                    serenity::CreateInteractionResponseMessage::new()
                        .content(outcome)
                        .components(vec![]),
                ),
            )
            .await?;
        Ok(())
    }

    fn purchase_failure(e: &Error) -> String {
        match e {
            Error::StockConflict { .. } => {
                warn!("Purchase lost a race: {e}");
                "⚠️ Someone else changed this part's stock. Run `/buy` again to see the current count."
                    .to_string()
            }
            e if e.is_user_facing() => {
                warn!("Purchase refused: {e}");
                format!("⚠️ {e}")
            }
            e => {
                error!("Purchase failed: {e}");
                "❌ Failed to record the purchase. Please try again later.".to_string()
            }
        }
    }
}

// Re-export all commands
pub use inner::*;
