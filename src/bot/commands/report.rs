//! Stock report command - a text bar chart of units per part plus a low-stock list.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        core::report::{format_stock_bar, low_stock, stock_chart},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Rows beyond this are summarized to stay under the embed size limit.
    const MAX_CHART_ROWS: usize = 40;

    /// Shows stock per part as a bar chart.
    #[poise::command(slash_command, rename = "stock_chart")]
    pub async fn stock_report(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let catalog = &ctx.data().catalog;
        let snapshot = catalog.snapshot();

        if snapshot.is_empty() {
            ctx.say("The catalog is empty. Use `/catalog add` to register parts!")
                .await?;
            return Ok(());
        }

        let chart = stock_chart(&snapshot);
        let max = chart.max();
        let mut lines: Vec<String> = chart
            .rows()
            .take(MAX_CHART_ROWS)
            .map(|(label, units)| format!("{label}\n{}", format_stock_bar(units, max, None)))
            .collect();
        if chart.labels.len() > MAX_CHART_ROWS {
            lines.push(format!("… and {} more", chart.labels.len() - MAX_CHART_ROWS));
        }

        let threshold = catalog.settings().low_stock_threshold;
        let low = low_stock(&snapshot, threshold);
        let low_text = if low.is_empty() {
            format!("Every part has more than {threshold} units.")
        } else {
            low.iter()
                .map(|p| format!("• {} ({})", p.name, p.stock))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let embed = serenity::CreateEmbed::default()
            .title("**Stock by Part**")
            .description(format!("```\n{}\n```", lines.join("\n")))
            .color(0x0058_65F2)
            .field(format!("Low stock (≤ {threshold})"), low_text, false)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{} parts · {} units total",
                chart.labels.len(),
                chart.total()
            )));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
