//! Catalog Discord commands - browse, search, register, edit and delete spare parts.
//!
//! Listing and search read the shared mirror only. Writes go through the catalog so
//! every other command sees the result without a reload, except for registration,
//! which reloads to pick up the id the store assigned.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs, clippy::too_many_arguments)]

    use crate::{
        bot::{BotData, handlers::autocomplete, report_failure},
        core::{
            Category, NewProduct, Product, ProductPatch,
            filter::{self, LIST_FIELDS, MANAGEMENT_FIELDS},
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Discord allows at most 25 fields per embed.
    const MAX_EMBED_FIELDS: usize = 25;

    /// Category picker shown as a fixed choice list.
    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum CategoryChoice {
        #[name = "Motor"]
        Engine,
        #[name = "Frenos"]
        Brakes,
        #[name = "Suspensión"]
        Suspension,
        #[name = "Transmisión"]
        Transmission,
        #[name = "Sistema eléctrico"]
        Electrical,
        #[name = "Carrocería"]
        Bodywork,
        #[name = "Escape"]
        Exhaust,
        #[name = "Llantas y neumáticos"]
        Tires,
        #[name = "Filtros"]
        Filters,
        #[name = "Lubricantes"]
        Lubricants,
        #[name = "Accesorios"]
        Accessories,
    }

    impl From<CategoryChoice> for Category {
        fn from(choice: CategoryChoice) -> Self {
            match choice {
                CategoryChoice::Engine => Self::Engine,
                CategoryChoice::Brakes => Self::Brakes,
                CategoryChoice::Suspension => Self::Suspension,
                CategoryChoice::Transmission => Self::Transmission,
                CategoryChoice::Electrical => Self::Electrical,
                CategoryChoice::Bodywork => Self::Bodywork,
                CategoryChoice::Exhaust => Self::Exhaust,
                CategoryChoice::Tires => Self::Tires,
                CategoryChoice::Filters => Self::Filters,
                CategoryChoice::Lubricants => Self::Lubricants,
                CategoryChoice::Accessories => Self::Accessories,
            }
        }
    }

    /// Parent command for the spare-parts catalog.
    #[poise::command(
        slash_command,
        subcommands(
            "catalog_list",
            "catalog_search",
            "catalog_add",
            "catalog_edit",
            "catalog_delete",
            "catalog_refresh"
        )
    )]
    pub async fn catalog(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Catalog command. Available subcommands:\n\
            `/catalog list` - Browse parts, optionally filtered by name, description or price\n\
            `/catalog search` - Search by name, description, brand or model\n\
            `/catalog add` - Register a new part\n\
            `/catalog edit` - Change a part's details\n\
            `/catalog delete` - Remove a part\n\
            `/catalog refresh` - Reload the catalog from the database";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Lists parts in stock order, filtered by name, description or price.
    #[poise::command(slash_command, rename = "list")]
    pub async fn catalog_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Text to look for in name, description or price"] query: Option<String>,
        #[description = "Only show parts in this category"] category: Option<CategoryChoice>,
    ) -> Result<()> {
        let snapshot = ctx.data().catalog.snapshot();
        let mut matches = filter::filter(&snapshot, query.as_deref().unwrap_or(""), LIST_FIELDS);
        if let Some(choice) = category {
            matches = filter::filter_by_category(matches, choice.into());
        }

        send_product_list(ctx, "Spare Parts", &matches).await
    }

    /// Searches parts by name, description, brand or model.
    #[poise::command(slash_command, rename = "search")]
    pub async fn catalog_search(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Text to look for (case-insensitive)"] query: String,
    ) -> Result<()> {
        let snapshot = ctx.data().catalog.snapshot();
        let matches = filter::filter(&snapshot, &query, MANAGEMENT_FIELDS);

        send_product_list(ctx, &format!("Results for \"{query}\""), &matches).await
    }

    /// Registers a new part. Every field is required.
    #[poise::command(slash_command, rename = "add")]
    pub async fn catalog_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Part name"] name: String,
        #[description = "Short description"] description: String,
        #[description = "Brand (e.g., Honda)"] brand: String,
        #[description = "Motorcycle model (e.g., CB190)"] model: String,
        #[description = "Unit price, greater than zero"] price: f64,
        #[description = "Units in stock, at least one"] stock: u32,
        #[description = "Product photo"] image: Option<serenity::Attachment>,
        #[description = "Link to a product photo, if no file is attached"] image_url: Option<
            String,
        >,
        #[description = "Category"] category: Option<CategoryChoice>,
    ) -> Result<()> {
        let image_ref = image.map(|a| a.url).or(image_url).unwrap_or_default();
        let product = NewProduct {
            name,
            description,
            brand,
            model,
            price,
            image_ref,
            stock,
            category: category.map(Category::from),
        };

        let registered = match ctx.data().catalog.register(&product).await {
            Ok(registered) => registered,
            Err(e) => return report_failure(ctx, "register the part", e).await,
        };

        if !registered.refreshed {
            ctx.say(format!(
                "✅ '{}' was saved, but the catalog could not be refreshed. Try `/catalog refresh`.",
                product.name
            ))
            .await?;
            return Ok(());
        }

        ctx.say(format!(
            "✅ '{}' registered with **{}** units at **${:.2}**.",
            product.name, product.stock, product.price
        ))
        .await?;
        Ok(())
    }

    /// Changes one or more details of an existing part.
    #[poise::command(slash_command, rename = "edit")]
    pub async fn catalog_edit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Part to edit"]
        #[autocomplete = "autocomplete::autocomplete_product"]
        product: String,
        #[description = "New name"] name: Option<String>,
        #[description = "New description"] description: Option<String>,
        #[description = "New brand"] brand: Option<String>,
        #[description = "New model"] model: Option<String>,
        #[description = "New unit price"] price: Option<f64>,
        #[description = "New stock count"] stock: Option<u32>,
        #[description = "New product photo"] image: Option<serenity::Attachment>,
        #[description = "New category"] category: Option<CategoryChoice>,
    ) -> Result<()> {
        let Some(existing) = ctx.data().resolve_product(&product) else {
            ctx.say(format!("❌ Part '{product}' not found.")).await?;
            return Ok(());
        };

        let patch = ProductPatch {
            name,
            description,
            brand,
            model,
            price,
            image_ref: image.map(|a| a.url),
            stock,
            category: category.map(Category::from),
        };
        if patch.is_empty() {
            ctx.say("Nothing to change. Pick at least one field to edit.")
                .await?;
            return Ok(());
        }

        match ctx.data().catalog.update(&existing.id, &patch).await {
            Ok(()) => {
                let name = patch.name.as_deref().unwrap_or(&existing.name);
                ctx.say(format!("✅ '{name}' updated.")).await?;
                Ok(())
            }
            Err(e) => report_failure(ctx, "update the part", e).await,
        }
    }

    /// Removes a part from the catalog.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn catalog_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Part to delete"]
        #[autocomplete = "autocomplete::autocomplete_product"]
        product: String,
    ) -> Result<()> {
        let Some(existing) = ctx.data().resolve_product(&product) else {
            ctx.say(format!("❌ Part '{product}' not found.")).await?;
            return Ok(());
        };

        match ctx.data().catalog.delete(&existing.id).await {
            Ok(()) => {
                ctx.say(format!("✅ '{}' has been deleted.", existing.name))
                    .await?;
                Ok(())
            }
            Err(e) => report_failure(ctx, "delete the part", e).await,
        }
    }

    /// Reloads the catalog from the database.
    #[poise::command(slash_command, rename = "refresh")]
    pub async fn catalog_refresh(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        match ctx.data().catalog.reload().await {
            Ok(count) => {
                ctx.say(format!("🔄 Catalog reloaded: {count} parts."))
                    .await?;
                Ok(())
            }
            Err(e) => report_failure(ctx, "reload the catalog", e).await,
        }
    }

    async fn send_product_list(
        ctx: poise::Context<'_, BotData, Error>,
        title: &str,
        products: &[&Product],
    ) -> Result<()> {
        if products.is_empty() {
            ctx.say("No parts match. Use `/catalog add` to register some!")
                .await?;
            return Ok(());
        }

        let embed_fields = products
            .iter()
            .take(MAX_EMBED_FIELDS)
            .map(|p| (product_heading(p), product_details(p), false));

        let mut embed = serenity::CreateEmbed::default()
            .title(format!("**{title}**"))
            .color(0x00E6_7E22)
            .fields(embed_fields);
        if products.len() > MAX_EMBED_FIELDS {
            embed = embed.footer(serenity::CreateEmbedFooter::new(format!(
                "Showing {MAX_EMBED_FIELDS} of {} parts. Narrow the search to see the rest.",
                products.len()
            )));
        }

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    fn product_heading(product: &Product) -> String {
        format!("{} (${:.2})", product.name, product.price)
    }

    fn product_details(product: &Product) -> String {
        let stock = if product.in_stock() {
            format!("{} in stock", product.stock)
        } else {
            "Out of stock".to_string()
        };
        let category = product.category.map_or("Uncategorized", Category::label);
        let mut details = format!(
            "{} {} · {category} · {stock}",
            product.brand, product.model
        );
        if !product.description.is_empty() {
            details.push('\n');
            details.push_str(&product.description);
        }
        details
    }
}

// Re-export all commands
pub use inner::*;
