//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggestions come straight from the shared catalog mirror, so they never hit
//! the database while the user types.

use crate::{
    bot::BotData,
    core::{Product, filter},
    errors::Error,
};
use poise::serenity_prelude as serenity;

/// Discord shows at most 25 suggestions.
const MAX_CHOICES: usize = 25;

/// Suggests products whose name, description, brand or model contains `partial`.
///
/// The label shows the name and stock; the submitted value is the product id,
/// which keeps duplicate names apart.
pub async fn autocomplete_product(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<serenity::AutocompleteChoice> {
    let snapshot = ctx.data().catalog.snapshot();
    product_choices(&snapshot, partial)
}

fn product_choices(snapshot: &[Product], partial: &str) -> Vec<serenity::AutocompleteChoice> {
    filter::filter(snapshot, partial, filter::MANAGEMENT_FIELDS)
        .into_iter()
        .take(MAX_CHOICES)
        .map(|p| serenity::AutocompleteChoice::new(choice_label(p), p.id.clone()))
        .collect()
}

fn choice_label(product: &Product) -> String {
    format!("{} · {} in stock", product.name, product.stock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::product;

    #[test]
    fn test_choice_label() {
        let p = product("a1", "Filtro de aceite", "", 10.0, 3);
        assert_eq!(choice_label(&p), "Filtro de aceite · 3 in stock");
    }

    #[test]
    fn test_product_choices_are_capped() {
        let snapshot: Vec<Product> = (0..30)
            .map(|i| product(&i.to_string(), &format!("Bujía {i}"), "", 5.0, 1))
            .collect();

        assert_eq!(product_choices(&snapshot, "bujía").len(), MAX_CHOICES);
        assert!(product_choices(&snapshot, "cadena").is_empty());
    }
}
