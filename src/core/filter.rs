//! Filter engine - derives the visible subset of a catalog snapshot.
//!
//! Filtering is a pure function of (snapshot, query, fields): case-insensitive substring
//! containment against any of the chosen fields, preserving the snapshot order.

use crate::core::product::{Category, Field, Product};

/// Fields searched by the product list: name, description and price.
pub const LIST_FIELDS: &[Field] = &[Field::Name, Field::Description, Field::Price];

/// Fields searched by the management view: name, description, brand and model.
pub const MANAGEMENT_FIELDS: &[Field] =
    &[Field::Name, Field::Description, Field::Brand, Field::Model];

/// Products whose text in at least one of `fields` contains `query`, ignoring case.
///
/// An empty query returns the whole snapshot. Absent values match as the empty string.
#[must_use]
pub fn filter<'a>(snapshot: &'a [Product], query: &str, fields: &[Field]) -> Vec<&'a Product> {
    if query.is_empty() {
        return snapshot.iter().collect();
    }

    let needle = query.to_uppercase();
    snapshot
        .iter()
        .filter(|product| matches(product, &needle, fields))
        .collect()
}

fn matches(product: &Product, needle: &str, fields: &[Field]) -> bool {
    fields
        .iter()
        .any(|&field| product.field_text(field).to_uppercase().contains(needle))
}

/// Narrows `products` to one category, keeping their order. Accepts a snapshot
/// or the output of [`filter`].
pub fn filter_by_category<'a>(
    products: impl IntoIterator<Item = &'a Product>,
    category: Category,
) -> Vec<&'a Product> {
    products
        .into_iter()
        .filter(|product| product.category == Some(category))
        .collect()
}
