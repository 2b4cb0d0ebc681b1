//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases,
//! catalogs, and products with sensible defaults.

use crate::{
    config::CatalogSettings,
    core::{Catalog, NewProduct, Product},
    errors::Result,
    store::{Document, SqliteDocumentStore},
};
use sea_orm::DatabaseConnection;
use serde_json::json;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Settings with retries disabled so failure tests stay fast.
pub fn no_retry_settings() -> CatalogSettings {
    CatalogSettings {
        fetch_retries: 0,
        ..CatalogSettings::default()
    }
}

/// A catalog over a fresh in-memory database.
pub async fn setup_catalog() -> Result<Catalog<SqliteDocumentStore>> {
    let db = setup_test_db().await?;
    Ok(Catalog::new(SqliteDocumentStore::new(db), no_retry_settings()))
}

/// Registers `product` and reloads so it is mirrored. Returns the new id.
pub async fn seed(catalog: &Catalog<SqliteDocumentStore>, product: &NewProduct) -> Result<String> {
    let id = catalog.create(product).await?;
    catalog.reload().await?;
    Ok(id)
}

/// A valid registration payload.
///
/// # Defaults
/// * description: "Repuesto original"
/// * brand / model: "Honda" / "CB190"
/// * price: 10.0
/// * stock: 5
pub fn sample_new_product(name: &str) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        description: "Repuesto original".to_string(),
        brand: "Honda".to_string(),
        model: "CB190".to_string(),
        price: 10.0,
        image_ref: "file:///data/product_image.jpg".to_string(),
        stock: 5,
        category: None,
    }
}

/// A mirrored product with the fields the filter scenarios care about.
pub fn product(id: &str, name: &str, description: &str, price: f64, stock: u32) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        price,
        stock,
        ..Product::default()
    }
}

/// A remote document as the store would return it.
pub fn document(id: &str, name: &str, stock: u32) -> Document {
    let serde_json::Value::Object(fields) = json!({
        "nombreRepuesto": name,
        "descripcion": "",
        "marca": "",
        "modelo": "",
        "precio": 10,
        "imageUri": "",
        "cantidadStock": stock,
    }) else {
        unreachable!("json! object literal");
    };
    Document {
        id: id.to_string(),
        fields,
    }
}
