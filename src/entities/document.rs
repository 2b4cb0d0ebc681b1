//! Document entity - one row per stored document.
//!
//! The inventory talks to its store in terms of collections of schemaless documents,
//! so the table keeps the body as JSON and only lifts out what is needed for lookups.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Document database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    /// Opaque id handed out on creation
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Collection the document belongs to (e.g. "repuestosMoto")
    pub collection: String,
    /// Document fields as a JSON object
    pub body: Json,
    /// When the document was created
    pub created_at: DateTime,
    /// When the document was last written
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
