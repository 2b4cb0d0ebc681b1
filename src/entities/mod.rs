//! Entity module - SeaORM entity definitions for the database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod document;

pub use document::{Column as DocumentColumn, Entity as DocumentEntity, Model as DocumentModel};
