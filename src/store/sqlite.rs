//! `SeaORM`-backed document store.
//!
//! Documents of every collection live in the single `documents` table. Writes that
//! need to look at the current body first (`update`, `compare_and_set`) run inside a
//! database transaction so the read and the write cannot interleave with another writer.

use super::{Document, DocumentStore, Fields, values_match};
use crate::{
    entities::{DocumentColumn, DocumentEntity, document},
    errors::{Error, Result},
};
use async_trait::async_trait;
use sea_orm::{ConnectionTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use serde_json::Value;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Document store persisted through a `SeaORM` connection.
#[derive(Debug)]
pub struct SqliteDocumentStore {
    db: DatabaseConnection,
}

impl SqliteDocumentStore {
    /// Wraps an open connection. Tables must already exist
    /// (see [`crate::config::database::create_tables`]).
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn into_document(model: document::Model) -> Result<Document> {
    match model.body {
        Value::Object(fields) => Ok(Document {
            id: model.id,
            fields,
        }),
        other => Err(Error::Decode {
            id: model.id,
            message: format!("document body is not an object: {other}"),
        }),
    }
}

async fn find_in<C: ConnectionTrait>(
    conn: &C,
    collection: &str,
    id: &str,
) -> Result<document::Model> {
    DocumentEntity::find_by_id(id.to_owned())
        .filter(DocumentColumn::Collection.eq(collection))
        .one(conn)
        .await?
        .ok_or_else(|| Error::DocumentNotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        })
}

async fn write_body<C: ConnectionTrait>(
    conn: &C,
    model: document::Model,
    body: Fields,
) -> Result<()> {
    let mut active: document::ActiveModel = model.into();
    active.body = Set(Value::Object(body));
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    active.update(conn).await?;
    Ok(())
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    #[instrument(skip(self))]
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>> {
        DocumentEntity::find()
            .filter(DocumentColumn::Collection.eq(collection))
            .order_by_asc(DocumentColumn::CreatedAt)
            .order_by_asc(DocumentColumn::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(into_document)
            .collect()
    }

    #[instrument(skip(self, fields))]
    async fn create(&self, collection: &str, fields: Fields) -> Result<String> {
        let id = Uuid::new_v4().simple().to_string();
        let now = chrono::Utc::now().naive_utc();

        let document = document::ActiveModel {
            id: Set(id.clone()),
            collection: Set(collection.to_string()),
            body: Set(Value::Object(fields)),
            created_at: Set(now),
            updated_at: Set(now),
        };
        document.insert(&self.db).await?;

        debug!(%id, "Document created");
        Ok(id)
    }

    #[instrument(skip(self, fields))]
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        let txn = self.db.begin().await?;

        let model = find_in(&txn, collection, id).await?;
        let Document {
            fields: mut body, ..
        } = into_document(model.clone())?;
        body.extend(fields);
        write_body(&txn, model, body).await?;

        txn.commit().await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let result = DocumentEntity::delete_many()
            .filter(DocumentColumn::Id.eq(id))
            .filter(DocumentColumn::Collection.eq(collection))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            debug!(%id, "Delete matched no document");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn compare_and_set(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        expected: Value,
        new: Value,
    ) -> Result<bool> {
        let txn = self.db.begin().await?;

        let model = find_in(&txn, collection, id).await?;
        let Document {
            fields: mut body, ..
        } = into_document(model.clone())?;

        let matches = values_match(body.get(field).unwrap_or(&Value::Null), &expected);
        if !matches {
            debug!(current = ?body.get(field), "Compare-and-set rejected");
            return Ok(false);
        }

        body.insert(field.to_string(), new);
        write_body(&txn, model, body).await?;

        txn.commit().await?;
        Ok(true)
    }
}
