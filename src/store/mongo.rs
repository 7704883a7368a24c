//! MongoDB-backed repository.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, Bson, Document};
use mongodb::{Client, Database};
use serde_json::{Map, Value};
use tracing::debug;

use super::{Collection, Record, Repository, StoreError, StoreResult};

/// Used when the connection string names no database.
const DEFAULT_DATABASE: &str = "burrow";

pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// Parses `url` and builds the client. The driver connects lazily; call
    /// [`Repository::ping`] to verify the server is reachable.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let client = Client::with_uri_str(url).await?;
        let db = client
            .default_database()
            .unwrap_or_else(|| client.database(DEFAULT_DATABASE));
        debug!(database = db.name(), "mongodb client ready");
        Ok(Self { db })
    }

    fn collection(&self, collection: Collection) -> mongodb::Collection<Document> {
        self.db.collection(collection.name())
    }
}

/// Matches the same `_id` shapes [`into_record`] reads back. A 24-digit hex
/// id may be stored either as an ObjectId or as a plain string.
fn id_filter(id: &str) -> Document {
    match ObjectId::parse_str(id) {
        Ok(oid) => doc! { "_id": { "$in": [oid, id] } },
        Err(_) => doc! { "_id": id },
    }
}

fn into_record(mut document: Document) -> StoreResult<Record> {
    let id = match document.remove("_id") {
        Some(Bson::ObjectId(oid)) => oid.to_hex(),
        Some(Bson::String(s)) => s,
        Some(other) => {
            return Err(StoreError::Corrupt(format!("unsupported _id type {:?}", other.element_type())));
        }
        None => return Err(StoreError::Corrupt("document without _id".to_owned())),
    };
    match Bson::Document(document).into_relaxed_extjson() {
        Value::Object(fields) => Ok(Record { fields, id }),
        other => Err(StoreError::Corrupt(format!("document decoded as {other}"))),
    }
}

#[async_trait]
impl Repository for MongoStore {
    async fn find_all(&self, collection: Collection) -> StoreResult<Vec<Record>> {
        let cursor = self.collection(collection).find(doc! {}).await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        documents.into_iter().map(into_record).collect()
    }

    async fn find_by_id(&self, collection: Collection, id: &str) -> StoreResult<Option<Record>> {
        self.collection(collection)
            .find_one(id_filter(id))
            .await?
            .map(into_record)
            .transpose()
    }

    async fn create(&self, collection: Collection, mut fields: Map<String, Value>) -> StoreResult<Record> {
        fields.remove("_id");
        let document = bson::to_document(&fields)?;
        let inserted = self.collection(collection).insert_one(document).await?;
        let id = match inserted.inserted_id {
            Bson::ObjectId(oid) => oid.to_hex(),
            other => return Err(StoreError::Corrupt(format!("inserted _id {other}"))),
        };
        Ok(Record { fields, id })
    }

    async fn delete_by_id(&self, collection: Collection, id: &str) -> StoreResult<Option<Record>> {
        self.collection(collection)
            .find_one_and_delete(id_filter(id))
            .await?
            .map(into_record)
            .transpose()
    }

    async fn ping(&self) -> StoreResult<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}
