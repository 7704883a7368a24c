//! Document store behind the request handlers.
//!
//! The handlers only see [`Repository`]. Which backend sits behind it is
//! decided once at startup from the connection string scheme:
//!
//! | Scheme | Backend |
//! |---|---|
//! | `mongodb://`, `mongodb+srv://` | [`MongoStore`] (feature `mongo`) |
//! | `memory://` | [`MemoryStore`] |

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

mod memory;
#[cfg(feature = "mongo")]
mod mongo;

pub use memory::MemoryStore;
#[cfg(feature = "mongo")]
pub use mongo::MongoStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unsupported connection string scheme in `{0}`")]
    UnsupportedScheme(String),

    #[cfg(feature = "mongo")]
    #[error("mongodb: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[cfg(feature = "mongo")]
    #[error("bson encoding: {0}")]
    Encode(#[from] mongodb::bson::ser::Error),

    /// A stored document the service cannot represent (e.g. no `_id`).
    #[error("corrupt document: {0}")]
    Corrupt(String),

    #[error("{0}")]
    Backend(String),
}

/// The two collections the service manages.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Collection {
    Users,
    Todos,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Todos => "todos",
        }
    }
}

/// A stored document: its fields plus the store-assigned `_id`.
///
/// Serialises flat, fields first: `{"message":"buy milk","_id":"…"}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Record {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    #[serde(rename = "_id")]
    pub id: String,
}

impl Record {
    /// Field lookup by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

/// Persistence operations the handlers depend on.
///
/// Identifiers are opaque: an id the backend cannot interpret is the same
/// as an id that does not exist (`Ok(None)`).
#[async_trait]
pub trait Repository: Send + Sync {
    async fn find_all(&self, collection: Collection) -> StoreResult<Vec<Record>>;

    async fn find_by_id(&self, collection: Collection, id: &str) -> StoreResult<Option<Record>>;

    /// Inserts `fields` as a new document. Any `_id` in `fields` is discarded.
    async fn create(&self, collection: Collection, fields: Map<String, Value>) -> StoreResult<Record>;

    async fn delete_by_id(&self, collection: Collection, id: &str) -> StoreResult<Option<Record>>;

    /// Round-trips to the backend. Used once at startup.
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Opens the backend named by `url` and checks that it answers.
pub async fn connect(url: &str) -> StoreResult<Arc<dyn Repository>> {
    let repo: Arc<dyn Repository> = if url.starts_with("memory://") {
        Arc::new(MemoryStore::new())
    } else if url.starts_with("mongodb://") || url.starts_with("mongodb+srv://") {
        connect_mongo(url).await?
    } else {
        return Err(StoreError::UnsupportedScheme(redact(url)));
    };
    repo.ping().await?;
    Ok(repo)
}

#[cfg(feature = "mongo")]
async fn connect_mongo(url: &str) -> StoreResult<Arc<dyn Repository>> {
    Ok(Arc::new(MongoStore::connect(url).await?))
}

#[cfg(not(feature = "mongo"))]
async fn connect_mongo(url: &str) -> StoreResult<Arc<dyn Repository>> {
    Err(StoreError::UnsupportedScheme(redact(url)))
}

/// Keeps only the scheme so credentials never reach logs or errors.
fn redact(url: &str) -> String {
    match url.split_once("://") {
        Some((scheme, _)) => format!("{scheme}://…"),
        None => "<no scheme>".to_owned(),
    }
}
