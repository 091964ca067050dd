//! ==============================================================================
//! store/mongo.rs - mongodb-backed reading store (the connection manager)
//! ==============================================================================
//!
//! purpose:
//!     turns the MONGO_URI from the environment into a collection handle.
//!     a missing uri or any setup error leaves the store DISCONNECTED instead
//!     of aborting startup; the gateway then serves degraded responses.
//!
//! notes:
//!     the driver connects lazily and pools connections itself, so the handle
//!     is shared read-only across all requests.
//!
//! ==============================================================================

use super::{ConnectionStatus, ReadingStore};
use crate::domain::{render_id, NewReading, Reading};
use crate::error::StoreError;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::FindOptions;
use mongodb::{Client, Collection};
use tracing::{debug, error, info};

/// fixed database holding the readings
pub const DATABASE_NAME: &str = "Temperature_Sensing";

/// fixed collection inside DATABASE_NAME
pub const COLLECTION_NAME: &str = "mlx90614_readings_test";

enum Connection {
    Connected(Collection<Document>),
    Disconnected,
}

pub struct MongoStore {
    connection: Connection,
}

impl MongoStore {
    /// attempt the one and only connection
    ///
    /// never fails: every problem is logged and yields a disconnected store.
    pub async fn connect(uri: Option<&str>) -> Self {
        let Some(uri) = uri.filter(|u| !u.trim().is_empty()) else {
            error!("MONGO_URI not set; running without a database");
            return Self::disconnected();
        };

        match Self::open(uri).await {
            Ok(collection) => {
                info!(database = DATABASE_NAME, "connected to database");
                info!(collection = COLLECTION_NAME, "connected to collection");
                Self {
                    connection: Connection::Connected(collection),
                }
            }
            Err(e) => {
                error!(error = %e, "failed to connect to mongodb; running without a database");
                Self::disconnected()
            }
        }
    }

    pub fn disconnected() -> Self {
        Self {
            connection: Connection::Disconnected,
        }
    }

    async fn open(uri: &str) -> Result<Collection<Document>, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        Ok(client
            .database(DATABASE_NAME)
            .collection::<Document>(COLLECTION_NAME))
    }

    fn collection(&self) -> Result<&Collection<Document>, StoreError> {
        match &self.connection {
            Connection::Connected(collection) => Ok(collection),
            Connection::Disconnected => Err(StoreError::Disconnected),
        }
    }
}

#[async_trait]
impl ReadingStore for MongoStore {
    fn status(&self) -> ConnectionStatus {
        match self.connection {
            Connection::Connected(_) => ConnectionStatus::Connected,
            Connection::Disconnected => ConnectionStatus::Disconnected,
        }
    }

    async fn recent(&self, limit: u32) -> Result<Vec<Reading>, StoreError> {
        let collection = self.collection()?;

        // ids are assigned monotonically, so id order is insertion order
        let options = FindOptions::builder()
            .sort(doc! { "_id": 1 })
            .limit(i64::from(limit))
            .build();

        let docs: Vec<Document> = collection.find(None, options).await?.try_collect().await?;
        debug!(count = docs.len(), "fetched readings");

        Ok(docs.into_iter().map(Reading::from_document).collect())
    }

    async fn insert(&self, reading: NewReading) -> Result<Reading, StoreError> {
        let collection = self.collection()?;

        let inserted = collection.insert_one(reading.to_document()?, None).await?;
        let id = inserted.inserted_id;
        debug!(id = %render_id(&id), "inserted reading");

        collection
            .find_one(doc! { "_id": id.clone() }, None)
            .await?
            .map(Reading::from_document)
            .ok_or_else(|| StoreError::MissingAfterInsert(render_id(&id)))
    }
}
