//! in-memory reading store standing in for mongodb in tests

use super::{ConnectionStatus, ReadingStore};
use crate::domain::{render_id, NewReading, Reading};
use crate::error::StoreError;

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Document};
use std::sync::Mutex;

pub struct MemoryStore {
    status: ConnectionStatus,
    documents: Mutex<Vec<Document>>,
}

impl MemoryStore {
    pub fn connected() -> Self {
        Self {
            status: ConnectionStatus::Connected,
            documents: Mutex::new(Vec::new()),
        }
    }

    pub fn disconnected() -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            documents: Mutex::new(Vec::new()),
        }
    }

    /// raw stored documents, as the database would hold them
    pub fn documents(&self) -> Vec<Document> {
        self.documents.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), StoreError> {
        match self.status {
            ConnectionStatus::Connected => Ok(()),
            ConnectionStatus::Disconnected => Err(StoreError::Disconnected),
        }
    }
}

#[async_trait]
impl ReadingStore for MemoryStore {
    fn status(&self) -> ConnectionStatus {
        self.status
    }

    async fn recent(&self, limit: u32) -> Result<Vec<Reading>, StoreError> {
        self.check()?;

        let mut docs = self.documents();
        // orders by the rendered id string, which matches mongodb for
        // object ids only; mixed id types do not follow bson type ordering
        docs.sort_by_cached_key(|d| d.get("_id").map(render_id).unwrap_or_default());

        Ok(docs
            .into_iter()
            .take(limit as usize)
            .map(Reading::from_document)
            .collect())
    }

    async fn insert(&self, reading: NewReading) -> Result<Reading, StoreError> {
        self.check()?;

        let mut doc = reading.to_document()?;
        if !doc.contains_key("_id") {
            doc.insert("_id", ObjectId::new());
        }
        let id = doc.get("_id").map(render_id).unwrap_or_default();

        let mut docs = self.documents.lock().unwrap();
        docs.push(doc);

        // read back by id, like the real store
        let stored = docs
            .iter()
            .rev()
            .find(|d| d.get("_id").map(render_id).as_deref() == Some(id.as_str()))
            .cloned();

        stored
            .map(Reading::from_document)
            .ok_or(StoreError::MissingAfterInsert(id))
    }
}
