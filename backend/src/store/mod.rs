//! ==============================================================================
//! store/mod.rs - document store abstraction
//! ==============================================================================
//!
//! purpose:
//!     one interface for reading and writing readings, whether the backend is
//!     a real mongodb collection or the in-memory stand-in used by tests.
//!
//! connection model:
//!     the connection is attempted exactly once, at startup. a store is then
//!     either CONNECTED or DISCONNECTED for its whole life; the gateway asks
//!     `status()` before every operation and never touches the network when
//!     disconnected.
//!
//! relationships:
//!     - used by: gateway.rs (injected as Arc<dyn ReadingStore>)
//!     - uses: domain.rs (NewReading in, Reading out)
//!
//! ==============================================================================

mod mongo;

#[cfg(test)]
pub mod memory;

pub use mongo::{MongoStore, COLLECTION_NAME, DATABASE_NAME};

use crate::domain::{NewReading, Reading};
use crate::error::StoreError;
use async_trait::async_trait;

/// most readings a single list call returns
pub const MAX_READINGS: u32 = 5000;

/// whether a usable store handle exists
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    pub fn is_connected(self) -> bool {
        self == ConnectionStatus::Connected
    }
}

#[async_trait]
pub trait ReadingStore: Send + Sync {
    fn status(&self) -> ConnectionStatus;

    /// readings in ascending id order, at most `limit` of them
    async fn recent(&self, limit: u32) -> Result<Vec<Reading>, StoreError>;

    /// store the reading verbatim and return it as stored, with its new id
    async fn insert(&self, reading: NewReading) -> Result<Reading, StoreError>;
}
