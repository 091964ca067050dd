//! ==============================================================================
//! iot-backend - http gateway for iot sensor readings
//! ==============================================================================
//!
//! modules:
//!     - config: backend.toml schema and MONGO_URI lookup
//!     - domain: reading types, wire <-> bson conversion
//!     - error: store errors and their http mapping
//!     - gateway: axum routes, cors, request tracing
//!     - store: ReadingStore trait and the mongodb connection manager
//!
//! ==============================================================================

pub mod config;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod store;
