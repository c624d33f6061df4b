//! Artifact export module
//!
//! Provides destinations for pipeline artifacts:
//! - Logging-only store
//! - File system store
//! - In-memory store

mod store;

pub use store::{ArtifactStore, FileStore, LoggingStore, MemoryStore};
