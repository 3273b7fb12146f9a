//! Services module for records-service.

pub mod database;
pub mod memory;
pub mod metrics;
pub mod store;

pub use database::Database;
pub use memory::MemoryStore;
pub use metrics::{get_metrics, init_metrics};
pub use store::{RecordStore, StoreError};
