//! Store implementations for accounts and creatives.
//!
//! Available backends:
//! - `MemoryQuotaStore` / `MemoryCreativeStore` - in-memory (always available)

pub mod memory;

pub use memory::{MemoryCreativeStore, MemoryQuotaStore};
