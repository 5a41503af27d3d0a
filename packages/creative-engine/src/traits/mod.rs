//! Core trait abstractions for the creative pipeline.

pub mod fetcher;
pub mod provider;
pub mod store;
