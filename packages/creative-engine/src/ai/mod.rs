//! Generation provider implementations.
//!
//! Reference implementations of the `GenerationProvider` trait. Users can
//! use these directly or implement their own.

#[cfg(feature = "openai")]
mod openai;

#[cfg(feature = "openai")]
pub use openai::OpenAIProvider;
