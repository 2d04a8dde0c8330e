//! Completion provider implementations for Dostbot.
//!
//! All providers implement the `dostbot_core::Provider` trait.

pub mod openai_compat;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use router::build_from_config;
