//! # Dostbot Core
//!
//! Domain types, traits, and error definitions for the Dostbot support
//! assistant. This crate has **zero framework dependencies** - it defines
//! the domain model that all other crates implement against.
//!
//! - [`knowledge`] - the bundled knowledge store and its loader
//! - [`conversation`] - the per-session transcript
//! - [`provider`] - the completion gateway trait

pub mod error;
pub mod message;
pub mod conversation;
pub mod knowledge;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{Error, KnowledgeError, ProviderError, Result, SessionError};
pub use message::{Message, Role, Speaker, Turn};
pub use conversation::{Conversation, ConversationId};
pub use knowledge::{Document, KnowledgeStore};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
