//! The Dostbot assistant: prompt rendering and the chat session driver.
//!
//! 1. **Load** the knowledge base once at startup
//! 2. **Render** the system prompt from it, once
//! 3. **Drive** each chat session: record the user turn, send the system
//!    prompt plus the full history to the provider, record the reply
//!
//! Provider failures never end a session. The failed turn keeps its user
//! message and the next submission resends it along with the new one.

pub mod assistant;
pub mod prompt;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use assistant::{AssistantContext, load_knowledge};
pub use prompt::{render_media_section, render_system_prompt};
pub use session::{ChatSession, SessionState, TurnOutcome};
