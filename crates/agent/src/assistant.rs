//! The process-wide assistant context.
//!
//! Built once at startup and shared read-only (behind `Arc`) by every chat
//! session: the loaded knowledge store, the system prompt rendered from it,
//! the completion provider and the fixed generation settings.

use std::path::Path;
use std::sync::Arc;

use dostbot_config::AppConfig;
use dostbot_core::conversation::Conversation;
use dostbot_core::error::KnowledgeError;
use dostbot_core::knowledge::KnowledgeStore;
use dostbot_core::message::Message;
use dostbot_core::provider::{Provider, ProviderRequest};
use dostbot_telemetry::{PricingTable, SessionUsage, UsageSnapshot};
use tracing::{debug, info};

use crate::prompt::render_system_prompt;

pub struct AssistantContext {
    provider: Arc<dyn Provider>,
    knowledge: Option<KnowledgeStore>,
    system_prompt: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    pricing: PricingTable,
}

impl AssistantContext {
    /// Create a context, rendering the system prompt once.
    pub fn new(provider: Arc<dyn Provider>, knowledge: Option<KnowledgeStore>) -> Self {
        let system_prompt = render_system_prompt(knowledge.as_ref());
        debug!(
            prompt_chars = system_prompt.len(),
            has_knowledge = knowledge.is_some(),
            "System prompt rendered"
        );

        Self {
            provider,
            knowledge,
            system_prompt,
            model: "llama-3.1-8b-instant".into(),
            temperature: 0.7,
            max_tokens: 500,
            pricing: PricingTable::with_defaults(),
        }
    }

    /// Load the knowledge base named in `config` and apply its generation
    /// settings. A missing knowledge base is fine; a malformed one is not.
    pub fn from_config(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
    ) -> Result<Self, KnowledgeError> {
        let knowledge = load_knowledge(&config.knowledge_base)?;
        Ok(Self::new(provider, knowledge)
            .with_model(&config.model)
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    pub fn knowledge(&self) -> Option<&KnowledgeStore> {
        self.knowledge.as_ref()
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One system message, then every turn in order. The whole history is
    /// resent on each request.
    pub fn build_request(&self, conversation: &Conversation) -> ProviderRequest {
        let mut messages = Vec::with_capacity(conversation.len() + 1);
        messages.push(Message::system(&self.system_prompt));
        messages.extend(conversation.all().iter().map(Message::from));

        ProviderRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
        }
    }

    pub fn usage_snapshot(&self, usage: &SessionUsage) -> UsageSnapshot {
        usage.snapshot(&self.pricing, &self.model)
    }
}

/// Load the knowledge store, logging what was found.
pub fn load_knowledge(path: &Path) -> Result<Option<KnowledgeStore>, KnowledgeError> {
    let store = KnowledgeStore::load(path)?;
    if let Some(kb) = &store {
        info!(
            path = %path.display(),
            documents = kb.document_count(),
            "Knowledge base loaded"
        );
    }
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::FALLBACK_SYSTEM_PROMPT;
    use crate::test_helpers::ScriptedProvider;
    use dostbot_core::message::{Role, Turn};

    #[test]
    fn request_starts_with_system_prompt_then_history() {
        let ctx = AssistantContext::new(Arc::new(ScriptedProvider::new(vec![])), None);
        let mut conv = Conversation::new();
        conv.append(Turn::user("Hi"));
        conv.append(Turn::assistant("Hello! How can I help?"));
        conv.append(Turn::user("Price of Premium?"));

        let req = ctx.build_request(&conv);
        assert_eq!(req.messages.len(), 4);
        assert_eq!(req.messages[0], Message::system(FALLBACK_SYSTEM_PROMPT));
        assert_eq!(req.messages[1].role, Role::User);
        assert_eq!(req.messages[2].role, Role::Assistant);
        assert_eq!(req.messages[3].content, "Price of Premium?");
        assert_eq!(req.model, "llama-3.1-8b-instant");
        assert_eq!(req.max_tokens, Some(500));
    }

    #[test]
    fn from_config_loads_knowledge_base() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("kb.json");
        std::fs::write(
            &path,
            r#"{"collections": {"products": [{"id": "AUTHORITATIVE-PRODUCT-INFO-001", "description": "Rs 9,999"}]}}"#,
        )
        .unwrap();

        let config = AppConfig {
            knowledge_base: path,
            model: "llama-3.3-70b-versatile".into(),
            max_tokens: 256,
            ..AppConfig::default()
        };
        let ctx = AssistantContext::from_config(&config, Arc::new(ScriptedProvider::new(vec![])))
            .unwrap();

        assert!(ctx.knowledge().is_some());
        assert!(ctx.system_prompt().contains("Rs 9,999"));
        let req = ctx.build_request(&Conversation::new());
        assert_eq!(req.model, "llama-3.3-70b-versatile");
        assert_eq!(req.max_tokens, Some(256));
    }

    #[test]
    fn from_config_without_knowledge_base_falls_back() {
        let config = AppConfig {
            knowledge_base: "/nonexistent/kb.json".into(),
            ..AppConfig::default()
        };
        let ctx = AssistantContext::from_config(&config, Arc::new(ScriptedProvider::new(vec![])))
            .unwrap();
        assert!(ctx.knowledge().is_none());
        assert_eq!(ctx.system_prompt(), FALLBACK_SYSTEM_PROMPT);
    }

    #[test]
    fn from_config_rejects_malformed_knowledge_base() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("kb.json");
        std::fs::write(&path, "not json").unwrap();

        let config = AppConfig {
            knowledge_base: path,
            ..AppConfig::default()
        };
        let result = AssistantContext::from_config(&config, Arc::new(ScriptedProvider::new(vec![])));
        assert!(matches!(result, Err(KnowledgeError::Malformed { .. })));
    }
}
