//! Provider construction from configuration.

use std::sync::Arc;
use dostbot_core::error::ProviderError;
use dostbot_core::provider::Provider;
use crate::openai_compat::OpenAiCompatProvider;

/// Build the configured completion provider.
///
/// The API key must already be known to exist; `api_url` overrides the
/// provider's well-known base URL.
pub fn build_from_config(
    config: &dostbot_config::AppConfig,
) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config
        .require_api_key()
        .map_err(|e| ProviderError::NotConfigured(e.to_string()))?;

    let base_url = match &config.api_url {
        Some(url) => url.clone(),
        None => default_base_url(&config.provider).ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "Unknown provider '{}' — set api_url in config.toml",
                config.provider
            ))
        })?,
    };

    tracing::debug!(provider = %config.provider, base_url = %base_url, "Provider configured");

    let provider = OpenAiCompatProvider::new(&config.provider, base_url, api_key)?;
    Ok(Arc::new(provider))
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> Option<String> {
    let url = match provider_name {
        "groq" => "https://api.groq.com/openai/v1",
        "openai" => "https://api.openai.com/v1",
        "openrouter" => "https://openrouter.ai/api/v1",
        "together" => "https://api.together.xyz/v1",
        "fireworks" => "https://api.fireworks.ai/inference/v1",
        "deepseek" => "https://api.deepseek.com/v1",
        "ollama" => "http://localhost:11434/v1",
        "vllm" => "http://localhost:8000/v1",
        _ => return None,
    };
    Some(url.into())
}
