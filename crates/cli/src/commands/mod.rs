pub mod chat;
pub mod doctor;
pub mod init;
pub mod prompt;
pub mod serve;

use std::path::Path;
use std::sync::Arc;

use dostbot_agent::AssistantContext;
use dostbot_config::AppConfig;

pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(p) => AppConfig::load_with_env(p),
        None => AppConfig::load(),
    };
    Ok(config.map_err(|e| format!("Failed to load config: {e}"))?)
}

/// Build the provider and the shared assistant context.
///
/// Loads the knowledge base and renders the system prompt, once.
pub fn build_assistant(
    config: &AppConfig,
) -> Result<Arc<AssistantContext>, Box<dyn std::error::Error>> {
    // Missing credential is fatal at startup
    if config.require_api_key().is_err() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    export GROQ_API_KEY='gsk_...'");
        eprintln!("    export DOSTBOT_API_KEY='...'     (takes precedence)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let provider = dostbot_providers::build_from_config(config)?;
    let assistant = AssistantContext::from_config(config, provider)?;
    Ok(Arc::new(assistant))
}
