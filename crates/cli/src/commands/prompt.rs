//! `dostbot prompt` - Print the rendered system prompt.
//!
//! Needs no API key; useful for checking a knowledge base before deploying it.

use dostbot_agent::{load_knowledge, render_media_section, render_system_prompt};
use dostbot_config::AppConfig;
use dostbot_core::error::KnowledgeError;

pub fn run(config: &AppConfig, media_only: bool) -> Result<(), Box<dyn std::error::Error>> {
    let text = render(config, media_only)?;
    println!("{}", text.trim_end_matches('\n'));
    Ok(())
}

fn render(config: &AppConfig, media_only: bool) -> Result<String, KnowledgeError> {
    let knowledge = load_knowledge(&config.knowledge_base)?;
    Ok(if media_only {
        render_media_section(knowledge.as_ref())
    } else {
        render_system_prompt(knowledge.as_ref())
    })
}
