//! `dostbot doctor` - Diagnose configuration, API key and knowledge base.

use std::fmt;
use std::path::Path;

use dostbot_agent::load_knowledge;
use dostbot_config::AppConfig;
use dostbot_core::knowledge::{KnowledgeStore, MEDIA_COLLECTION};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug)]
struct Check {
    status: Status,
    detail: String,
}

impl Check {
    fn pass(detail: impl Into<String>) -> Self {
        Self { status: Status::Pass, detail: detail.into() }
    }
    fn warn(detail: impl Into<String>) -> Self {
        Self { status: Status::Warn, detail: detail.into() }
    }
    fn fail(detail: impl Into<String>) -> Self {
        Self { status: Status::Fail, detail: detail.into() }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let icon = match self.status {
            Status::Pass => "✅",
            Status::Warn => "⚠️ ",
            Status::Fail => "❌",
        };
        write!(f, "  {icon} {}", self.detail)
    }
}

pub async fn run(config_path: Option<&Path>, online: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Dostbot Doctor — System Diagnostics");
    println!("======================================\n");

    let loaded = match config_path {
        Some(p) => AppConfig::load_with_env(p),
        None => AppConfig::load(),
    };

    let mut checks = Vec::new();
    match &loaded {
        Ok(config) => {
            checks.push(Check::pass(format!(
                "Config valid (provider {}, model {})",
                config.provider, config.model
            )));
            checks.extend(offline_checks(config));
            if online {
                checks.push(endpoint_check(config).await);
            }
        }
        Err(e) => checks.push(Check::fail(format!("Config invalid: {e}"))),
    }

    for check in &checks {
        println!("{check}");
    }

    let issues = checks.iter().filter(|c| c.status != Status::Pass).count();
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

fn offline_checks(config: &AppConfig) -> Vec<Check> {
    let api_key = match config.require_api_key() {
        Ok(_) => Check::pass("API key configured"),
        Err(_) => Check::fail("No API key — set GROQ_API_KEY or api_key in config.toml"),
    };
    vec![api_key, knowledge_check(&config.knowledge_base)]
}

fn knowledge_check(path: &Path) -> Check {
    match load_knowledge(path) {
        Ok(Some(kb)) => Check::pass(format!(
            "Knowledge base loaded from {} ({})",
            path.display(),
            summarize(&kb)
        )),
        Ok(None) => Check::warn(format!(
            "No knowledge base at {} — the generic fallback prompt will be used",
            path.display()
        )),
        Err(e) => Check::fail(format!("Knowledge base unusable: {e}")),
    }
}

fn summarize(kb: &KnowledgeStore) -> String {
    let videos = kb.collection(MEDIA_COLLECTION).map_or(0, |videos| videos.len());
    format!("{} products, {} videos", kb.products().len(), videos)
}

async fn endpoint_check(config: &AppConfig) -> Check {
    let provider = match dostbot_providers::build_from_config(config) {
        Ok(p) => p,
        Err(e) => return Check::fail(format!("Provider not usable: {e}")),
    };
    match provider.health_check().await {
        Ok(true) => Check::pass(format!("Provider {} reachable", provider.name())),
        Ok(false) => Check::warn(format!("Provider {} answered but reported unhealthy", provider.name())),
        Err(e) => Check::fail(format!("Provider {} unreachable: {e}", provider.name())),
    }
}
