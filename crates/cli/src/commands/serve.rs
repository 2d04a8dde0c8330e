//! `dostbot serve` - Start the HTTP gateway and web chat.

use dostbot_config::AppConfig;

pub async fn run(mut config: AppConfig, port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    let assistant = super::build_assistant(&config)?;

    println!("🌱 Dostbin AI Assistant");
    println!("   Web chat:  http://{}:{}/", config.gateway.host, config.gateway.port);
    println!("   Model:     {}", assistant.model());
    println!(
        "   Knowledge: {}",
        match assistant.knowledge() {
            Some(kb) => format!("{} documents", kb.document_count()),
            None => "none (generic assistant)".into(),
        }
    );

    dostbot_gateway::start(&config, assistant).await?;

    Ok(())
}
