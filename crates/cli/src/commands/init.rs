//! `dostbot init` - Write a default config file.

use std::path::Path;

use dostbot_config::AppConfig;

pub fn run(config_path: Option<&Path>, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"));

    println!("🌱 Dostbot — Setup");
    println!("==================\n");

    if write_default_config(&path, force)? {
        println!("✅ Created config at: {}", path.display());
        println!("\n📝 Next steps:");
        println!("   1. Set GROQ_API_KEY (or api_key in the config file)");
        println!("   2. Point knowledge_base at your knowledge_base.json");
        println!("   3. Run `dostbot doctor`, then `dostbot chat` or `dostbot serve`");
    } else {
        println!("⚠️  Config already exists at: {}", path.display());
        println!("   Edit it manually or re-run with --force.\n");
    }

    Ok(())
}

/// Write the default config to `path`. Returns `false` when a file is already
/// there and `force` is not set.
fn write_default_config(path: &Path, force: bool) -> std::io::Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, AppConfig::default_toml())?;
    Ok(true)
}
