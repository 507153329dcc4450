use std::path::Path;

use anyhow::Result;
use tracing::info;

use dragscroll_core::AppConfig;

pub fn run(config: &AppConfig, path: &Path, write: bool) -> Result<()> {
    if write {
        config.save_to(path)?;
        info!(path = %path.display(), "Configuration written");
        println!("Wrote configuration to {}", path.display());
        return Ok(());
    }

    println!("# {}", path.display());
    print!("{}", config.to_toml()?);
    Ok(())
}
