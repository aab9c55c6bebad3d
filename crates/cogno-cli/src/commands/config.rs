/// Configuration management command handlers
use anyhow::{bail, Result};
use std::path::Path;

use cogno_core::Config;

pub fn handle_config_show(path: &Path) -> Result<()> {
    let config = Config::load_or_default(path)?;
    if !path.exists() {
        println!("# {} does not exist; showing defaults", path.display());
    }
    print!("{}", config.to_toml()?);
    Ok(())
}

pub fn handle_config_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists. Use --force to overwrite it.",
            path.display()
        );
    }
    Config::default().save(path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
