use std::path::Path;

use anyhow::bail;
use gridroute_core::{RouterConfig, StrategyKind};
use tracing::info;

pub fn init(path: &Path, strategy: &str, force: bool) -> anyhow::Result<()> {
    let kind: StrategyKind = strategy.parse()?;

    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let config = RouterConfig::scaffold(kind);
    std::fs::write(path, config.to_toml_string()?)?;
    info!(path = %path.display(), strategy = %kind, "wrote scaffold config");
    println!("✓ Generated {}", path.display());

    Ok(())
}
