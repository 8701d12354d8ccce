use std::path::Path;

use anyhow::{Context, Result};

use super::types::SheetConfig;

/// Write `config` as pretty JSON, creating the parent directory if needed.
pub fn save_config(config: &SheetConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }

    let content =
        serde_json::to_string_pretty(config).context("failed to serialize config to JSON")?;

    std::fs::write(path, content)
        .with_context(|| format!("failed to write config file: {}", path.display()))?;

    Ok(())
}

/// Express `path` relative to `base` with forward slashes, for config files
/// that move between machines.
///
/// Paths outside `base` are kept as they are; `base` itself becomes ".".
pub fn make_relative(path: &Path, base: &Path) -> String {
    match path.strip_prefix(base) {
        Ok(relative) if relative.as_os_str().is_empty() => ".".to_string(),
        Ok(relative) => relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.to_string_lossy().into_owned(),
    }
}
