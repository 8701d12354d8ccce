use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use glob::{MatchOptions, Pattern};
use log::warn;

use super::types::SheetConfig;

/// Newest config file version this build understands
const CONFIG_VERSION: u32 = 1;

/// Hidden files are never picked up by a wildcard
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: true,
};

/// Sheet settings read from disk, anchored at the file's directory.
///
/// Input and output entries in a config file name paths relative to the
/// config file, so the file can be moved together with the layers it packs.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: SheetConfig,
    /// Directory relative entries are resolved against
    pub base_dir: PathBuf,
}

impl LoadedConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Self::parse(&content, base_dir)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    /// Parse config JSON whose relative entries live under `base_dir`
    pub fn parse(content: &str, base_dir: PathBuf) -> Result<Self> {
        let config: SheetConfig = serde_json::from_str(content)?;
        if config.version > CONFIG_VERSION {
            bail!(
                "version {} is newer than the supported version {}",
                config.version,
                CONFIG_VERSION
            );
        }
        Ok(Self { config, base_dir })
    }

    /// Layer inputs in listed order.
    ///
    /// Wildcard entries expand to their matches sorted by path; plain
    /// entries are kept even when missing so the layer source can report
    /// them.
    pub fn resolve_inputs(&self) -> Result<Vec<PathBuf>> {
        let mut inputs = Vec::new();
        for entry in &self.config.input {
            if has_wildcards(entry) {
                let matches = self.expand(entry)?;
                if matches.is_empty() {
                    warn!("Input pattern '{}' matched no files", entry);
                }
                inputs.extend(matches);
            } else {
                inputs.push(self.base_dir.join(entry));
            }
        }
        Ok(inputs)
    }

    pub fn resolve_output_dir(&self) -> PathBuf {
        self.base_dir.join(&self.config.output_dir)
    }

    fn expand(&self, entry: &str) -> Result<Vec<PathBuf>> {
        let pattern = self.base_dir.join(entry);
        let mut matches = glob::glob_with(&pattern.to_string_lossy(), MATCH_OPTIONS)
            .with_context(|| format!("invalid input pattern: {}", entry))?
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("failed to expand input pattern: {}", entry))?;
        matches.sort();
        Ok(matches)
    }
}

/// True when `entry` uses glob syntax (escaping it would change it)
fn has_wildcards(entry: &str) -> bool {
    Pattern::escape(entry) != entry
}
