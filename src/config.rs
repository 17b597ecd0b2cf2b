use crate::passes::DEFAULT_PASSES;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UnigraphConfig {
    /// Document file or directory to resolve
    pub input: Option<String>,
    /// Output format: `text` or `json`
    pub format: Option<String>,
    /// Pass names, run in order
    pub passes: Option<Vec<String>>,
}

impl UnigraphConfig {
    /// Config written by `unigraph init`
    pub fn starter() -> Self {
        Self {
            input: Some(".".to_string()),
            format: Some("text".to_string()),
            passes: Some(DEFAULT_PASSES.iter().map(|p| p.to_string()).collect()),
        }
    }

    /// Configured passes, or the default pipeline when none are listed
    pub fn pass_names(&self) -> Vec<String> {
        match &self.passes {
            Some(passes) => passes.clone(),
            None => DEFAULT_PASSES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("unigraph.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<UnigraphConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: UnigraphConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &UnigraphConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}
