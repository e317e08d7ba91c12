use anyhow::{Context, Result};
use pesa_core::StatementLayout;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::report::OutputFormat;
use crate::state::{ensure_pesa_home, pesa_home};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputSection,
    /// Statement layout; omitted keys keep the M-PESA defaults.
    pub layout: StatementLayout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub format: OutputFormat,
    /// Refuse documents failing the fingerprint or keyword checks.
    pub strict: bool,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            strict: false,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(pesa_home()?.join("config.toml"))
}

/// Load `path`, or `~/.pesa/config.toml` when none is given. A missing
/// default file means defaults; a missing explicit file is an error.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let p = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let p = config_path()?;
            if !p.exists() {
                return Ok(Config::default());
            }
            p
        }
    };
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    let cfg = toml::from_str(&s).with_context(|| format!("parse {}", p.display()))?;
    log::debug!("loaded config from {}", p.display());
    Ok(cfg)
}

pub fn save_config(cfg: &Config) -> Result<PathBuf> {
    let p = ensure_pesa_home()?.join("config.toml");
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(p)
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let p = save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn render_config(cfg: &Config) -> Result<String> {
    toml::to_string_pretty(cfg).context("serialize config")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let s = render_config(&Config::default()).unwrap();
        let back: Config = toml::from_str(&s).unwrap();
        assert_eq!(back.layout, StatementLayout::mpesa());
        assert_eq!(back.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_partial_config() {
        let cfg: Config = toml::from_str(
            r#"
[output]
strict = true

[layout]
status_lookahead = 5
"#,
        )
        .unwrap();
        assert!(cfg.output.strict);
        assert_eq!(cfg.output.format, OutputFormat::Json);
        assert_eq!(cfg.layout.status_lookahead, 5);
        assert_eq!(cfg.layout.max_money_fields, 2);
    }
}
