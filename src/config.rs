//! TOML configuration: loading, validation, generation and CLI overrides.
//!
//! The config file names the tracked player and the default run mode.
//! Command-line flags are layered on top by [`Config::resolve`] to produce
//! the [`Options`] a run actually uses.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Written by `hiscores init` and when a run finds no config file.
pub const DEFAULT_CONFIG: &str = r#"# hiscores-tracker configuration

[player]
# Name of the player whose stats are fetched.
name = "Zezima"
# Fetch new stats from the hiscores on every run.
update = false

[plot]
# Only update the stored history; skip the summary.
no_plot = false

[store]
# History files are written as <dir>/<name>-hiscores.csv
dir = "."

[fetch]
base_url = "https://secure.runescape.com/m=hiscore_oldschool/hiscorepersonal"
user_agent = "Mozilla/5.0"
timeout_secs = 30
"#;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub player: PlayerConfig,
    #[serde(default)]
    pub plot: PlotConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlayerConfig {
    pub name: String,
    #[serde(default)]
    pub update: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PlotConfig {
    #[serde(default)]
    pub no_plot: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_store_dir")]
    pub dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: default_store_dir(),
        }
    }
}

fn default_store_dir() -> PathBuf {
    PathBuf::from(".")
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://secure.runescape.com/m=hiscore_oldschool/hiscorepersonal".to_string()
}
fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub player: Option<String>,
    pub update: bool,
    pub no_plot: bool,
}

/// The resolved option set for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub player: String,
    pub update: bool,
    pub no_plot: bool,
}

impl Config {
    /// Layer CLI overrides over the file settings.
    ///
    /// `no_plot` (from either source) forces `update`: a run that shows
    /// nothing must at least refresh the history.
    pub fn resolve(&self, overrides: &Overrides) -> Result<Options> {
        let player = match &overrides.player {
            Some(name) => {
                validate_player_name(name, "--player")?;
                name.clone()
            }
            None => self.player.name.clone(),
        };
        let no_plot = overrides.no_plot || self.plot.no_plot;
        let update = overrides.update || self.player.update || no_plot;
        Ok(Options {
            player,
            update,
            no_plot,
        })
    }
}

/// Player names become part of the history file name.
fn validate_player_name(name: &str, source: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("{} must not be empty", source);
    }
    if name.contains(['/', '\\', '\0']) {
        bail!("{} must not contain path separators: {:?}", source, name);
    }
    Ok(())
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate_player_name(&config.player.name, "player.name")?;

    if config.fetch.base_url.trim().is_empty() {
        bail!("fetch.base_url must not be empty");
    }

    if config.fetch.timeout_secs == 0 {
        bail!("fetch.timeout_secs must be > 0");
    }

    Ok(config)
}

/// Write [`DEFAULT_CONFIG`] to `path`. Refuses to overwrite unless `force`.
pub fn generate_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Config file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    tracing::info!(path = %path.display(), "generated default config");
    Ok(())
}

/// Print every section and key, followed by the resolved run options.
pub fn print_config(config: &Config, options: &Options) {
    println!("player:");
    println!("  name: {}", config.player.name);
    println!("  update: {}", config.player.update);
    println!("plot:");
    println!("  no_plot: {}", config.plot.no_plot);
    println!("store:");
    println!("  dir: {}", config.store.dir.display());
    println!("fetch:");
    println!("  base_url: {}", config.fetch.base_url);
    println!("  user_agent: {}", config.fetch.user_agent);
    println!("  timeout_secs: {}", config.fetch.timeout_secs);
    println!("resolved:");
    println!("  player: {}", options.player);
    println!("  update: {}", options.update);
    println!("  no_plot: {}", options.no_plot);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_text: &str) -> Config {
        toml::from_str(toml_text).unwrap()
    }

    #[test]
    fn default_config_parses() {
        let cfg = parse(DEFAULT_CONFIG);
        assert_eq!(cfg.player.name, "Zezima");
        assert!(!cfg.player.update);
        assert!(!cfg.plot.no_plot);
        assert_eq!(cfg.fetch.timeout_secs, 30);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let cfg = parse("[player]\nname = \"Lynx Titan\"\n");
        assert_eq!(cfg.store.dir, PathBuf::from("."));
        assert_eq!(cfg.fetch.user_agent, "Mozilla/5.0");
        assert!(!cfg.plot.no_plot);
    }

    #[test]
    fn cli_player_overrides_file() {
        let cfg = parse(DEFAULT_CONFIG);
        let opts = cfg
            .resolve(&Overrides {
                player: Some("Woox".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(opts.player, "Woox");
        assert!(!opts.update);
    }

    #[test]
    fn no_plot_forces_update() {
        let cfg = parse(DEFAULT_CONFIG);
        let opts = cfg
            .resolve(&Overrides {
                no_plot: true,
                ..Default::default()
            })
            .unwrap();
        assert!(opts.no_plot);
        assert!(opts.update);

        let cfg = parse("[player]\nname = \"a\"\n[plot]\nno_plot = true\n");
        let opts = cfg.resolve(&Overrides::default()).unwrap();
        assert!(opts.no_plot && opts.update);
    }

    #[test]
    fn generate_refuses_to_overwrite() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("hiscores.toml");

        generate_config(&path, false).unwrap();
        assert!(load_config(&path).is_ok());
        assert!(generate_config(&path, false).is_err());
        assert!(generate_config(&path, true).is_ok());
    }

    #[test]
    fn empty_player_name_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("hiscores.toml");
        std::fs::write(&path, "[player]\nname = \"  \"\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("player.name"));
    }

    #[test]
    fn player_override_must_be_a_plain_name() {
        let cfg = parse(DEFAULT_CONFIG);
        for bad in ["", "   ", "../x", "a/b", "a\\b"] {
            let err = cfg
                .resolve(&Overrides {
                    player: Some(bad.into()),
                    ..Default::default()
                })
                .unwrap_err();
            assert!(err.to_string().contains("--player"), "{}", bad);
        }
    }

    #[test]
    fn player_name_with_separator_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("hiscores.toml");
        std::fs::write(&path, "[player]\nname = \"../escape\"\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("path separators"));
    }
}
