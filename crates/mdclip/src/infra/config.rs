//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".mdclip/config.toml";

/// Layered configuration loaded from defaults, user, workspace, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub selection: Selection,
    #[serde(default)]
    pub clipboard: ClipboardConfig,
    #[serde(default)]
    pub notifications: Notifications,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default = "Defaults::default_engine")]
    pub engine: String,
}

impl Defaults {
    fn default_engine() -> String {
        "auto".to_owned()
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            engine: Self::default_engine(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Selection {
    #[serde(default)]
    modern: Option<bool>,
    #[serde(default)]
    legacy: Option<bool>,
}

impl Selection {
    pub fn modern(&self) -> bool {
        self.modern.unwrap_or(true)
    }

    pub fn legacy(&self) -> bool {
        self.legacy.unwrap_or(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ClipboardConfig {
    #[serde(default)]
    allow_fallback: Option<bool>,
}

impl ClipboardConfig {
    pub fn allow_fallback(&self) -> bool {
        self.allow_fallback.unwrap_or(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Notifications {
    #[serde(default)]
    warn_on_degraded: Option<bool>,
}

impl Notifications {
    pub fn warn_on_degraded(&self) -> bool {
        self.warn_on_degraded.unwrap_or(true)
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    engine: Option<String>,
    allow_fallback: Option<bool>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            engine: env::var("MDCLIP_ENGINE").ok(),
            allow_fallback: env::var("MDCLIP_ALLOW_FALLBACK")
                .ok()
                .and_then(|value| parse_bool(&value)),
        }
    }

    #[cfg(test)]
    fn for_tests(engine: &str, allow_fallback: bool) -> Self {
        Self {
            engine: Some(engine.to_owned()),
            allow_fallback: Some(allow_fallback),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Load configuration from defaults, user/global config, workspace
    /// config, and env overrides.
    pub fn load() -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = workspace_config_path()?;
        Self::load_with_layers(global, workspace, env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            layers.push(Self::from_file(&workspace_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            defaults: merge_defaults(self.defaults, other.defaults),
            selection: merge_selection(self.selection, other.selection),
            clipboard: merge_clipboard(self.clipboard, other.clipboard),
            notifications: merge_notifications(self.notifications, other.notifications),
        }
    }
}

fn merge_defaults(base: Defaults, overlay: Defaults) -> Defaults {
    Defaults {
        engine: if overlay.engine != Defaults::default_engine() {
            overlay.engine
        } else {
            base.engine
        },
    }
}

fn merge_selection(mut base: Selection, overlay: Selection) -> Selection {
    if let Some(value) = overlay.modern {
        base.modern = Some(value);
    }
    if let Some(value) = overlay.legacy {
        base.legacy = Some(value);
    }
    base
}

fn merge_clipboard(mut base: ClipboardConfig, overlay: ClipboardConfig) -> ClipboardConfig {
    if let Some(value) = overlay.allow_fallback {
        base.allow_fallback = Some(value);
    }
    base
}

fn merge_notifications(mut base: Notifications, overlay: Notifications) -> Notifications {
    if let Some(value) = overlay.warn_on_degraded {
        base.warn_on_degraded = Some(value);
    }
    base
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("mdclip/config.toml"))
}

fn workspace_config_path() -> Result<Option<PathBuf>> {
    let cwd = env::current_dir()?;
    let root = find_repo_root(&cwd).unwrap_or(cwd);
    Ok(Some(root.join(DEFAULT_WORKSPACE_CONFIG_PATH)))
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(engine) = env.engine {
        config.defaults.engine = engine;
    }
    if let Some(allow_fallback) = env.allow_fallback {
        config.clipboard.allow_fallback = Some(allow_fallback);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_uses_defaults_when_no_files() {
        let config = Config::load_with_layers(None, None, EnvOverrides::default())
            .expect("load default config");
        assert_eq!(config.defaults.engine, "auto");
        assert!(config.selection.modern());
        assert!(config.selection.legacy());
        assert!(config.clipboard.allow_fallback());
        assert!(config.notifications.warn_on_degraded());
    }

    #[test]
    fn merge_global_and_workspace() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let global = temp.path().join("config.toml");
        fs::write(
            &global,
            r#"
[defaults]
engine = "legacy"
[selection]
modern = false
"#,
        )?;

        let workspace_dir = temp.path().join("repo");
        fs::create_dir_all(workspace_dir.join(".mdclip"))?;
        fs::create_dir_all(workspace_dir.join(".git"))?;
        fs::write(
            workspace_dir.join(".mdclip/config.toml"),
            r#"
[clipboard]
allow_fallback = false
[notifications]
warn_on_degraded = false
"#,
        )?;

        let global_path = Some(global);
        let workspace_path = Some(workspace_dir.join(".mdclip/config.toml"));

        let config =
            Config::load_with_layers(global_path, workspace_path, EnvOverrides::default())?;

        assert_eq!(config.defaults.engine, "legacy");
        assert!(!config.selection.modern());
        assert!(config.selection.legacy());
        assert!(!config.clipboard.allow_fallback());
        assert!(!config.notifications.warn_on_degraded());

        Ok(())
    }

    #[test]
    fn env_overrides_take_precedence() -> Result<()> {
        let overrides = EnvOverrides::for_tests("modern", false);
        let config = Config::load_with_layers(None, None, overrides)?;
        assert_eq!(config.defaults.engine, "modern");
        assert!(!config.clipboard.allow_fallback());
        Ok(())
    }

    #[test]
    fn invalid_config_returns_error() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let file = temp.path().join("broken.toml");
        fs::write(&file, "this is not toml")?;
        let result = Config::from_file(&file);
        assert!(result.is_err());
        Ok(())
    }
}
