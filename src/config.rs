use directories::ProjectDirs;
use gridcheck_core::Defaults;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

/// Contents of `config.toml`.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// `tracing` filter directive, e.g. `"gridcheck_core=debug"`.
    pub log_filter: Option<String>,
    pub defaults: Defaults,
}

pub fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "gridcheck")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

fn read_config_file(path: &Path) -> Result<Config, String> {
    let meta = std::fs::metadata(path)
        .map_err(|err| format!("Failed to read metadata for {}: {}", path.display(), err))?;
    if meta.len() > MAX_CONFIG_FILE_BYTES {
        return Err(format!(
            "Refusing to read {}: file too large ({} bytes, max {})",
            path.display(),
            meta.len(),
            MAX_CONFIG_FILE_BYTES
        ));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|err| format!("Failed to read {}: {}", path.display(), err))?;
    toml::from_str(&content).map_err(|err| format!("Failed to parse {}: {}", path.display(), err))
}

/// Load the config file, falling back to defaults.
///
/// Problems are returned as warnings so they can be logged once logging
/// is up. A missing default file is not a problem; a missing `--config`
/// file is.
pub fn load_config(explicit: Option<&Path>) -> (Config, Vec<String>) {
    let mut warnings = Vec::new();
    let path = explicit.map(Path::to_path_buf).or_else(user_config_path);
    let Some(path) = path else {
        return (Config::default(), warnings);
    };
    if !path.exists() {
        if explicit.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (Config::default(), warnings);
    }
    match read_config_file(&path) {
        Ok(config) => (config, warnings),
        Err(warning) => {
            warnings.push(warning);
            (Config::default(), warnings)
        }
    }
}
