use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::cli::args::{OutputFormat, StoreBackendArg};

/// Top-level representation of `.stringstore/config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub store: Option<StoreSection>,

    #[serde(default)]
    pub output: Option<OutputSection>,

    #[serde(default)]
    pub serve: Option<ServeSection>,

    #[serde(default)]
    pub http: Option<HttpSection>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StoreSection {
    #[serde(default)]
    pub backend: Option<StoreBackendArg>,
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OutputSection {
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServeSection {
    #[serde(default)]
    pub addr: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HttpSection {
    #[serde(default)]
    pub server_url: Option<String>,
}

/// Discover and load a project-local `.stringstore/config.toml` (or
/// `.stringstore/stringstore.toml`) starting from the current working
/// directory and walking up parent directories.
pub fn load_cli_config() -> Result<Option<CliConfig>> {
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let config_path = find_project_config(&cwd);

    let Some(path) = config_path else {
        return Ok(None);
    };

    let contents = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: CliConfig = toml::from_str(&contents)
        .with_context(|| format!("failed to parse TOML config at {}", path.display()))?;

    Ok(Some(config))
}

fn find_project_config(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);

    while let Some(current) = dir {
        let store_dir = current.join(".stringstore");
        let config_toml = store_dir.join("config.toml");
        if config_toml.is_file() {
            return Some(config_toml);
        }

        let store_toml = store_dir.join("stringstore.toml");
        if store_toml.is_file() {
            return Some(store_toml);
        }

        dir = current.parent();
    }

    None
}

/// Fill store-related options from the config file when the CLI left
/// them unset.
pub fn apply_store_defaults(
    config: &CliConfig,
    backend: &mut Option<StoreBackendArg>,
    store_path: &mut Option<PathBuf>,
) {
    if let Some(store) = &config.store {
        if backend.is_none() {
            if let Some(value) = store.backend {
                *backend = Some(value);
            }
        }

        if store_path.is_none() {
            if let Some(path) = &store.path {
                *store_path = Some(path.clone());
            }
        }
    }
}

/// Fill the output format from the config file when the CLI left it
/// at the default.
pub fn apply_format_default(config: &CliConfig, format: &mut OutputFormat) {
    if matches!(format, OutputFormat::Text) {
        if let Some(output) = &config.output {
            if let Some(value) = output.format {
                *format = value;
            }
        }
    }
}

/// Fill the server URL from the config file when the CLI left it
/// unset.
pub fn apply_server_default(config: &CliConfig, server: &mut Option<String>) {
    if server.is_none() {
        if let Some(http) = &config.http {
            if let Some(url) = &http.server_url {
                *server = Some(url.clone());
            }
        }
    }
}

/// Fill the daemon bind address from the config file when the CLI
/// left it at the default.
pub fn apply_serve_defaults(config: &CliConfig, addr: &mut String) {
    if addr == "127.0.0.1:7878" {
        if let Some(serve) = &config.serve {
            if let Some(value) = &serve.addr {
                *addr = value.clone();
            }
        }
    }
}
