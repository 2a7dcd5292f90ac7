//! @acp:module "Configuration"
//! @acp:summary "Project configuration loading and defaults"
//! @acp:domain cli
//! @acp:layer config
//!
//! Project configuration loading and defaults
//!
//! Read from `.restgen.config.json`. Every field has a default, so an empty
//! object (or no file at all) is a valid configuration. CLI flags override
//! whatever is loaded here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::emit::{ClientFlavor, EmitSettings, DEFAULT_SERVER_URL};
use crate::resolve::DEFAULT_SOURCE_EXTENSION;

/// Default config file name
pub const DEFAULT_CONFIG_FILE: &str = ".restgen.config.json";

/// Main restgen configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Class decorator marking an API declaration
    #[serde(default = "default_api_decorator")]
    pub api_decorator: String,

    /// Method decorator marking an exposed operation
    #[serde(default = "default_method_decorator")]
    pub method_decorator: String,

    /// Extension appended to extensionless import specifiers
    #[serde(default = "default_source_extension")]
    pub source_extension: String,

    /// Default output path for `generate`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Inline referenced declarations instead of importing them
    #[serde(default = "default_true")]
    pub embed_interfaces: bool,

    #[serde(default)]
    pub flavor: ClientFlavor,

    /// Expression assigned to the generated service's `serverUrl`
    #[serde(default = "default_server_url")]
    pub server_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_decorator: default_api_decorator(),
            method_decorator: default_method_decorator(),
            source_extension: default_source_extension(),
            output: None,
            embed_interfaces: true,
            flavor: ClientFlavor::default(),
            server_url: default_server_url(),
        }
    }
}

impl Config {
    /// Load config from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save config to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from the default location, falling back to defaults
    pub fn load_or_default() -> Self {
        Self::load(DEFAULT_CONFIG_FILE).unwrap_or_default()
    }

    /// Emitter settings derived from this config
    pub fn emit_settings(&self) -> EmitSettings {
        EmitSettings {
            class_name: None,
            embed_interfaces: self.embed_interfaces,
            flavor: self.flavor,
            api_decorator: self.api_decorator.clone(),
            method_decorator: self.method_decorator.clone(),
            source_extension: self.source_extension.clone(),
            server_url: self.server_url.clone(),
        }
    }
}

fn default_api_decorator() -> String {
    "RestAPI".to_string()
}

fn default_method_decorator() -> String {
    "RestMethod".to_string()
}

fn default_source_extension() -> String {
    DEFAULT_SOURCE_EXTENSION.to_string()
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_true() -> bool {
    true
}
