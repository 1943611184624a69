//! Tool server definition files
//!
//! Two formats are accepted, chosen by file extension:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "awslabs.cost-analysis-mcp-server": {
//!       "command": "uvx",
//!       "args": ["awslabs.cost-analysis-mcp-server@latest"],
//!       "env": { "FASTMCP_LOG_LEVEL": "ERROR" }
//!     }
//!   },
//!   "platform_overrides": {
//!     "windows": {
//!       "mcpServers": {
//!         "awslabs.cost-analysis-mcp-server": { "command": "uvx.exe" }
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! ```toml
//! [servers."awslabs.cost-analysis-mcp-server"]
//! command = "uvx"
//! args = ["awslabs.cost-analysis-mcp-server@latest"]
//! ```
//!
//! Platform overrides only patch servers already defined at the top level,
//! field by field.

use super::error::ConfigError;
use advisor_domain::ToolServerDescriptor;
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

/// On-disk format of a server definition file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerFileFormat {
    Json,
    Toml,
}

impl ServerFileFormat {
    /// `.toml` selects TOML; everything else is read as JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ServerFileFormat::Toml,
            _ => ServerFileFormat::Json,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawServerEntry {
    command: Option<String>,
    args: Option<Vec<String>>,
    env: Option<BTreeMap<String, String>>,
    disabled: Option<bool>,
}

impl RawServerEntry {
    fn patch(&mut self, other: RawServerEntry) {
        if other.command.is_some() {
            self.command = other.command;
        }
        if other.args.is_some() {
            self.args = other.args;
        }
        if other.env.is_some() {
            self.env = other.env;
        }
        if other.disabled.is_some() {
            self.disabled = other.disabled;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPlatformOverride {
    #[serde(rename = "mcpServers", alias = "servers")]
    servers: IndexMap<String, RawServerEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawServerFile {
    #[serde(rename = "mcpServers", alias = "servers")]
    servers: IndexMap<String, RawServerEntry>,
    platform_overrides: BTreeMap<String, RawPlatformOverride>,
}

/// Platform key used under `platform_overrides`
pub fn current_platform() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

/// Read and parse a server definition file for the current platform
pub fn load_server_file(path: &Path) -> Result<IndexMap<String, ToolServerDescriptor>, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ServerFileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_server_config(&text, ServerFileFormat::from_path(path), current_platform()).map_err(
        |message| ConfigError::ServerFileParse {
            path: path.to_path_buf(),
            message,
        },
    )
}

/// Parse server definitions, applying the overrides for `platform`.
///
/// Entries without a command are skipped with a warning.
pub fn parse_server_config(
    text: &str,
    format: ServerFileFormat,
    platform: &str,
) -> Result<IndexMap<String, ToolServerDescriptor>, String> {
    let mut raw: RawServerFile = match format {
        ServerFileFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string())?,
        ServerFileFormat::Toml => toml::from_str(text).map_err(|e| e.to_string())?,
    };

    if let Some(overrides) = raw.platform_overrides.remove(platform) {
        for (name, patch) in overrides.servers {
            if let Some(entry) = raw.servers.get_mut(&name) {
                entry.patch(patch);
            }
        }
    }

    let mut descriptors = IndexMap::new();
    for (name, entry) in raw.servers {
        let Some(command) = entry.command.filter(|c| !c.trim().is_empty()) else {
            warn!(server = %name, "Skipping tool server with incomplete config (no command)");
            continue;
        };
        let descriptor = ToolServerDescriptor {
            name: name.clone(),
            command,
            args: entry.args.unwrap_or_default(),
            env: entry.env.unwrap_or_default(),
            disabled: entry.disabled.unwrap_or(false),
        };
        descriptors.insert(name, descriptor);
    }
    Ok(descriptors)
}
