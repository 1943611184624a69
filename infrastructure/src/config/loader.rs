//! Configuration file loader with multi-source merging

use super::error::ConfigError;
use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use tracing::debug;

const PROJECT_FILES: [&str; 2] = ["advisor.toml", ".advisor.toml"];
const ENV_PREFIX: &str = "ADVISOR_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `ADVISOR_` environment variables (`ADVISOR_GATEWAY__INVOCATION_TIMEOUT_SECS=60`)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./advisor.toml` or `./.advisor.toml`
    /// 4. Global: `<config dir>/aws-advisor/config.toml`
    /// 5. Default values
    ///
    /// The merged result is validated before it is returned.
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, ConfigError> {
        let mut files = Vec::new();
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            files.push(global_path);
        }
        if let Some(project_path) = Self::project_config_path() {
            files.push(project_path);
        }
        if let Some(path) = config_path {
            files.push(path.to_path_buf());
        }

        let figment = Self::figment_for(&files).merge(Env::prefixed(ENV_PREFIX).split("__"));
        let config: FileConfig = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Merge the given files over the defaults, later files winning
    pub fn load_files(paths: &[PathBuf]) -> Result<FileConfig, ConfigError> {
        let config: FileConfig = Self::figment_for(paths).extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Load only default configuration
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    fn figment_for(paths: &[PathBuf]) -> Figment {
        paths.iter().fold(
            Figment::new().merge(Serialized::defaults(FileConfig::default())),
            |figment, path| {
                debug!(path = %path.display(), "Merging config file");
                figment.merge(Toml::file(path))
            },
        )
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("aws-advisor").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_toml(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.cache.default_ttl_secs, 300);
        assert!(config.gateway.servers_file.is_none());
    }

    #[test]
    fn test_global_config_path_names_the_app() {
        if let Some(path) = ConfigLoader::global_config_path() {
            assert!(path.to_string_lossy().contains("aws-advisor"));
        }
    }

    #[test]
    fn test_later_files_override_earlier() {
        let dir = tempfile::tempdir().unwrap();
        let global = write_toml(
            &dir,
            "global.toml",
            "[cache]\ndefault_ttl_secs = 60\n[gateway]\ninvocation_timeout_secs = 30\n",
        );
        let project = write_toml(&dir, "advisor.toml", "[cache]\ndefault_ttl_secs = 90\n");

        let config = ConfigLoader::load_files(&[global, project]).unwrap();
        assert_eq!(config.cache.default_ttl_secs, 90);
        assert_eq!(config.gateway.invocation_timeout_secs, 30);
        assert_eq!(config.estimation.static_ttl_secs, 1800);
    }

    #[test]
    fn test_missing_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigLoader::load_files(&[dir.path().join("absent.toml")]).unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_toml(&dir, "bad.toml", "[estimation]\ntool_ttl_secs = 0\n");
        assert!(matches!(
            ConfigLoader::load_files(&[path]),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_malformed_toml_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_toml(&dir, "broken.toml", "[cache\ndefault_ttl_secs = ");
        assert!(matches!(
            ConfigLoader::load_files(&[path]),
            Err(ConfigError::Load(_))
        ));
    }
}
