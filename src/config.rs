use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;
use crate::fixes::platform::Platform;
use crate::http_client::DEFAULT_USER_AGENT;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub concurrency: u16,
    pub per_host: u16,
    pub timeout_secs: u64,
    pub retries: u8,
    pub cache_ttl_secs: u64,
    pub user_agent: String,
    pub platforms: Vec<Platform>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency: 50,
            per_host: 6,
            timeout_secs: 10,
            retries: 2,
            cache_ttl_secs: 300,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            platforms: crate::analyze::engine::default_platforms(),
        }
    }
}

impl Config {
    /// Loads a JSON config file; missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse { path: display, source })
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"concurrency": 4, "platforms": ["vercel", "caddy"]}}"#).unwrap();
        let cfg = Config::load(file.path()).unwrap();
        assert_eq!(cfg.concurrency, 4);
        assert_eq!(cfg.per_host, 6);
        assert_eq!(cfg.platforms, vec![Platform::Vercel, Platform::Other("caddy".into())]);
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            Config::load(Path::new("/definitely/not/here.json")),
            Err(ConfigError::Io { .. })
        ));
    }
}
