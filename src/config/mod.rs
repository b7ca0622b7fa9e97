use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub limits: Limits,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    /// Listen address for the HTTP API.
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8980)
}

#[derive(Debug, Clone, Deserialize)]
pub struct Limits {
    /// Reject uploaded report documents larger than this many bytes.
    /// Reports are held in memory while parsing, so this bounds memory use.
    #[serde(default = "default_max_report_bytes")]
    pub max_report_bytes: usize,
    /// Number of recent reports compared in a system's report table.
    #[serde(default = "default_table_reports")]
    pub table_reports: usize,
    /// Number of distinct systems shown on the overview table.
    #[serde(default = "default_overview_systems")]
    pub overview_systems: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_report_bytes: default_max_report_bytes(),
            table_reports: default_table_reports(),
            overview_systems: default_overview_systems(),
        }
    }
}

fn default_max_report_bytes() -> usize {
    4 * 1024 * 1024
}

fn default_table_reports() -> usize {
    5
}

fn default_overview_systems() -> usize {
    6
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(String),
    #[error("failed to parse config: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.listen.port(), 8980);
        assert_eq!(config.limits.max_report_bytes, 4 * 1024 * 1024);
        assert_eq!(config.limits.table_reports, 5);
        assert_eq!(config.limits.overview_systems, 6);
    }

    #[test]
    fn test_parse_partial_config() {
        let config: Config = toml::from_str(
            r#"
            [server]
            listen = "0.0.0.0:9000"

            [limits]
            table_reports = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.server.listen.port(), 9000);
        assert_eq!(config.limits.table_reports, 10);
        // Unspecified fields keep their defaults
        assert_eq!(config.limits.overview_systems, 6);
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.limits.table_reports, 5);
    }
}
