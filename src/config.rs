use serde::Serialize;
use std::path::PathBuf;

/// Workbook read when nothing else is configured.
pub const DEFAULT_DATA_PATH: &str = "KOTA_MEDAN_LENGKAP_KELURAHAN_DISABILITAS.xlsx";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Runtime settings for the dashboard server.
///
/// Resolved from `DASHBOARD_DATA`, `DASHBOARD_ADDR` and `DASHBOARD_STATIC`,
/// then overridden by positional arguments `<data_path> [bind_addr]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub bind_addr: String,
    pub static_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; blank values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            data_path: get("DASHBOARD_DATA")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            bind_addr: get("DASHBOARD_ADDR").unwrap_or(defaults.bind_addr),
            static_dir: get("DASHBOARD_STATIC")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
        }
    }

    /// Apply positional command-line arguments (program name excluded).
    pub fn with_args(mut self, args: &[String]) -> Self {
        if let Some(path) = args.first() {
            self.data_path = PathBuf::from(path);
        }
        if let Some(addr) = args.get(1) {
            self.bind_addr = addr.clone();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_when_nothing_set() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.bind_addr, "127.0.0.1:3000");
    }

    #[test]
    fn env_then_args() {
        let env: HashMap<&str, &str> = [
            ("DASHBOARD_DATA", "/srv/data.xlsx"),
            ("DASHBOARD_ADDR", " "),
            ("DASHBOARD_STATIC", "/srv/static"),
        ]
        .into_iter()
        .collect();
        let config = AppConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.data_path, PathBuf::from("/srv/data.xlsx"));
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.static_dir, PathBuf::from("/srv/static"));

        let config = config.with_args(&["other.xlsx".to_string(), "0.0.0.0:8080".to_string()]);
        assert_eq!(config.data_path, PathBuf::from("other.xlsx"));
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }
}
