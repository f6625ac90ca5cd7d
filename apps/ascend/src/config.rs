use std::path::PathBuf;

use anyhow::{Result, anyhow};

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
const STATE_DIR_NAME: &str = ".ascend";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub api_url: String,
    pub state_dir: PathBuf,
}

impl AppConfig {
    /// Reads the process environment, after loading `.env` if present.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_url = var("ASCEND_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(anyhow!("ASCEND_API_URL must be an http(s) URL, got {api_url}"));
        }

        let state_dir = match var("ASCEND_STATE_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => var("HOME")
                .map(|home| PathBuf::from(home).join(STATE_DIR_NAME))
                .unwrap_or_else(|| PathBuf::from(".").join(STATE_DIR_NAME)),
        };

        Ok(Self { api_url, state_dir })
    }

    /// Command-line flags win over the environment.
    pub fn with_overrides(mut self, api_url: Option<String>, state_dir: Option<PathBuf>) -> Self {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        if let Some(dir) = state_dir {
            self.state_dir = dir;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[("HOME", "/home/asha")]).unwrap();
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert_eq!(cfg.state_dir, PathBuf::from("/home/asha/.ascend"));
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.state_dir, PathBuf::from("./.ascend"));
    }

    #[test]
    fn environment_and_flags_override() {
        let cfg = config(&[
            ("ASCEND_API_URL", "https://hr.example.com/"),
            ("ASCEND_STATE_DIR", "/var/lib/ascend"),
        ])
        .unwrap();
        assert_eq!(cfg.api_url, "https://hr.example.com");
        assert_eq!(cfg.state_dir, PathBuf::from("/var/lib/ascend"));
        let cfg = cfg.with_overrides(Some("http://127.0.0.1:9000".into()), None);
        assert_eq!(cfg.api_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(config(&[("ASCEND_API_URL", "ftp://files")]).is_err());
    }
}
