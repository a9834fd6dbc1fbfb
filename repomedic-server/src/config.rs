//! Listener and CORS configuration loaded from the environment.

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_UI_ORIGINS: &str = "http://127.0.0.1:4200,http://localhost:4200";
const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen address.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Origins allowed by CORS.
    pub ui_origins: Vec<String>,
    /// Number of analysis sessions kept in memory.
    pub history_limit: usize,
}

impl ServerConfig {
    /// Read `REPOMEDIC_HOST`, `REPOMEDIC_PORT`, `REPOMEDIC_UI_ORIGINS` and
    /// `REPOMEDIC_HISTORY_LIMIT`.
    #[cfg_attr(test, allow(dead_code))]
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let port = match lookup("REPOMEDIC_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| format!("REPOMEDIC_PORT must be a u16 number, got {raw:?}"))?,
            None => DEFAULT_PORT,
        };
        let history_limit = match lookup("REPOMEDIC_HISTORY_LIMIT") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                format!("REPOMEDIC_HISTORY_LIMIT must be a positive number, got {raw:?}")
            })?,
            None => DEFAULT_HISTORY_LIMIT,
        };
        let origins =
            lookup("REPOMEDIC_UI_ORIGINS").unwrap_or_else(|| DEFAULT_UI_ORIGINS.to_string());
        Ok(Self {
            host: lookup("REPOMEDIC_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            ui_origins: origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect(),
            history_limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config(&[]).expect("config");
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.history_limit, 50);
        assert_eq!(
            config.ui_origins,
            vec!["http://127.0.0.1:4200", "http://localhost:4200"]
        );
    }

    #[test]
    fn reads_overrides_and_trims_origins() {
        let config = config(&[
            ("REPOMEDIC_HOST", "0.0.0.0"),
            ("REPOMEDIC_PORT", "9000"),
            ("REPOMEDIC_UI_ORIGINS", " https://a.dev , ,https://b.dev"),
            ("REPOMEDIC_HISTORY_LIMIT", "5"),
        ])
        .expect("config");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.ui_origins, vec!["https://a.dev", "https://b.dev"]);
        assert_eq!(config.history_limit, 5);
    }

    #[test]
    fn rejects_invalid_port() {
        let err = config(&[("REPOMEDIC_PORT", "http")]).expect_err("invalid port");
        assert!(err.contains("REPOMEDIC_PORT"));
    }
}
