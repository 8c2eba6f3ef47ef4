use crate::blockchain::{ExplorerProvider, default_providers, load_providers};
use std::env;
use std::path::{Path, PathBuf};

const DEFAULT_PROVIDERS_CONFIG: &str = "config/providers.ron";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub bind_address: String,
    pub database_url: String,
    pub telegram_bot_token: Option<String>,
    pub openai_api_key: String,
    pub openai_endpoint: String,
    pub openai_model: String,
    pub providers_config: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("PORT '{}' is not a valid port, using 3000", raw);
                3000
            }),
            None => 3000,
        };

        Self {
            port,
            bind_address: get("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0".to_string()),
            database_url: get("DATABASE_URL").unwrap_or_else(|| "./memory.db".to_string()),
            telegram_bot_token: get("TELEGRAM_BOT_TOKEN"),
            openai_api_key: get("OPENAI_API_KEY").unwrap_or_default(),
            openai_endpoint: get("OPENAI_ENDPOINT")
                .unwrap_or_else(|| "https://api.openai.com/v1/chat/completions".to_string()),
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            providers_config: get("PROVIDERS_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PROVIDERS_CONFIG)),
        }
    }

    /// Provider list from the RON config, or the built-in list when the file
    /// is absent or unreadable.
    pub fn load_providers(&self) -> Vec<ExplorerProvider> {
        providers_from_path(&self.providers_config)
    }
}

fn providers_from_path(path: &Path) -> Vec<ExplorerProvider> {
    if !path.exists() {
        log::info!(
            "[CONFIG] No provider config at {:?}, using built-in providers",
            path
        );
        return default_providers();
    }

    match load_providers(path) {
        Ok(providers) if !providers.is_empty() => providers,
        Ok(_) => {
            log::warn!("[CONFIG] {:?} lists no providers, using built-in providers", path);
            default_providers()
        }
        Err(e) => {
            log::warn!("[CONFIG] {}, using built-in providers", e);
            default_providers()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.database_url, "./memory.db");
        assert!(config.telegram_bot_token.is_none());
        assert_eq!(config.openai_model, "gpt-4o-mini");
        assert_eq!(config.providers_config, PathBuf::from("config/providers.ron"));
    }

    #[test]
    fn test_overrides_and_blank_values() {
        let config = config_from(&[
            ("PORT", "8088"),
            ("DATABASE_URL", ":memory:"),
            ("TELEGRAM_BOT_TOKEN", "   "),
            ("OPENAI_MODEL", "gpt-4o"),
        ]);
        assert_eq!(config.port, 8088);
        assert_eq!(config.database_url, ":memory:");
        assert!(config.telegram_bot_token.is_none(), "blank token disables telegram");
        assert_eq!(config.openai_model, "gpt-4o");
    }

    #[test]
    fn test_invalid_port_falls_back() {
        let config = config_from(&[("PORT", "not-a-port")]);
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_missing_provider_file_uses_builtin() {
        let config = config_from(&[("PROVIDERS_CONFIG", "/nonexistent/providers.ron")]);
        let providers = config.load_providers();
        assert_eq!(providers, default_providers());
    }

    #[test]
    fn test_provider_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"[(name: "Base", base_url: "https://base.blockscout.com/api/v2/")]"#
        )
        .unwrap();

        let config = config_from(&[("PROVIDERS_CONFIG", file.path().to_str().unwrap())]);
        let providers = config.load_providers();
        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].name, "Base");
        assert_eq!(providers[0].base_url, "https://base.blockscout.com/api/v2");
    }

    #[test]
    fn test_malformed_provider_file_uses_builtin() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "this is not ron").unwrap();

        let config = config_from(&[("PROVIDERS_CONFIG", file.path().to_str().unwrap())]);
        assert_eq!(config.load_providers(), default_providers());
    }
}
