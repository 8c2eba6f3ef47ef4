//! Block explorer provider list.
//!
//! Providers are Blockscout-compatible `/api/v2` endpoints. The list is read
//! once at startup, from `config/providers.ron` when present.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerProvider {
    /// Display name, also matched against chain hints ("flow" selects "Flow EVM")
    pub name: String,
    pub base_url: String,
}

impl ExplorerProvider {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Case-insensitive substring match of a chain hint against the display name
    pub fn matches_chain(&self, chain: &str) -> bool {
        self.name.to_lowercase().contains(&chain.to_lowercase())
    }
}

pub fn default_providers() -> Vec<ExplorerProvider> {
    vec![
        ExplorerProvider::new("Ethereum", "https://eth.blockscout.com/api/v2"),
        ExplorerProvider::new("Flow EVM", "https://evm.flowscan.io/api/v2"),
        ExplorerProvider::new("Rootstock", "https://rootstock.blockscout.com/api/v2"),
    ]
}

/// Load a provider list from a RON file
pub fn load_providers(path: &Path) -> Result<Vec<ExplorerProvider>, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {:?}: {}", path, e))?;

    let providers: Vec<ExplorerProvider> =
        ron::from_str(&content).map_err(|e| format!("Failed to parse {:?}: {}", path, e))?;

    let providers: Vec<ExplorerProvider> = providers
        .into_iter()
        .map(|p| ExplorerProvider::new(p.name, p.base_url))
        .collect();

    log::info!(
        "[CONFIG] Loaded {} providers from {:?}: {}",
        providers.len(),
        path,
        providers
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(providers)
}
