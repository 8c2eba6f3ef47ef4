//! Block explorer access: token search fan-out, token details, market charts.

pub mod error;
pub mod format;
pub mod providers;

pub use error::BlockchainError;
pub use format::{format_chart_response, format_token_response};
pub use providers::{ExplorerProvider, default_providers, load_providers};

use futures_util::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use web3_memory_types::{ChartPoint, MarketChart, TokenDetails, TokenItem, TokenSearchGroup};

/// Per-provider timeout for token searches
pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);
/// Top results kept from each provider
pub const MAX_TOKENS_PER_PROVIDER: usize = 3;
/// Trailing days of market data kept in a chart
pub const CHART_DAYS: usize = 7;

#[derive(Debug, Deserialize)]
struct TokenSearchPage {
    #[serde(default)]
    items: Option<Vec<TokenItem>>,
}

#[derive(Debug, Deserialize)]
struct MarketChartPage {
    #[serde(default)]
    chart_data: Option<Vec<ChartPoint>>,
    #[serde(default)]
    available_supply: Option<Value>,
}

pub struct BlockchainService {
    client: Client,
    providers: Vec<ExplorerProvider>,
    lookup_timeout: Duration,
}

impl BlockchainService {
    pub fn new(providers: Vec<ExplorerProvider>) -> Self {
        Self::with_client(crate::http::shared_client().clone(), providers)
    }

    pub fn with_client(client: Client, providers: Vec<ExplorerProvider>) -> Self {
        Self {
            client,
            providers,
            lookup_timeout: LOOKUP_TIMEOUT,
        }
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub fn providers(&self) -> &[ExplorerProvider] {
        &self.providers
    }

    /// Search every provider (or those matching `chain`) for ERC-20 tokens by symbol.
    ///
    /// Providers are queried concurrently. A provider that fails, times out or
    /// has no matches is left out; results keep provider order.
    pub async fn search_token(&self, symbol: &str, chain: Option<&str>) -> Vec<TokenSearchGroup> {
        let selected: Vec<&ExplorerProvider> = match chain.map(str::trim).filter(|c| !c.is_empty()) {
            Some(chain) => self
                .providers
                .iter()
                .filter(|p| p.matches_chain(chain))
                .collect(),
            None => self.providers.iter().collect(),
        };

        log::info!(
            "[BLOCKCHAIN] Searching '{}' on {} provider(s)",
            symbol,
            selected.len()
        );

        let lookups = selected
            .into_iter()
            .map(|provider| self.search_provider(provider, symbol));

        join_all(lookups).await.into_iter().flatten().collect()
    }

    async fn search_provider(
        &self,
        provider: &ExplorerProvider,
        symbol: &str,
    ) -> Option<TokenSearchGroup> {
        let url = format!(
            "{}/tokens?q={}&type=ERC-20",
            provider.base_url,
            urlencoding::encode(symbol)
        );

        let page: TokenSearchPage = match self
            .get_json(provider, &url, Some(self.lookup_timeout))
            .await
        {
            Ok(page) => page,
            Err(e) => {
                log::warn!("[BLOCKCHAIN] {} search failed: {}", provider.name, e);
                return None;
            }
        };

        let tokens: Vec<TokenItem> = page
            .items
            .unwrap_or_default()
            .into_iter()
            .take(MAX_TOKENS_PER_PROVIDER)
            .collect();

        if tokens.is_empty() {
            log::debug!("[BLOCKCHAIN] {} has no match for '{}'", provider.name, symbol);
            return None;
        }

        Some(TokenSearchGroup {
            chain: provider.name.clone(),
            tokens,
        })
    }

    /// Full token record from the first provider whose name matches `chain`
    pub async fn get_token_details(
        &self,
        address: &str,
        chain: &str,
    ) -> Result<TokenDetails, BlockchainError> {
        let provider = self
            .providers
            .iter()
            .find(|p| p.matches_chain(chain))
            .ok_or_else(|| BlockchainError::UnsupportedChain(chain.to_string()))?;

        let url = format!("{}/tokens/{}", provider.base_url, urlencoding::encode(address));
        let mut fields: serde_json::Map<String, Value> = self.get_json(provider, &url, None).await?;
        fields.remove("chain");

        Ok(TokenDetails {
            chain: provider.name.clone(),
            fields,
        })
    }

    /// Last [`CHART_DAYS`] of market data. Unknown chains fall back to the first provider.
    pub async fn get_market_chart(&self, chain: &str) -> Result<MarketChart, BlockchainError> {
        let provider = self
            .providers
            .iter()
            .find(|p| p.matches_chain(chain))
            .or_else(|| self.providers.first())
            .ok_or_else(|| BlockchainError::UnsupportedChain(chain.to_string()))?;

        let url = format!("{}/stats/charts/market", provider.base_url);
        let page: MarketChartPage = self.get_json(provider, &url, None).await?;

        let mut chart_data = page.chart_data.unwrap_or_default();
        if chart_data.len() > CHART_DAYS {
            chart_data.drain(..chart_data.len() - CHART_DAYS);
        }

        Ok(MarketChart {
            chain: provider.name.clone(),
            chart_data,
            available_supply: page.available_supply,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        provider: &ExplorerProvider,
        url: &str,
        timeout: Option<Duration>,
    ) -> Result<T, BlockchainError> {
        log::debug!("[BLOCKCHAIN] GET {}", url);

        let mut request = self.client.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BlockchainError::Status {
                provider: provider.name.clone(),
                status: status.as_u16(),
            });
        }

        Ok(response.json::<T>().await?)
    }
}
