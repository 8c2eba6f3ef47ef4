//! Shared types for the memory bot backend and its RPC clients.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =====================================================
// Domain Types
// =====================================================

/// A memory saved by a user ("I loved the ramen at Ichiran")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: i64,
    pub user_id: String,
    pub category: String,
    pub content: String,
    pub metadata: Value,
    pub timestamp: String,
    pub schema_version: i64,
}

/// One processed message and the reply that was delivered for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub id: i64,
    pub user_id: String,
    pub message: String,
    pub response: String,
    pub timestamp: String,
}

// =====================================================
// Block Explorer Types
// =====================================================

/// A token entry as returned by a Blockscout-style `/tokens` search.
///
/// Explorers disagree on a few field names between versions, so both
/// spellings are accepted and resolved through the accessor methods.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenItem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_hash: Option<String>,
    #[serde(default)]
    pub exchange_rate: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holders_count: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holders: Option<Value>,
    #[serde(default)]
    pub volume_24h: Option<Value>,
}

impl TokenItem {
    pub fn contract_address(&self) -> Option<&str> {
        self.address.as_deref().or(self.address_hash.as_deref())
    }

    pub fn holder_count(&self) -> Option<&Value> {
        self.holders_count.as_ref().or(self.holders.as_ref())
    }
}

/// Top matches from one provider, tagged with the provider's display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSearchGroup {
    pub chain: String,
    pub tokens: Vec<TokenItem>,
}

/// One day of market data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: String,
    #[serde(default)]
    pub closing_price: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<Value>,
}

/// Recent market chart for a chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketChart {
    pub chain: String,
    pub chart_data: Vec<ChartPoint>,
    #[serde(default)]
    pub available_supply: Option<Value>,
}

/// Token detail payload, passed through from the explorer with the chain name added
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenDetails {
    pub chain: String,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, Value>,
}

// =====================================================
// RPC Request / Response Types
// =====================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecallRequest {
    pub user_id: String,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSearchRequest {
    pub symbol: String,
    #[serde(default)]
    pub chain: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenDetailsRequest {
    pub address: String,
    pub chain: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartQuery {
    #[serde(default)]
    pub chain: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub running: bool,
    pub uptime_secs: u64,
    pub providers: Vec<String>,
    pub telegram_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> RpcResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_token_item_accepts_both_field_spellings() {
        let old: TokenItem = serde_json::from_value(json!({
            "name": "Tether USD",
            "symbol": "USDT",
            "address": "0xdac17f958d2ee523a2206206994597c13d831ec7",
            "holders_count": "6543210",
            "exchange_rate": "1.0",
            "volume_24h": null
        }))
        .unwrap();
        assert_eq!(old.contract_address(), Some("0xdac17f958d2ee523a2206206994597c13d831ec7"));
        assert_eq!(old.holder_count(), Some(&json!("6543210")));
        assert_eq!(old.volume_24h, None);

        let new: TokenItem = serde_json::from_value(json!({
            "name": "Tether USD",
            "symbol": "USDT",
            "address_hash": "0xabc",
            "holders": "12"
        }))
        .unwrap();
        assert_eq!(new.contract_address(), Some("0xabc"));
        assert_eq!(new.holder_count(), Some(&json!("12")));
    }

    #[test]
    fn test_token_details_flattens_explorer_fields() {
        let details = TokenDetails {
            chain: "Ethereum".to_string(),
            fields: serde_json::from_value(json!({"symbol": "USDT", "decimals": "6"})).unwrap(),
        };
        let value = serde_json::to_value(&details).unwrap();
        assert_eq!(value["chain"], "Ethereum");
        assert_eq!(value["symbol"], "USDT");
        assert_eq!(value["decimals"], "6");
    }

    #[test]
    fn test_rpc_response_skips_empty_fields() {
        let ok = serde_json::to_value(RpcResponse::ok(1)).unwrap();
        assert_eq!(ok, json!({"success": true, "data": 1}));

        let err = serde_json::to_value(RpcResponse::<i32>::err("boom")).unwrap();
        assert_eq!(err, json!({"success": false, "error": "boom"}));
    }
}
