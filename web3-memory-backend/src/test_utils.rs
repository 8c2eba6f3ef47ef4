//! Local Blockscout stand-in for tests.
//!
//! Each provider points at `http://127.0.0.1:<port>/<mode>`, where mode is one of
//! `ok`, `slow` (answers after 2s), `broken` (HTTP 500) or `empty` (no items).

use crate::blockchain::ExplorerProvider;
use axum::Router;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

pub struct StubExplorer {
    pub addr: SocketAddr,
}

impl StubExplorer {
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/:mode/tokens", get(search))
            .route("/:mode/tokens/:address", get(details))
            .route("/:mode/stats/charts/market", get(chart));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr }
    }

    pub fn base_url(&self, mode: &str) -> String {
        format!("http://{}/{}", self.addr, mode)
    }
}

/// Providers named `name`, each served by the stub in the given mode
pub fn stub_providers(stub: &StubExplorer, modes: &[(&str, &str)]) -> Vec<ExplorerProvider> {
    modes
        .iter()
        .map(|(name, mode)| ExplorerProvider::new(*name, stub.base_url(mode)))
        .collect()
}

async fn pause_if_slow(mode: &str) {
    if mode == "slow" {
        tokio::time::sleep(Duration::from_secs(2)).await;
    }
}

async fn search(Path(mode): Path<String>, Query(params): Query<HashMap<String, String>>) -> Response {
    pause_if_slow(&mode).await;
    match mode.as_str() {
        "broken" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        "empty" => axum::Json(json!({ "items": [] })).into_response(),
        _ => {
            let q = params.get("q").cloned().unwrap_or_default();
            let kind = params.get("type").cloned().unwrap_or_default();
            let mut items = vec![json!({
                "name": format!("{} ({})", q, kind),
                "symbol": q,
                "address": "0xdac17f958d2ee523a2206206994597c13d831ec7",
                "exchange_rate": "1.001",
                "holders_count": "6543210",
                "volume_24h": "48123456789.12"
            })];
            for i in 1..5 {
                items.push(json!({
                    "name": format!("Copycat {}", i),
                    "symbol": q,
                    "address_hash": format!("0x{:040x}", i),
                    "exchange_rate": null,
                    "holders": i.to_string()
                }));
            }
            axum::Json(json!({ "items": items, "next_page_params": null })).into_response()
        }
    }
}

async fn details(Path((mode, address)): Path<(String, String)>) -> Response {
    pause_if_slow(&mode).await;
    match mode.as_str() {
        "broken" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => axum::Json(json!({
            "address": address,
            "name": "Tether USD",
            "symbol": "USDT",
            "decimals": "6",
            "chain": "overwritten",
        }))
        .into_response(),
    }
}

async fn chart(Path(mode): Path<String>) -> Response {
    pause_if_slow(&mode).await;
    match mode.as_str() {
        "broken" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        "empty" => axum::Json(json!({})).into_response(),
        _ => {
            let days: Vec<_> = (1..=10)
                .map(|d| {
                    json!({
                        "date": format!("2024-05-{:02}", d),
                        "closing_price": format!("{}.5", 3000 + d),
                        "market_cap": null
                    })
                })
                .collect();
            axum::Json(json!({
                "chart_data": days,
                "available_supply": "120233456.789"
            }))
            .into_response()
        }
    }
}
