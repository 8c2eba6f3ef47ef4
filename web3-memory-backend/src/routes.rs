//! Axum route handlers for the bot's RPC API.

use crate::blockchain::BlockchainService;
use crate::channels::{IncomingMessage, MessageDispatcher};
use crate::db::Database;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Instant;
use web3_memory_types::*;

pub struct AppState {
    pub db: Arc<Database>,
    pub dispatcher: Arc<MessageDispatcher>,
    pub blockchain: Arc<BlockchainService>,
    pub start_time: Instant,
    pub telegram_enabled: bool,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = tower_http::cors::CorsLayer::permissive();

    Router::new()
        .route("/", get(health))
        .route("/rpc/chat", post(chat))
        .route("/rpc/memories/recall", post(recall))
        .route("/rpc/tokens/search", post(search_tokens))
        .route("/rpc/tokens/details", post(token_details))
        .route("/rpc/chart", get(chart))
        .route("/rpc/status", get(status))
        .with_state(state)
        .layer(cors)
}

// GET /
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "Web3 Memory Bot is running!" }))
}

// POST /rpc/chat
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> (StatusCode, Json<RpcResponse<ChatReply>>) {
    let incoming = IncomingMessage::new(req.user_id, req.text);
    match state.dispatcher.dispatch(incoming).await {
        None => (
            StatusCode::BAD_REQUEST,
            Json(RpcResponse::err("user_id and text are required")),
        ),
        Some(result) => match result.error {
            None => (
                StatusCode::OK,
                Json(RpcResponse::ok(ChatReply {
                    response: result.response,
                })),
            ),
            Some(error) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RpcResponse {
                    success: false,
                    data: Some(ChatReply {
                        response: result.response,
                    }),
                    error: Some(error),
                }),
            ),
        },
    }
}

// POST /rpc/memories/recall
pub async fn recall(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RecallRequest>,
) -> (StatusCode, Json<RpcResponse<Vec<MemoryRecord>>>) {
    if req.user_id.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, Json(RpcResponse::err("user_id is required")));
    }
    match state
        .db
        .recall_memories(&req.user_id, req.query.as_deref(), req.category.as_deref())
    {
        Ok(memories) => (StatusCode::OK, Json(RpcResponse::ok(memories))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(RpcResponse::err(e.to_string())),
        ),
    }
}

// POST /rpc/tokens/search
pub async fn search_tokens(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TokenSearchRequest>,
) -> (StatusCode, Json<RpcResponse<Vec<TokenSearchGroup>>>) {
    if req.symbol.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, Json(RpcResponse::err("symbol is required")));
    }
    let groups = state
        .blockchain
        .search_token(req.symbol.trim(), req.chain.as_deref())
        .await;
    (StatusCode::OK, Json(RpcResponse::ok(groups)))
}

// POST /rpc/tokens/details
pub async fn token_details(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TokenDetailsRequest>,
) -> (StatusCode, Json<RpcResponse<TokenDetails>>) {
    match state.blockchain.get_token_details(&req.address, &req.chain).await {
        Ok(details) => (StatusCode::OK, Json(RpcResponse::ok(details))),
        Err(e) if e.is_unsupported_chain() => {
            (StatusCode::BAD_REQUEST, Json(RpcResponse::err(e.to_string())))
        }
        Err(e) => {
            log::warn!("[HTTP] Token details for {} failed: {}", req.address, e);
            (StatusCode::BAD_GATEWAY, Json(RpcResponse::err(e.to_string())))
        }
    }
}

// GET /rpc/chart?chain=
pub async fn chart(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChartQuery>,
) -> (StatusCode, Json<RpcResponse<MarketChart>>) {
    let chain = query
        .chain
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or("ethereum");

    match state.blockchain.get_market_chart(chain).await {
        Ok(chart) => (StatusCode::OK, Json(RpcResponse::ok(chart))),
        Err(e) => {
            log::warn!("[HTTP] Chart for {} failed: {}", chain, e);
            (StatusCode::BAD_GATEWAY, Json(RpcResponse::err(e.to_string())))
        }
    }
}

// GET /rpc/status
pub async fn status(State(state): State<Arc<AppState>>) -> (StatusCode, Json<RpcResponse<ServiceStatus>>) {
    (
        StatusCode::OK,
        Json(RpcResponse::ok(ServiceStatus {
            running: true,
            uptime_secs: state.start_time.elapsed().as_secs(),
            providers: state
                .blockchain
                .providers()
                .iter()
                .map(|p| p.name.clone())
                .collect(),
            telegram_enabled: state.telegram_enabled,
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AiClient, IntentClassifier, MockAiClient};
    use crate::test_utils::{StubExplorer, stub_providers};

    struct Server {
        base: String,
        client: reqwest::Client,
        ai: MockAiClient,
        db: Arc<Database>,
        _explorer: StubExplorer,
    }

    async fn start(modes: &[(&str, &str)]) -> Server {
        let explorer = StubExplorer::start().await;
        let db = Arc::new(Database::new(":memory:").unwrap());
        let ai = MockAiClient::new();
        let blockchain = Arc::new(BlockchainService::with_client(
            reqwest::Client::new(),
            stub_providers(&explorer, modes),
        ));
        let dispatcher = Arc::new(MessageDispatcher::new(
            db.clone(),
            Arc::new(IntentClassifier::new(AiClient::Mock(ai.clone()))),
            blockchain.clone(),
        ));
        let state = Arc::new(AppState {
            db: db.clone(),
            dispatcher,
            blockchain,
            start_time: Instant::now(),
            telegram_enabled: false,
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_router(state)).await.unwrap();
        });

        Server {
            base: format!("http://{}", addr),
            client: reqwest::Client::new(),
            ai,
            db,
            _explorer: explorer,
        }
    }

    impl Server {
        async fn post(&self, path: &str, body: Value) -> (u16, Value) {
            let resp = self
                .client
                .post(format!("{}{}", self.base, path))
                .json(&body)
                .send()
                .await
                .unwrap();
            (resp.status().as_u16(), resp.json().await.unwrap())
        }

        async fn get(&self, path: &str) -> (u16, Value) {
            let resp = self
                .client
                .get(format!("{}{}", self.base, path))
                .send()
                .await
                .unwrap();
            (resp.status().as_u16(), resp.json().await.unwrap())
        }
    }

    #[tokio::test]
    async fn test_health() {
        let s = start(&[("Ethereum", "ok")]).await;
        let (status, body) = s.get("/").await;
        assert_eq!(status, 200);
        assert_eq!(body, json!({"status": "Web3 Memory Bot is running!"}));
    }

    #[tokio::test]
    async fn test_chat_roundtrip_records_history() {
        let s = start(&[("Ethereum", "ok")]).await;
        s.ai.push_response(r#"{"action":"chat","response":"gm fren"}"#);

        let (status, body) = s.post("/rpc/chat", json!({"user_id": "web-1", "text": "gm"})).await;
        assert_eq!(status, 200);
        assert_eq!(body, json!({"success": true, "data": {"response": "gm fren"}}));
        assert_eq!(s.db.get_chat_history("web-1", 10).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_chat_blank_text_is_bad_request() {
        let s = start(&[("Ethereum", "ok")]).await;
        let (status, body) = s.post("/rpc/chat", json!({"user_id": "web-1", "text": "  "})).await;
        assert_eq!(status, 400);
        assert_eq!(body["success"], false);
        assert_eq!(s.ai.call_count(), 0);
    }

    #[tokio::test]
    async fn test_recall_endpoint() {
        let s = start(&[("Ethereum", "ok")]).await;
        s.db.store_memory("web-1", "restaurants", "Ichiran ramen", &json!({})).unwrap();
        s.db.store_memory("web-1", "travel", "Kyoto", &json!({})).unwrap();

        let (status, body) = s
            .post("/rpc/memories/recall", json!({"user_id": "web-1", "category": "travel"}))
            .await;
        assert_eq!(status, 200);
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["content"], "Kyoto");
    }

    #[tokio::test]
    async fn test_token_endpoints() {
        let s = start(&[("Ethereum", "ok"), ("Rootstock", "broken")]).await;

        let (status, body) = s.post("/rpc/tokens/search", json!({"symbol": "USDT"})).await;
        assert_eq!(status, 200);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["chain"], "Ethereum");

        let (status, body) = s
            .post("/rpc/tokens/details", json!({"address": "0xabc", "chain": "ethereum"}))
            .await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["chain"], "Ethereum");
        assert_eq!(body["data"]["symbol"], "USDT");

        let (status, body) = s
            .post("/rpc/tokens/details", json!({"address": "0xabc", "chain": "solana"}))
            .await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "Chain not supported: solana");

        let (status, _) = s
            .post("/rpc/tokens/details", json!({"address": "0xabc", "chain": "root"}))
            .await;
        assert_eq!(status, 502);
    }

    #[tokio::test]
    async fn test_chart_and_status() {
        let s = start(&[("Ethereum", "ok"), ("Flow EVM", "ok")]).await;

        let (status, body) = s.get("/rpc/chart?chain=flow").await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["chain"], "Flow EVM");
        assert_eq!(body["data"]["chart_data"].as_array().unwrap().len(), 7);

        let (_, body) = s.get("/rpc/chart").await;
        assert_eq!(body["data"]["chain"], "Ethereum");

        let (status, body) = s.get("/rpc/status").await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["providers"], json!(["Ethereum", "Flow EVM"]));
        assert_eq!(body["data"]["telegram_enabled"], false);
    }
}
