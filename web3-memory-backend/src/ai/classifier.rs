//! Intent classification and recall replies.
//!
//! The model is asked for a single JSON object:
//!
//! ```json
//! {"action": "store|recall|blockchain|chat", "response": "...", "data": {...}}
//! ```
//!
//! Output that can't be read as that shape degrades to a chat reply with a
//! fixed apology; nothing here returns an error to the caller.

use crate::ai::{AiClient, Message};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::str::FromStr;
use strum::EnumString;
use web3_memory_types::MemoryRecord;

pub const FALLBACK_RESPONSE: &str = "I had trouble processing that. Can you try again?";
pub const NO_MEMORIES_RESPONSE: &str = "I don't have any memories matching that query yet.";
pub const RECALL_EMPTY_REPLY: &str = "Here's what I found.";
pub const DEFAULT_CATEGORY: &str = "general";

/// History turns embedded in the classifier prompt
pub const PROMPT_HISTORY_TURNS: usize = 5;

static JSON_BLOCK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json)?\s*\n?([\s\S]*?)\n?```").expect("valid regex"));

/// What the user wants done with a message
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Save a memory. Missing category/content are already defaulted;
    /// metadata is the model's whole data bag.
    Store {
        category: String,
        content: String,
        metadata: Value,
    },
    Recall {
        query: Option<String>,
        category: Option<String>,
    },
    /// Token lookup. Without a token there is nothing to search.
    Blockchain {
        token: Option<String>,
        chain: Option<String>,
    },
    Chat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub intent: Intent,
    /// The model's own reply text
    pub response: String,
}

impl Classification {
    pub fn fallback() -> Self {
        Self {
            intent: Intent::Chat,
            response: FALLBACK_RESPONSE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
enum ActionTag {
    Store,
    Recall,
    Blockchain,
    Chat,
}

#[derive(Debug, Deserialize)]
struct RawDecision {
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

pub struct IntentClassifier {
    client: AiClient,
}

impl IntentClassifier {
    pub fn new(client: AiClient) -> Self {
        Self { client }
    }

    /// Classify `message` given the caller's formatted history (oldest first).
    pub async fn classify(&self, message: &str, user_id: &str, history: &[String]) -> Classification {
        let system_prompt = build_system_prompt(message, history);
        log::debug!("[CLASSIFIER] Prompt for {}:\n{}", user_id, system_prompt);

        let messages = vec![Message::system(system_prompt), Message::user(message)];

        let content = match self.client.generate_text(messages).await {
            Ok(content) => content,
            Err(e) => {
                log::error!("[CLASSIFIER] Model call failed for {}: {}", user_id, e);
                return Classification::fallback();
            }
        };

        match parse_decision(&content, message) {
            Some(classification) => {
                log::info!(
                    "[CLASSIFIER] {} -> {}",
                    user_id,
                    intent_label(&classification.intent)
                );
                classification
            }
            None => {
                log::warn!(
                    "[CLASSIFIER] Unusable model output for {}: {}",
                    user_id,
                    truncate(&content, 200)
                );
                Classification::fallback()
            }
        }
    }

    /// Conversational summary of recalled memories, or a plain list if the model is unavailable
    pub async fn compose_recall_reply(&self, memories: &[MemoryRecord]) -> String {
        if memories.is_empty() {
            return NO_MEMORIES_RESPONSE.to_string();
        }

        let listing = memories
            .iter()
            .map(|m| format!("{}: {}", m.category, m.content))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!(
            "Generate a natural response based on these user memories:\n{}\n\nMake it conversational and helpful.",
            listing
        );

        match self.client.generate_text(vec![Message::user(prompt)]).await {
            Ok(text) if text.trim().is_empty() => RECALL_EMPTY_REPLY.to_string(),
            Ok(text) => text,
            Err(e) => {
                log::warn!("[CLASSIFIER] Recall reply failed, listing memories: {}", e);
                bullet_list(memories)
            }
        }
    }
}

fn bullet_list(memories: &[MemoryRecord]) -> String {
    let bullets = memories
        .iter()
        .map(|m| format!("• {}", m.content))
        .collect::<Vec<_>>()
        .join("\n");
    format!("Here's what I found in your memories:\n{}", bullets)
}

pub fn build_system_prompt(message: &str, history: &[String]) -> String {
    let recent = &history[history.len().saturating_sub(PROMPT_HISTORY_TURNS)..];

    format!(
        r#"You are a Web3 memory assistant. Analyze user messages and determine:
1. If they want to STORE information (restaurants, preferences, experiences)
2. If they want to RECALL stored information
3. If they want BLOCKCHAIN data (token prices, charts)
4. If it's just casual CHAT

For STORE: Extract category, content, and metadata
For RECALL: Identify what they're looking for and suggest visualization
For BLOCKCHAIN: Extract token symbols and chains
For CHAT: Respond naturally

Recent chat: {history}

Current message: "{message}"

Respond with JSON:
{{
  "action": "store|recall|blockchain|chat",
  "response": "your response text",
  "data": {{
    "category": "restaurants|preferences|experiences|tokens",
    "content": "extracted content",
    "query": "search query for recall",
    "token": "token symbol",
    "chain": "ethereum|flow|rootstock"
  }}
}}"#,
        history = recent.join("\n"),
        message = message,
    )
}

/// Read the model output into a classification.
///
/// Accepts a bare JSON object, one inside a fenced code block, or the first
/// balanced `{...}` in surrounding prose. `None` when no object with both an
/// `action` and a `response` can be found.
pub fn parse_decision(content: &str, message: &str) -> Option<Classification> {
    let raw = extract_raw_decision(content.trim())?;
    let action = raw.action?;
    let response = raw.response?;

    let data = match raw.data {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };

    let intent = match ActionTag::from_str(action.trim()) {
        Ok(ActionTag::Store) => Intent::Store {
            category: data_field(&data, "category").unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            content: data_field(&data, "content").unwrap_or_else(|| message.to_string()),
            metadata: Value::Object(data),
        },
        Ok(ActionTag::Recall) => Intent::Recall {
            query: data_field(&data, "query"),
            category: data_field(&data, "category"),
        },
        Ok(ActionTag::Blockchain) => Intent::Blockchain {
            token: data_field(&data, "token"),
            chain: data_field(&data, "chain"),
        },
        Ok(ActionTag::Chat) => Intent::Chat,
        Err(_) => {
            log::debug!("[CLASSIFIER] Unknown action '{}', treating as chat", action);
            Intent::Chat
        }
    };

    Some(Classification { intent, response })
}

fn extract_raw_decision(content: &str) -> Option<RawDecision> {
    if let Ok(raw) = serde_json::from_str::<RawDecision>(content) {
        return Some(raw);
    }

    if let Some(block) = JSON_BLOCK_PATTERN.captures(content).and_then(|c| c.get(1)) {
        if let Ok(raw) = serde_json::from_str::<RawDecision>(block.as_str().trim()) {
            return Some(raw);
        }
    }

    let start = content.find('{')?;
    let object = balanced_object(&content[start..])?;
    serde_json::from_str::<RawDecision>(object).ok()
}

/// Prefix of `s` (which starts with `{`) up to its matching `}`; braces inside strings don't count
fn balanced_object(s: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Non-blank string field from the data bag. Numbers are accepted as text.
fn data_field(data: &Map<String, Value>, key: &str) -> Option<String> {
    match data.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn intent_label(intent: &Intent) -> &'static str {
    match intent {
        Intent::Store { .. } => "store",
        Intent::Recall { .. } => "recall",
        Intent::Blockchain { .. } => "blockchain",
        Intent::Chat => "chat",
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
