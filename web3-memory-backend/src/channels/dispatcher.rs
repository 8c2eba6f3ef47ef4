use crate::ai::{Classification, Intent, IntentClassifier};
use crate::blockchain::{BlockchainService, format_chart_response, format_token_response};
use crate::channels::types::{BotError, DispatchResult, IncomingMessage};
use crate::db::Database;
use std::sync::Arc;
use web3_memory_types::MemoryRecord;

/// Turns of history handed to the classifier
const CONTEXT_TURNS: usize = 5;

const DEFAULT_CHART_CHAIN: &str = "ethereum";

pub const STORE_CONFIRMATION: &str = "✅ Stored in your memory! ";
pub const TURN_FAILURE_RESPONSE: &str =
    "Sorry, I encountered an error processing your message. Please try again!";
pub const CHART_FAILURE_RESPONSE: &str = "Failed to fetch chart data. Please try again.";
pub const MEMORIES_FAILURE_RESPONSE: &str = "Failed to fetch your memories. Please try again.";
pub const NO_STORED_MEMORIES_RESPONSE: &str =
    "You haven't stored any memories yet! Tell me something interesting.";

pub const WELCOME_MESSAGE: &str = "🤖 **Welcome to Web3 Memory Bot!**

I can help you:
💾 **Store memories** - Tell me about restaurants, preferences, experiences
🔍 **Recall information** - Ask me \"What restaurants did I like in Tokyo?\"
💰 **Get token data** - Search for token prices and charts
💬 **Chat naturally** - Just talk to me normally!

**Examples:**
• \"I loved the ramen at Ichiran in Tokyo\"
• \"What restaurants did I save?\"
• \"Show me USDT price\"
• \"Get Ethereum market chart\"

Try it out! 🚀";

/// Slash commands answered without the classifier
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Start,
    Memories,
    Chart(Option<String>),
}

/// Routes each message through classification and the matching action
pub struct MessageDispatcher {
    db: Arc<Database>,
    classifier: Arc<IntentClassifier>,
    blockchain: Arc<BlockchainService>,
}

impl MessageDispatcher {
    pub fn new(
        db: Arc<Database>,
        classifier: Arc<IntentClassifier>,
        blockchain: Arc<BlockchainService>,
    ) -> Self {
        Self {
            db,
            classifier,
            blockchain,
        }
    }

    /// Handle one message. `None` means there was nothing to answer
    /// (blank user id or text) and nothing was stored.
    /// The user id and text are used exactly as received.
    pub async fn dispatch(&self, message: IncomingMessage) -> Option<DispatchResult> {
        let user_id = message.user_id.as_str();
        let text = message.text.as_str();
        if user_id.trim().is_empty() || text.trim().is_empty() {
            log::debug!("[DISPATCH] Ignoring message without user id or text");
            return None;
        }

        log::info!(
            "[DISPATCH] Message from {} ({} chars)",
            message.user_name.as_deref().unwrap_or(user_id),
            text.chars().count()
        );

        if let Some(command) = parse_command(text) {
            return Some(self.handle_command(user_id, command).await);
        }

        let result = match self.process_turn(user_id, text).await {
            Ok(reply) => DispatchResult::success(reply),
            Err(e) => {
                log::error!("[DISPATCH] Turn failed for {}: {}", user_id, e);
                DispatchResult::failure(TURN_FAILURE_RESPONSE, e.to_string())
            }
        };
        Some(result)
    }

    async fn process_turn(&self, user_id: &str, text: &str) -> Result<String, BotError> {
        let history = self.classifier_context(user_id)?;
        let classification = self.classifier.classify(text, user_id, &history).await;
        let reply = self.resolve_reply(user_id, text, classification).await?;
        self.complete_turn(user_id, text, reply)
    }

    /// Recent turns, oldest first, as "User: ..\nBot: .." entries
    fn classifier_context(&self, user_id: &str) -> Result<Vec<String>, BotError> {
        let mut turns = self.db.get_chat_history(user_id, CONTEXT_TURNS)?;
        turns.reverse();
        Ok(turns
            .into_iter()
            .map(|t| format!("User: {}\nBot: {}", t.message, t.response))
            .collect())
    }

    async fn resolve_reply(
        &self,
        user_id: &str,
        text: &str,
        classification: Classification,
    ) -> Result<String, BotError> {
        let Classification { intent, response } = classification;

        match intent {
            Intent::Store {
                category,
                content,
                metadata,
            } => {
                let record = self.db.store_memory(user_id, &category, &content, &metadata)?;
                log::info!(
                    "[DISPATCH] Stored memory {} ({}) for {}",
                    record.id,
                    record.category,
                    user_id
                );
                Ok(format!("{}{}", STORE_CONFIRMATION, response))
            }
            Intent::Recall { query, category } => {
                let memories =
                    self.db
                        .recall_memories(user_id, query.as_deref(), category.as_deref())?;
                log::info!("[DISPATCH] Recalled {} memories for {}", memories.len(), user_id);
                Ok(self.classifier.compose_recall_reply(&memories).await)
            }
            Intent::Blockchain {
                token: Some(token),
                chain,
            } => {
                let groups = self.blockchain.search_token(&token, chain.as_deref()).await;
                Ok(format_token_response(&groups))
            }
            Intent::Blockchain { token: None, .. } => {
                log::debug!("[DISPATCH] Blockchain intent without a token: {}", text);
                Ok(response)
            }
            Intent::Chat => Ok(response),
        }
    }

    /// Every successful turn ends here: one history row, then the reply goes out
    fn complete_turn(&self, user_id: &str, text: &str, reply: String) -> Result<String, BotError> {
        self.db.store_chat_history(user_id, text, &reply)?;
        Ok(reply)
    }

    async fn handle_command(&self, user_id: &str, command: Command) -> DispatchResult {
        log::info!("[DISPATCH] Command {:?} from {}", command, user_id);

        match command {
            Command::Start => DispatchResult::success(WELCOME_MESSAGE),
            Command::Memories => match self.db.recall_memories(user_id, None, None) {
                Ok(memories) if memories.is_empty() => {
                    DispatchResult::success(NO_STORED_MEMORIES_RESPONSE)
                }
                Ok(memories) => DispatchResult::success(format_memory_list(&memories)),
                Err(e) => {
                    log::error!("[DISPATCH] Listing memories for {} failed: {}", user_id, e);
                    DispatchResult::failure(MEMORIES_FAILURE_RESPONSE, e.to_string())
                }
            },
            Command::Chart(chain) => {
                let chain = chain.as_deref().unwrap_or(DEFAULT_CHART_CHAIN);
                match self.chart_reply(chain).await {
                    Ok(reply) => DispatchResult::success(reply),
                    Err(e) => {
                        log::error!("[DISPATCH] Chart for '{}' failed: {}", chain, e);
                        DispatchResult::failure(CHART_FAILURE_RESPONSE, e.to_string())
                    }
                }
            }
        }
    }

    async fn chart_reply(&self, chain: &str) -> Result<String, BotError> {
        let chart = self.blockchain.get_market_chart(chain).await?;
        Ok(format_chart_response(&chart))
    }
}

/// Recognise `/start`, `/memories` and `/chart [chain]`, with or without a `@botname` suffix.
/// Other slash-prefixed text is treated as a normal message.
fn parse_command(text: &str) -> Option<Command> {
    if !text.trim_start().starts_with('/') {
        return None;
    }

    let mut parts = text.split_whitespace();
    let head = parts.next()?;
    let name = head.split('@').next().unwrap_or(head).to_lowercase();

    match name.as_str() {
        "/start" => Some(Command::Start),
        "/memories" => Some(Command::Memories),
        "/chart" => Some(Command::Chart(parts.next().map(str::to_string))),
        _ => None,
    }
}

pub fn format_memory_list(memories: &[MemoryRecord]) -> String {
    let mut response = String::from("🧠 **Your Recent Memories:**\n\n");
    for (index, memory) in memories.iter().enumerate() {
        response.push_str(&format!(
            "{}. **{}:** {}\n",
            index + 1,
            memory.category,
            memory.content
        ));
        response.push_str(&format!("   📅 {}\n\n", display_date(&memory.timestamp)));
    }
    response
}

fn display_date(timestamp: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.format("%-m/%-d/%Y").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("/start"), Some(Command::Start));
        assert_eq!(parse_command("/START@web3_memory_bot"), Some(Command::Start));
        assert_eq!(parse_command("/memories"), Some(Command::Memories));
        assert_eq!(parse_command("/chart"), Some(Command::Chart(None)));
        assert_eq!(
            parse_command("/chart flow extra"),
            Some(Command::Chart(Some("flow".to_string())))
        );
        assert_eq!(parse_command("  /memories\n"), Some(Command::Memories));
        assert_eq!(parse_command("/help"), None);
        assert_eq!(parse_command("show /chart"), None);
    }

    #[test]
    fn test_format_memory_list() {
        let memories = vec![MemoryRecord {
            id: 3,
            user_id: "u1".to_string(),
            category: "restaurants".to_string(),
            content: "Ichiran ramen".to_string(),
            metadata: json!({}),
            timestamp: "2024-03-07T10:00:00.000000Z".to_string(),
            schema_version: 1,
        }];
        assert_eq!(
            format_memory_list(&memories),
            "🧠 **Your Recent Memories:**\n\n1. **restaurants:** Ichiran ramen\n   📅 3/7/2024\n\n"
        );
    }

    #[test]
    fn test_display_date_keeps_unparseable_timestamps() {
        assert_eq!(display_date("yesterday"), "yesterday");
    }
}
