use crate::blockchain::BlockchainError;
use std::fmt;

/// A text message from any transport, reduced to what the dispatcher needs
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Opaque per-user key (Telegram numeric id, RPC caller id)
    pub user_id: String,
    /// Display name for logs only
    pub user_name: Option<String>,
    pub text: String,
}

impl IncomingMessage {
    pub fn new(user_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: None,
            text: text.into(),
        }
    }

    pub fn with_user_name(mut self, name: impl Into<String>) -> Self {
        self.user_name = Some(name.into());
        self
    }
}

/// Reply to deliver, plus the failure behind it when the turn was aborted
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchResult {
    pub response: String,
    pub error: Option<String>,
}

impl DispatchResult {
    pub fn success(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            error: None,
        }
    }

    pub fn failure(response: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Failure that aborts a whole turn
#[derive(Debug)]
pub enum BotError {
    Storage(rusqlite::Error),
    Blockchain(BlockchainError),
}

impl fmt::Display for BotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotError::Storage(e) => write!(f, "storage error: {}", e),
            BotError::Blockchain(e) => write!(f, "blockchain error: {}", e),
        }
    }
}

impl std::error::Error for BotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BotError::Storage(e) => Some(e),
            BotError::Blockchain(e) => Some(e),
        }
    }
}

impl From<rusqlite::Error> for BotError {
    fn from(e: rusqlite::Error) -> Self {
        BotError::Storage(e)
    }
}

impl From<BlockchainError> for BotError {
    fn from(e: BlockchainError) -> Self {
        BotError::Blockchain(e)
    }
}
