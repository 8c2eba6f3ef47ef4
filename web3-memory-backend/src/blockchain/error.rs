use std::fmt;

/// Failure talking to a block explorer
#[derive(Debug)]
pub enum BlockchainError {
    /// Transport failure, timeout, or undecodable body
    Request(reqwest::Error),
    /// Explorer answered with a non-success status
    Status { provider: String, status: u16 },
    /// No configured provider matches the requested chain
    UnsupportedChain(String),
}

impl BlockchainError {
    pub fn is_unsupported_chain(&self) -> bool {
        matches!(self, BlockchainError::UnsupportedChain(_))
    }
}

impl fmt::Display for BlockchainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockchainError::Request(e) if e.is_timeout() => write!(f, "request timed out: {}", e),
            BlockchainError::Request(e) => write!(f, "request failed: {}", e),
            BlockchainError::Status { provider, status } => {
                write!(f, "{} returned HTTP {}", provider, status)
            }
            BlockchainError::UnsupportedChain(chain) => write!(f, "Chain not supported: {}", chain),
        }
    }
}

impl std::error::Error for BlockchainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BlockchainError::Request(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for BlockchainError {
    fn from(e: reqwest::Error) -> Self {
        BlockchainError::Request(e)
    }
}
