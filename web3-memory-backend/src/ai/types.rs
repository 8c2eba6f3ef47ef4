use std::fmt;

/// AI API error with status code information
#[derive(Debug, Clone)]
pub struct AiError {
    pub message: String,
    /// HTTP status code if available
    pub status_code: Option<u16>,
}

impl AiError {
    pub fn new(message: impl Into<String>) -> Self {
        AiError {
            message: message.into(),
            status_code: None,
        }
    }

    pub fn with_status(message: impl Into<String>, status_code: u16) -> Self {
        AiError {
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    /// Statuses worth another attempt (rate limit, gateway trouble)
    pub fn is_retryable(&self) -> bool {
        matches!(self.status_code, Some(429 | 502 | 503 | 504))
    }
}

impl fmt::Display for AiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = self.status_code {
            write!(f, "[HTTP {}] {}", code, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for AiError {}

impl From<String> for AiError {
    fn from(s: String) -> Self {
        AiError::new(s)
    }
}

impl From<&str> for AiError {
    fn from(s: &str) -> Self {
        AiError::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_status() {
        assert_eq!(AiError::with_status("rate limited", 429).to_string(), "[HTTP 429] rate limited");
        assert_eq!(AiError::new("offline").to_string(), "offline");
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(AiError::with_status("", 429).is_retryable());
        assert!(AiError::with_status("", 503).is_retryable());
        assert!(!AiError::with_status("", 401).is_retryable());
        assert!(!AiError::new("no status").is_retryable());
    }
}
