pub mod chat_history;
pub mod memories;

pub use chat_history::DEFAULT_HISTORY_LIMIT;
pub use memories::RECALL_LIMIT;
