//! Conversation store
//!
//! Persistence collaborator for answered questions. The pipeline records an
//! exchange after the response is produced; a store failure is logged and
//! never surfaced to the caller.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::RwLock;

/// One answered question, keyed by caller and conversation
#[derive(Debug, Clone)]
pub struct ConversationRecord {
    pub user_id: String,
    pub conversation_id: String,
    pub repo_path: String,
    pub question: String,
    pub answer: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum ConversationStoreError {
    #[error("conversation store unavailable: {0}")]
    Unavailable(String),
}

/// Post-hoc persistence for answered questions
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn record(&self, record: ConversationRecord) -> Result<(), ConversationStoreError>;
}

/// Process-lifetime store; a durable backend can replace it behind the trait
#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    records: RwLock<Vec<ConversationRecord>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn record(&self, record: ConversationRecord) -> Result<(), ConversationStoreError> {
        self.records.write().await.push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_are_appended() {
        let store = InMemoryConversationStore::new();
        assert!(store.is_empty().await);

        store
            .record(ConversationRecord {
                user_id: "user@example.com".to_string(),
                conversation_id: "conv_1_0001".to_string(),
                repo_path: "octocat/Hello-World".to_string(),
                question: "What license?".to_string(),
                answer: "MIT".to_string(),
                timestamp: Utc::now(),
            })
            .await
            .expect("record should succeed");

        assert_eq!(store.len().await, 1);
    }
}
