use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardSource {
    Generated,
    Scanned,
}

/// One line of card text shown in the list, either generated here or scanned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardEntry {
    pub id: Uuid,
    pub text: String,
    pub source: CardSource,
    pub created_at: DateTime<Utc>,
}

impl CardEntry {
    pub fn new(text: impl Into<String>, source: CardSource) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            source,
            created_at: Utc::now(),
        }
    }

    pub fn generated(text: impl Into<String>) -> Self {
        Self::new(text, CardSource::Generated)
    }

    pub fn scanned(text: impl Into<String>) -> Self {
        Self::new(text, CardSource::Scanned)
    }
}
