use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix carried by every generated thread identifier.
pub const THREAD_ID_PREFIX: &str = "thread_";

/// Opaque identifier for one conversation thread.
///
/// Stays fixed for the lifetime of a chat session so the engine can key
/// conversation history on it. Uniqueness is random-derived, which is all
/// continuity needs.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(String);

impl ThreadId {
    /// Mint a fresh identifier: the fixed prefix plus a random suffix.
    pub fn generate() -> Self {
        Self(format!("{}{}", THREAD_ID_PREFIX, Uuid::new_v4().simple()))
    }

    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ThreadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
