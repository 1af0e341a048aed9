use serde::{Deserialize, Serialize};

use crate::thread::ThreadId;

/// Body of `POST /chat/invoke`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub thread_id: ThreadId,
}

/// Successful reply body. The engine echoes the thread id back alongside
/// the answer; clients that only want the text can ignore it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<ThreadId>,
}
