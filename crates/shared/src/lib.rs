pub mod role;
pub mod thread;
pub mod wire;

pub use role::Role;
pub use thread::{ThreadId, THREAD_ID_PREFIX};
pub use wire::{ChatRequest, ChatResponse};
