pub mod agents;
pub mod api;
pub mod config;
pub mod llm;
pub mod memory;
