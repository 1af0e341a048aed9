pub mod handlers;
pub mod routes;
pub mod server;

use std::sync::Arc;

use crate::agents::AgentGraph;
use crate::memory::Db;

pub use server::start_server;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub graph: Arc<AgentGraph>,
    pub input_max_chars: usize,
}
