use std::sync::Arc;

use anyhow::Result;
use log::info;

use wello_engine::agents::AgentGraph;
use wello_engine::api::{self, AppState};
use wello_engine::config::Settings;
use wello_engine::llm::Generator;
use wello_engine::memory::Db;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::from_env()?;
    info!("Model: {} via {}", settings.model, settings.api_url);
    info!("Database: {}", settings.database_path.display());

    let db = Db::open(&settings.database_path)?;
    let graph = Arc::new(AgentGraph::new(Generator::new(&settings)));

    let state = AppState {
        db,
        graph,
        input_max_chars: settings.input_max_chars,
    };

    api::start_server(&settings.bind_addr, state).await
}
