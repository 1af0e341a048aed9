use anyhow::Result;
use log::warn;

use wello_chat::client::ApiClient;
use wello_chat::config::Config;
use wello_chat::controller::{Controller, APOLOGY};
use wello_chat::session::SessionStore;
use wello_chat::{ui, RUNTIME};
use wello_shared::ChatRequest;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Load config
    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return Err(e);
        }
    };

    let args: Vec<String> = std::env::args().collect();

    // Handle commands, defaulting to chat when there are no args
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("chat");

    match command {
        "chat" => {
            let client = ApiClient::new(config.server_url.clone());
            let thread_id = SessionStore::open().get_or_create();
            ui::run(client, Controller::new(thread_id))?;
        }
        "config" => {
            if args.len() < 3 {
                println!("Current config:");
                println!("  Server URL: {}", config.server_url);
            } else if args[2] == "set" && args.len() >= 5 && args[3] == "server" {
                config.server_url = args[4].clone();
                config.save()?;
                println!("Server URL updated to: {}", config.server_url);
            } else {
                print_usage();
            }
        }
        message => {
            // Treat any other argument as a message
            if message.trim().is_empty() {
                return Ok(());
            }
            let client = ApiClient::new(config.server_url.clone());
            let thread_id = SessionStore::open().get_or_create();
            single_message(
                client,
                ChatRequest {
                    message: message.trim().to_string(),
                    thread_id,
                },
            );
        }
    }

    Ok(())
}

fn single_message(client: ApiClient, request: ChatRequest) {
    match RUNTIME.block_on(client.invoke(&request)) {
        Ok(reply) => println!("{}", reply.response),
        Err(e) => {
            warn!("Chat request failed: {}", e);
            eprintln!("{}", APOLOGY);
        }
    }
}

fn print_usage() {
    println!("Wello - Terminal chat client");
    println!("\nUsage:");
    println!("  wello-chat                    Start interactive chat");
    println!("  wello-chat \"your message\"     Send a single message");
    println!("  wello-chat config             Show current configuration");
    println!("  wello-chat config set server URL   Set the engine URL");
}
