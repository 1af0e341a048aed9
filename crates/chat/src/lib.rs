pub mod client;
pub mod config;
pub mod controller;
pub mod session;
pub mod transcript;
pub mod ui;

use once_cell::sync::Lazy;
use tokio::runtime::Runtime;

/// Shared Tokio runtime. The UI loop is synchronous; requests are spawned
/// onto this runtime and their outcomes come back over a channel.
pub static RUNTIME: Lazy<Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build Tokio runtime")
});
