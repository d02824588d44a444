//! Example to run the bracket server standalone
//!
//! Run with: cargo run -p bracket-server --example run_server

use bracket_server::{run_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = ServerConfig {
        port: 8003,
        data_file: Some("brackets.json".into()),
        ..Default::default()
    };

    println!("Starting bracket server on port {}", config.port);
    println!("Open http://localhost:{}/api/tournaments", config.port);

    run_server(config).await
}
