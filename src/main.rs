use clap::Parser;
use tracing_subscriber::EnvFilter;


mod cli;


use cli::{Cli, execute_command};




#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    execute_command(&cli).await
}
