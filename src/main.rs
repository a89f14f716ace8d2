use anyhow::Result;
use std::sync::Arc;

use senryu::environment::{build_llm_client, Config};
use senryu::logging::configure_logging;
use senryu::web::{serve, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    configure_logging();

    let config = Config::from_env()?;
    let llm_client = build_llm_client()?;
    let http = reqwest::Client::builder().gzip(true).build()?;

    let state = Arc::new(AppState {
        config,
        llm_client,
        http,
    });

    serve(state).await
}
