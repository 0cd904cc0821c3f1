use std::net::SocketAddr;

use clap::Parser;
use companion::Pipeline;
use tracing::info;
use vera::{AppState, Config, app, init_logging, load_slots};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::parse();
    init_logging();

    let slots = load_slots(&config).await?;
    let pipeline = Pipeline::new(slots).with_generation_timeout(config.generation_timeout());
    let app = app(AppState::new(pipeline));

    let addr: SocketAddr = config.addr.parse()?;
    info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
