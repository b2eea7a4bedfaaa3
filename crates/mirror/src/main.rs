use std::time::Duration;

use realtime_mirror::{CloseReason, RealtimeMirror, load_config, load_default_config};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("realtime_mirror=info".parse()?))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => load_config(path)?,
        None => load_default_config()?,
    }
    .with_env_overrides();
    config.validate()?;

    let mirror = RealtimeMirror::connect(&config).await?;

    let mut ticks = tokio::time::interval(Duration::from_secs(1));
    let reason = loop {
        tokio::select! {
            _ = ticks.tick() => match mirror.get_ticker() {
                Ok(ticker) => tracing::info!(
                    "{} last={} bid={} ask={} mid={}",
                    mirror.symbol(),
                    ticker.last,
                    ticker.buy,
                    ticker.sell,
                    ticker.mid
                ),
                Err(e) => tracing::warn!("Ticker unavailable: {}", e),
            },
            reason = mirror.closed() => break reason,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                mirror.exit().await;
                break mirror.closed().await;
            }
        }
    };

    if reason != CloseReason::Exited {
        anyhow::bail!("connection closed: {}", reason);
    }
    Ok(())
}
