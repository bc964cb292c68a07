//! Binary entrypoint for the SDKGen API server.
use sdkgen_api::{logging, run, ServiceConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::load()?;
    if let Err(e) = logging::init(config.log_format) {
        eprintln!("failed to install tracing subscriber: {}", e);
    }
    run(config).await
}
