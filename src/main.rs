use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use apikit::{metrics, ApiClient, ClientConfig, Params};

/// Smoke tool: issue one course listing call with `key=value` arguments
/// from the command line and print the payload.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,apikit=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("apikit v{}", env!("CARGO_PKG_VERSION"));

    metrics::init_metrics();

    let config = ClientConfig::from_env().context("Failed to load configuration")?;
    let client = ApiClient::new(config).context("Failed to build API client")?;

    let mut params = Params::new();
    for arg in std::env::args().skip(1) {
        let (key, value) = arg
            .split_once('=')
            .with_context(|| format!("argument `{arg}` is not key=value"))?;
        params = params.set(key, value);
    }

    match client.list_courses(&params).await {
        Ok(payload) => {
            println!("{payload}");
            Ok(())
        }
        Err(error) => {
            match error.code() {
                Some(code) => eprintln!("server failure {code}: {error}"),
                None => eprintln!("{error}"),
            }
            std::process::exit(1);
        }
    }
}
