/// Flowvault server entry point
///
/// Loads configuration from the environment and serves:
/// - Workflow management API at /workflows
/// - Health check at /healthz
use flowvault::{config::Config, server::start_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Fails fast when the encryption key is missing or malformed
    let config = Config::from_env()?;

    start_server(config).await
}
