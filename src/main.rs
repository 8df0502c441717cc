use taskdeck::{Config, Readiness, Server, app};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), taskdeck::Error> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("taskdeck=info")),
        )
        .init();

    let config = Config::from_env()?;
    info!(
        api = %config.api_base_url,
        env = %config.environment,
        "starting taskdeck"
    );

    let readiness = Readiness::new();
    let router = app::build(&config, readiness.clone())?;

    Server::bind(config.addr)
        .readiness(readiness)
        .shutdown_grace(config.shutdown_grace)
        .serve(router)
        .await
}
