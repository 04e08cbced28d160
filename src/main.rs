use handyhub::{app, build_state, config::AppConfig, error::StartupError, telemetry};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    telemetry::init_subscriber(config.environment);

    let addr = format!("0.0.0.0:{}", config.port);
    let state = build_state(config).await?;

    let listener = TcpListener::bind(&addr).await?;
    info!("Server starting at http://{}", addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
