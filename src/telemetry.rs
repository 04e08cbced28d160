use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Environment;

const DEFAULT_FILTER: &str = "handyhub=info,tower_http=info";

/// Installs the global tracing subscriber.
///
/// Production emits bunyan-style JSON lines; development uses the human
/// readable formatter. `RUST_LOG` overrides the default filter in both.
pub fn init_subscriber(environment: Environment) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    match environment {
        Environment::Production => {
            let formatting_layer = BunyanFormattingLayer::new("handyhub".into(), std::io::stdout);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(JsonStorageLayer)
                .with(formatting_layer)
                .init();
        }
        Environment::Development => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer())
                .init();
        }
    }
}
