use crate::configuration::ApplicationSettings;
use tracing::subscriber::set_global_default;
use tracing::Subscriber;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

pub fn get_tracing_subscriber<Sink>(
    name: &str,
    default_log_level: &str,
    sink: Sink,
) -> impl Subscriber + Send + Sync
where
    // for<'a> is HRTB (aka Higher-Ranked Trait Bound)
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    // RUST_LOG wins over the configured level when it is set
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_log_level));

    let formatting_layer = BunyanFormattingLayer::new(name.into(), sink);

    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
}

pub fn init_tracing_subscriber(subscriber: impl Subscriber + Send + Sync) {
    // actix-web and reqwest still emit through the `log` crate
    // Redirect all log events that use 'log crate' to Subscriber
    LogTracer::init().expect("Failed to init LogTracer");
    set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

pub fn config_tracing(app_config: &ApplicationSettings) {
    init_tracing_subscriber(get_tracing_subscriber(
        &app_config.name,
        &app_config.default_log_level,
        std::io::stdout,
    ));
}
