use landing::configuration::Settings;
use landing::startup::Application;
use landing::telemetry::config_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::get_configuration()?;

    config_tracing(&settings.application);

    let app = Application::build(settings).await?;
    app.run_until_stopped().await?;
    Ok(())
}
