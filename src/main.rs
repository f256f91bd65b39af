use newsletter::configuration::get_configuration;
use newsletter::startup::Application;
use newsletter::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("newsletter".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    // Panic if we can't read configuration
    let configuration = get_configuration().expect("Failed to read configuration.");
    // Backend selection happens inside `build`, before the server accepts its first request.
    let application = Application::build(configuration).await?;
    tracing::info!(port = application.port(), "Newsletter service listening");
    application.run_until_stopped().await?;
    Ok(())
}
