use clap::Parser;
use sirius_api::cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = sirius_api::cli::run(cli).await {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e}"),
        }
        if let Some(failure) = e.downcast_ref::<sirius_api::cli::client::ApiFailure>() {
            for (field, message) in &failure.field_errors {
                eprintln!("  {}: {}", field, message);
            }
        }
        std::process::exit(1);
    }

    Ok(())
}
