use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::config::{ping_server, ConfigStore, ServerInfo, ServerStatus};
use crate::cli::utils::{output_record, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Point the CLI at an API server (clears any session)")]
    Set {
        #[arg(help = "Server URL, e.g. http://localhost:3000")]
        url: String,
    },

    #[command(about = "Show the configured server")]
    Show,

    #[command(about = "Check server health from the API /health endpoint")]
    Health,
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = ConfigStore::open()?;

    match cmd {
        ServerCommands::Set { url } => {
            let server = ServerInfo::new(&url)?;
            config.save_server(&server)?;
            config.clear_session()?;
            output_success(
                &output_format,
                &format!("Server set to {}", server.url),
                Some(json!({ "url": server.url })),
            )
        }
        ServerCommands::Show => match config.load_server()? {
            Some(server) => output_record(&output_format, &serde_json::to_value(&server)?),
            None => anyhow::bail!("No server configured; run `sirius server set <url>`"),
        },
        ServerCommands::Health => {
            let mut server = config
                .load_server()?
                .ok_or_else(|| anyhow::anyhow!("No server configured; run `sirius server set <url>`"))?;

            let status = ping_server(&server).await;
            server.update_ping(status);
            config.save_server(&server)?;

            if status != ServerStatus::Up {
                anyhow::bail!("Server {} is down", server.url);
            }

            let health = ApiClient::anonymous(&config)?.get("/health").await?;
            output_record(&output_format, &health)
        }
    }
}
