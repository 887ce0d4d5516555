pub mod client;
pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use commands::resources::{self, ReadOnlyCommands, Resource, ResourceCommands, UserCommands};

#[derive(Parser)]
#[command(name = "sirius")]
#[command(about = "Sirius CLI - operator dashboard for the Sirius administrative portal API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Target server management")]
    Server {
        #[command(subcommand)]
        cmd: commands::server::ServerCommands,
    },

    #[command(about = "Login, logout and session status")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Record counts visible to the current user")]
    Dashboard,

    #[command(about = "User accounts")]
    Users {
        #[command(subcommand)]
        cmd: UserCommands,
    },

    #[command(about = "Applications and their servers")]
    Apps {
        #[command(subcommand)]
        cmd: ResourceCommands,
    },

    #[command(about = "External service links")]
    Links {
        #[command(subcommand)]
        cmd: ResourceCommands,
    },

    #[command(about = "Departments")]
    Departments {
        #[command(subcommand)]
        cmd: ResourceCommands,
    },

    #[command(about = "Access profiles")]
    Profiles {
        #[command(subcommand)]
        cmd: ResourceCommands,
    },

    #[command(about = "Servers (read-only)")]
    Servers {
        #[command(subcommand)]
        cmd: ReadOnlyCommands,
    },

    #[command(about = "General departments (read-only)")]
    Deps {
        #[command(subcommand)]
        cmd: ReadOnlyCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Server { cmd } => commands::server::handle(cmd, output_format).await,
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format).await,
        Commands::Dashboard => commands::dashboard::handle(output_format).await,
        Commands::Users { cmd } => resources::handle_users(cmd, output_format).await,
        Commands::Apps { cmd } => resources::handle(&Resource::APPLICATIONS, cmd, output_format).await,
        Commands::Links { cmd } => resources::handle(&Resource::LINKS, cmd, output_format).await,
        Commands::Departments { cmd } => {
            resources::handle(&Resource::DEPARTMENTS, cmd, output_format).await
        }
        Commands::Profiles { cmd } => resources::handle(&Resource::PROFILES, cmd, output_format).await,
        Commands::Servers { cmd } => {
            resources::handle_read_only(&Resource::SERVERS, cmd, output_format).await
        }
        Commands::Deps { cmd } => {
            resources::handle_read_only(&Resource::GENERAL_DEPARTMENTS, cmd, output_format).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_commands() {
        let cli = Cli::try_parse_from(["sirius", "--json", "apps", "get", "12"]).unwrap();
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        assert!(matches!(
            cli.command,
            Commands::Apps { cmd: ResourceCommands::Get { id: 12 } }
        ));
    }

    #[test]
    fn read_only_resources_have_no_writes() {
        assert!(Cli::try_parse_from(["sirius", "servers", "delete", "1"]).is_err());
        assert!(Cli::try_parse_from(["sirius", "deps", "list"]).is_ok());
    }

    #[test]
    fn dashboard_takes_no_arguments() {
        let cli = Cli::try_parse_from(["sirius", "dashboard"]).unwrap();
        assert!(matches!(cli.command, Commands::Dashboard));
        assert!(Cli::try_parse_from(["sirius", "dashboard", "extra"]).is_err());
    }

    #[test]
    fn users_support_password_changes() {
        let cli = Cli::try_parse_from(["sirius", "users", "passwd", "7", "--password", "s3cret"]).unwrap();
        match cli.command {
            Commands::Users { cmd: UserCommands::Passwd { id, password } } => {
                assert_eq!(id, 7);
                assert_eq!(password.as_deref(), Some("s3cret"));
            }
            _ => panic!("expected users passwd"),
        }
    }
}
