use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::config::ConfigStore;
use crate::cli::utils::{output_record, output_records, output_success, read_json_stdin, read_password};
use crate::cli::OutputFormat;

/// Where a resource lives on the API and which columns its table shows.
pub struct Resource {
    pub label: &'static str,
    pub path: &'static str,
    pub columns: &'static [&'static str],
}

impl Resource {
    pub const USERS: Resource = Resource {
        label: "User",
        path: "/api/users",
        columns: &["id", "username", "name", "email", "profile_name", "department_name"],
    };

    pub const APPLICATIONS: Resource = Resource {
        label: "Application",
        path: "/api/aplicacao",
        columns: &["id", "name", "department_name", "servers"],
    };

    pub const LINKS: Resource = Resource {
        label: "Link",
        path: "/api/link",
        columns: &["id", "name", "service", "url", "general_departments"],
    };

    pub const DEPARTMENTS: Resource = Resource {
        label: "Department",
        path: "/api/departamento",
        columns: &["id", "name"],
    };

    pub const PROFILES: Resource = Resource {
        label: "Profile",
        path: "/api/profiles",
        columns: &["id", "name"],
    };

    pub const SERVERS: Resource = Resource {
        label: "Server",
        path: "/api/servidor",
        columns: &["id", "name", "ip_address", "operating_system"],
    };

    pub const GENERAL_DEPARTMENTS: Resource = Resource {
        label: "General department",
        path: "/api/deps",
        columns: &["id", "name"],
    };

    fn item(&self, id: i32) -> String {
        format!("{}/{}", self.path, id)
    }
}

#[derive(Subcommand)]
pub enum ResourceCommands {
    #[command(about = "List records visible to the current user")]
    List,

    #[command(about = "Show one record")]
    Get {
        #[arg(help = "Record ID")]
        id: i32,
    },

    #[command(about = "Create a record from a JSON object on stdin")]
    Create,

    #[command(about = "Update a record from a JSON object on stdin")]
    Update {
        #[arg(help = "Record ID")]
        id: i32,
    },

    #[command(about = "Delete one record")]
    Delete {
        #[arg(help = "Record ID")]
        id: i32,
    },

    #[command(about = "Delete every record")]
    Purge {
        #[arg(long, help = "Confirm deleting every record")]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ReadOnlyCommands {
    #[command(about = "List records")]
    List,

    #[command(about = "Show one record")]
    Get {
        #[arg(help = "Record ID")]
        id: i32,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(flatten)]
    Crud(ResourceCommands),

    #[command(about = "Set a user's password")]
    Passwd {
        #[arg(help = "User ID")]
        id: i32,
        #[arg(long, help = "New password (read from stdin if not provided)")]
        password: Option<String>,
    },
}

pub async fn handle(resource: &Resource, cmd: ResourceCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = ConfigStore::open()?;
    let client = ApiClient::authenticated(&config)?;

    match cmd {
        ResourceCommands::List => {
            let data = client.get(resource.path).await?;
            output_records(&output_format, resource.columns, &data)
        }
        ResourceCommands::Get { id } => {
            let data = client.get(&resource.item(id)).await?;
            output_record(&output_format, &data)
        }
        ResourceCommands::Create => {
            let body = read_json_stdin()?;
            let data = client.post(resource.path, body).await?;
            let message = format!("{} {} created", resource.label, data["id"]);
            output_success(&output_format, &message, Some(data))
        }
        ResourceCommands::Update { id } => {
            let body = read_json_stdin()?;
            let data = client.put(&resource.item(id), body).await?;
            output_success(&output_format, &format!("{} {} updated", resource.label, id), Some(data))
        }
        ResourceCommands::Delete { id } => {
            let data = client.delete(&resource.item(id)).await?;
            output_success(&output_format, &format!("{} {} deleted", resource.label, id), Some(data))
        }
        ResourceCommands::Purge { yes } => {
            if !yes {
                anyhow::bail!("Refusing to delete every {} record without --yes", resource.label.to_lowercase());
            }
            let data = client.delete(resource.path).await?;
            let message = format!("Deleted {} {} record(s)", data["deleted"], resource.label.to_lowercase());
            output_success(&output_format, &message, Some(data))
        }
    }
}

pub async fn handle_read_only(resource: &Resource, cmd: ReadOnlyCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let cmd = match cmd {
        ReadOnlyCommands::List => ResourceCommands::List,
        ReadOnlyCommands::Get { id } => ResourceCommands::Get { id },
    };
    handle(resource, cmd, output_format).await
}

pub async fn handle_users(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Crud(cmd) => handle(&Resource::USERS, cmd, output_format).await,
        UserCommands::Passwd { id, password } => {
            let password = read_password(password)?;
            let config = ConfigStore::open()?;
            let data = ApiClient::authenticated(&config)?
                .put(&format!("/api/users/pass/{}", id), json!({ "password": password }))
                .await?;
            output_success(&output_format, &format!("Password updated for user {}", id), Some(data))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_paths() {
        assert_eq!(Resource::APPLICATIONS.item(12), "/api/aplicacao/12");
        assert_eq!(Resource::GENERAL_DEPARTMENTS.item(3), "/api/deps/3");
    }
}
