use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::server::ServerRecord;

/// Application with its department name and the servers it runs on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub department_id: i32,
    pub department_name: Option<String>,
    pub servers: Vec<ServerRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub name: String,
    pub description: String,
    pub department_id: i32,
    pub server_ids: Vec<i32>,
}

/// Full replacement of an application's columns and server set.
pub type ApplicationChanges = NewApplication;
