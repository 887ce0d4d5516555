use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ServerRecord {
    pub id: i32,
    pub name: String,
    pub ip_address: String,
    pub operating_system: String,
}

#[derive(Debug, Clone)]
pub struct NewServer {
    pub name: String,
    pub ip_address: String,
    pub operating_system: String,
}
