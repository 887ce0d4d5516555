use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lookup::LookupRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRecord {
    pub id: i32,
    pub name: String,
    pub service: String,
    pub url: String,
    pub general_departments: Vec<LookupRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewLink {
    pub name: String,
    pub service: String,
    pub url: String,
    pub general_department_ids: Vec<i32>,
}

pub type LinkChanges = NewLink;
