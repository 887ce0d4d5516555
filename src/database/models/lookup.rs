use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Name-only tables that share one CRUD shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Lookup {
    Profile,
    Department,
    GeneralDepartment,
}

impl Lookup {
    pub fn table(self) -> &'static str {
        match self {
            Lookup::Profile => "profiles",
            Lookup::Department => "departments",
            Lookup::GeneralDepartment => "general_departments",
        }
    }

    /// Human readable singular, used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            Lookup::Profile => "Profile",
            Lookup::Department => "Department",
            Lookup::GeneralDepartment => "General department",
        }
    }

    /// Profiles list newest first; departments are browsed alphabetically.
    pub fn order_by(self) -> &'static str {
        match self {
            Lookup::Profile => "id DESC",
            Lookup::Department | Lookup::GeneralDepartment => "name ASC, id ASC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LookupRecord {
    pub id: i32,
    pub name: String,
}
