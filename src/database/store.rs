use async_trait::async_trait;

use super::manager::DatabaseError;
use super::models::{
    ApplicationChanges, ApplicationRecord, Credentials, LinkChanges, LinkRecord, Lookup,
    LookupRecord, NewApplication, NewLink, NewServer, NewUser, ServerRecord, UserChanges,
    UserRecord,
};
use crate::policy::Scope;

/// Persistence contract shared by the Postgres and in-memory backends.
///
/// Every write that touches more than one row is atomic. Uniqueness violations
/// come back as `DatabaseError::Conflict`, missing rows as `NotFound` and
/// dangling foreign keys as `InvalidReference` naming the offending field.
#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> Result<(), DatabaseError>;

    // Users
    async fn find_credentials(&self, username: &str) -> Result<Option<Credentials>, DatabaseError>;
    async fn list_users(&self, scope: Scope) -> Result<Vec<UserRecord>, DatabaseError>;
    async fn get_user(&self, id: i32) -> Result<UserRecord, DatabaseError>;
    async fn create_user(&self, user: NewUser) -> Result<i32, DatabaseError>;
    async fn update_user(&self, id: i32, changes: UserChanges) -> Result<(), DatabaseError>;
    async fn update_password(&self, id: i32, password_hash: String) -> Result<(), DatabaseError>;
    async fn delete_user(&self, id: i32) -> Result<(), DatabaseError>;
    async fn delete_all_users(&self) -> Result<u64, DatabaseError>;

    // Applications
    async fn list_applications(&self, scope: Scope) -> Result<Vec<ApplicationRecord>, DatabaseError>;
    async fn get_application(&self, id: i32) -> Result<ApplicationRecord, DatabaseError>;
    async fn create_application(&self, application: NewApplication) -> Result<i32, DatabaseError>;
    async fn update_application(&self, id: i32, changes: ApplicationChanges) -> Result<(), DatabaseError>;
    async fn delete_application(&self, id: i32) -> Result<(), DatabaseError>;
    async fn delete_all_applications(&self) -> Result<u64, DatabaseError>;

    // Links
    async fn list_links(&self) -> Result<Vec<LinkRecord>, DatabaseError>;
    async fn get_link(&self, id: i32) -> Result<LinkRecord, DatabaseError>;
    async fn create_link(&self, link: NewLink) -> Result<i32, DatabaseError>;
    async fn update_link(&self, id: i32, changes: LinkChanges) -> Result<(), DatabaseError>;
    async fn delete_link(&self, id: i32) -> Result<(), DatabaseError>;
    async fn delete_all_links(&self) -> Result<u64, DatabaseError>;

    // Profiles, departments, general departments
    async fn list_lookup(&self, kind: Lookup) -> Result<Vec<LookupRecord>, DatabaseError>;
    async fn get_lookup(&self, kind: Lookup, id: i32) -> Result<LookupRecord, DatabaseError>;
    async fn create_lookup(&self, kind: Lookup, name: String) -> Result<i32, DatabaseError>;
    async fn update_lookup(&self, kind: Lookup, id: i32, name: String) -> Result<(), DatabaseError>;
    async fn delete_lookup(&self, kind: Lookup, id: i32) -> Result<(), DatabaseError>;
    async fn delete_all_lookup(&self, kind: Lookup) -> Result<u64, DatabaseError>;

    // Servers
    async fn list_servers(&self) -> Result<Vec<ServerRecord>, DatabaseError>;
    async fn get_server(&self, id: i32) -> Result<ServerRecord, DatabaseError>;
    async fn create_server(&self, server: NewServer) -> Result<i32, DatabaseError>;
}
