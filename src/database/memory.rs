// Process-local store selected with DATABASE_URL=memory://
//
// Mirrors the Postgres contract: same ordering, uniqueness, reference and
// restrict rules. Each operation validates under the write lock before it
// mutates anything, so a failed write leaves every table untouched.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::manager::DatabaseError;
use super::models::{
    ApplicationChanges, ApplicationRecord, Credentials, LinkChanges, LinkRecord, Lookup,
    LookupRecord, NewApplication, NewLink, NewServer, NewUser, ServerRecord, UserChanges,
    UserRecord,
};
use super::store::Store;
use crate::policy::{Role, Scope};

#[derive(Debug, Clone)]
struct UserRow {
    username: String,
    name: String,
    email: String,
    password_hash: String,
    profile_id: i32,
    department_id: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct ApplicationRow {
    name: String,
    description: String,
    department_id: i32,
    server_ids: Vec<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct LinkRow {
    name: String,
    service: String,
    url: String,
    general_department_ids: Vec<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Rows keyed by id, with a serial that never hands out the same id twice.
#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i32, T>,
    next_id: i32,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    fn insert(&mut self, row: T) -> i32 {
        let id = self.next_id;
        self.next_id += 1;
        self.rows.insert(id, row);
        id
    }

    fn contains(&self, id: i32) -> bool {
        self.rows.contains_key(&id)
    }

    fn clear(&mut self) -> u64 {
        let count = self.rows.len() as u64;
        self.rows.clear();
        count
    }
}

#[derive(Debug)]
struct Tables {
    users: Table<UserRow>,
    applications: Table<ApplicationRow>,
    links: Table<LinkRow>,
    servers: Table<ServerRecord>,
    lookups: HashMap<Lookup, Table<String>>,
}

impl Tables {
    fn seeded() -> Self {
        let mut profiles = Table::default();
        profiles.rows.insert(Role::ADMIN_PROFILE_ID, "admin".to_string());
        profiles.rows.insert(Role::USER_PROFILE_ID, "user".to_string());
        profiles.next_id = 3;

        let mut lookups = HashMap::new();
        lookups.insert(Lookup::Profile, profiles);
        lookups.insert(Lookup::Department, Table::default());
        lookups.insert(Lookup::GeneralDepartment, Table::default());

        Self {
            users: Table::default(),
            applications: Table::default(),
            links: Table::default(),
            servers: Table::default(),
            lookups,
        }
    }

    fn lookup(&self, kind: Lookup) -> &Table<String> {
        // Every kind is inserted by `seeded`
        &self.lookups[&kind]
    }

    fn lookup_mut(&mut self, kind: Lookup) -> &mut Table<String> {
        self.lookups.entry(kind).or_default()
    }

    fn lookup_name(&self, kind: Lookup, id: i32) -> Option<String> {
        self.lookup(kind).rows.get(&id).cloned()
    }

    fn require_lookup(&self, kind: Lookup, field: &'static str, id: i32) -> Result<(), DatabaseError> {
        if self.lookup(kind).contains(id) {
            Ok(())
        } else {
            Err(DatabaseError::InvalidReference { field, id })
        }
    }

    fn user_record(&self, id: i32, row: &UserRow) -> UserRecord {
        UserRecord {
            id,
            username: row.username.clone(),
            name: row.name.clone(),
            email: row.email.clone(),
            profile_id: row.profile_id,
            profile_name: self.lookup_name(Lookup::Profile, row.profile_id),
            department_id: row.department_id,
            department_name: row
                .department_id
                .and_then(|d| self.lookup_name(Lookup::Department, d)),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    fn application_record(&self, id: i32, row: &ApplicationRow) -> ApplicationRecord {
        let mut servers: Vec<ServerRecord> = row
            .server_ids
            .iter()
            .filter_map(|sid| self.servers.rows.get(sid).cloned())
            .collect();
        servers.sort_by_key(|s| s.id);

        ApplicationRecord {
            id,
            name: row.name.clone(),
            description: row.description.clone(),
            department_id: row.department_id,
            department_name: self.lookup_name(Lookup::Department, row.department_id),
            servers,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    fn link_record(&self, id: i32, row: &LinkRow) -> LinkRecord {
        let mut general_departments: Vec<LookupRecord> = row
            .general_department_ids
            .iter()
            .filter_map(|gid| {
                self.lookup_name(Lookup::GeneralDepartment, *gid)
                    .map(|name| LookupRecord { id: *gid, name })
            })
            .collect();
        general_departments.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        LinkRecord {
            id,
            name: row.name.clone(),
            service: row.service.clone(),
            url: row.url.clone(),
            general_departments,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    fn check_user_unique(&self, username: &str, email: &str, except: Option<i32>) -> Result<(), DatabaseError> {
        for (id, row) in &self.users.rows {
            if Some(*id) == except {
                continue;
            }
            if row.username == username {
                return Err(DatabaseError::Conflict("Username already in use".to_string()));
            }
            if row.email == email {
                return Err(DatabaseError::Conflict("Email already in use".to_string()));
            }
        }
        Ok(())
    }

    fn check_user_refs(&self, profile_id: i32, department_id: Option<i32>) -> Result<(), DatabaseError> {
        self.require_lookup(Lookup::Profile, "profile_id", profile_id)?;
        if let Some(department_id) = department_id {
            self.require_lookup(Lookup::Department, "department_id", department_id)?;
        }
        Ok(())
    }

    fn check_application(&self, application: &NewApplication, except: Option<i32>) -> Result<(), DatabaseError> {
        if self
            .applications
            .rows
            .iter()
            .any(|(id, row)| Some(*id) != except && row.name == application.name)
        {
            return Err(DatabaseError::Conflict("Application name already in use".to_string()));
        }
        self.require_lookup(Lookup::Department, "department_id", application.department_id)?;
        for server_id in &application.server_ids {
            if !self.servers.contains(*server_id) {
                return Err(DatabaseError::InvalidReference {
                    field: "server_ids",
                    id: *server_id,
                });
            }
        }
        Ok(())
    }

    fn check_link(&self, link: &NewLink, except: Option<i32>) -> Result<(), DatabaseError> {
        if self
            .links
            .rows
            .iter()
            .any(|(id, row)| Some(*id) != except && row.name == link.name)
        {
            return Err(DatabaseError::Conflict("Link name already in use".to_string()));
        }
        for department_id in &link.general_department_ids {
            self.require_lookup(Lookup::GeneralDepartment, "general_department_ids", *department_id)?;
        }
        Ok(())
    }

    fn check_lookup_unique(&self, kind: Lookup, name: &str, except: Option<i32>) -> Result<(), DatabaseError> {
        if self
            .lookup(kind)
            .rows
            .iter()
            .any(|(id, existing)| Some(*id) != except && existing == name)
        {
            return Err(DatabaseError::Conflict(format!("{} name already in use", kind.label())));
        }
        Ok(())
    }

    /// Profiles and departments cannot be removed while users or applications point at them.
    fn check_unreferenced(&self, kind: Lookup, ids: &[i32]) -> Result<(), DatabaseError> {
        let referenced = match kind {
            Lookup::Profile => self.users.rows.values().any(|u| ids.contains(&u.profile_id)),
            Lookup::Department => {
                self.users
                    .rows
                    .values()
                    .any(|u| u.department_id.is_some_and(|d| ids.contains(&d)))
                    || self
                        .applications
                        .rows
                        .values()
                        .any(|a| ids.contains(&a.department_id))
            }
            Lookup::GeneralDepartment => false,
        };

        if referenced {
            Err(DatabaseError::Conflict(format!("{} is still in use", kind.label())))
        } else {
            Ok(())
        }
    }

    fn forget_general_departments(&mut self, ids: &[i32]) {
        for link in self.links.rows.values_mut() {
            link.general_department_ids.retain(|id| !ids.contains(id));
        }
    }
}

fn dedup(ids: &[i32]) -> Vec<i32> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn not_found(label: &str, id: i32) -> DatabaseError {
    DatabaseError::NotFound(format!("{} {} not found", label, id))
}

pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Empty store with the two built-in profiles.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::seeded()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn find_credentials(&self, username: &str) -> Result<Option<Credentials>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .rows
            .iter()
            .find(|(_, row)| row.username == username)
            .map(|(id, row)| Credentials {
                id: *id,
                username: row.username.clone(),
                name: row.name.clone(),
                email: row.email.clone(),
                password_hash: row.password_hash.clone(),
                profile_id: row.profile_id,
                department_id: row.department_id,
            }))
    }

    async fn list_users(&self, scope: Scope) -> Result<Vec<UserRecord>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .rows
            .iter()
            .rev()
            .filter(|(_, row)| scope.admits(row.department_id))
            .map(|(id, row)| tables.user_record(*id, row))
            .collect())
    }

    async fn get_user(&self, id: i32) -> Result<UserRecord, DatabaseError> {
        let tables = self.tables.read().await;
        tables
            .users
            .rows
            .get(&id)
            .map(|row| tables.user_record(id, row))
            .ok_or_else(|| not_found("User", id))
    }

    async fn create_user(&self, user: NewUser) -> Result<i32, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.check_user_unique(&user.username, &user.email, None)?;
        tables.check_user_refs(user.profile_id, user.department_id)?;

        let now = Utc::now();
        Ok(tables.users.insert(UserRow {
            username: user.username,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            profile_id: user.profile_id,
            department_id: user.department_id,
            created_at: now,
            updated_at: now,
        }))
    }

    async fn update_user(&self, id: i32, changes: UserChanges) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains(id) {
            return Err(not_found("User", id));
        }
        tables.check_user_unique(&changes.username, &changes.email, Some(id))?;
        tables.check_user_refs(changes.profile_id, changes.department_id)?;

        if let Some(row) = tables.users.rows.get_mut(&id) {
            row.username = changes.username;
            row.name = changes.name;
            row.email = changes.email;
            row.profile_id = changes.profile_id;
            row.department_id = changes.department_id;
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_password(&self, id: i32, password_hash: String) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let row = tables.users.rows.get_mut(&id).ok_or_else(|| not_found("User", id))?;
        row.password_hash = password_hash;
        row.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_user(&self, id: i32) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        tables
            .users
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("User", id))
    }

    async fn delete_all_users(&self) -> Result<u64, DatabaseError> {
        Ok(self.tables.write().await.users.clear())
    }

    async fn list_applications(&self, scope: Scope) -> Result<Vec<ApplicationRecord>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .applications
            .rows
            .iter()
            .rev()
            .filter(|(_, row)| scope.admits(Some(row.department_id)))
            .map(|(id, row)| tables.application_record(*id, row))
            .collect())
    }

    async fn get_application(&self, id: i32) -> Result<ApplicationRecord, DatabaseError> {
        let tables = self.tables.read().await;
        tables
            .applications
            .rows
            .get(&id)
            .map(|row| tables.application_record(id, row))
            .ok_or_else(|| not_found("Application", id))
    }

    async fn create_application(&self, application: NewApplication) -> Result<i32, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.check_application(&application, None)?;

        let now = Utc::now();
        Ok(tables.applications.insert(ApplicationRow {
            server_ids: dedup(&application.server_ids),
            name: application.name,
            description: application.description,
            department_id: application.department_id,
            created_at: now,
            updated_at: now,
        }))
    }

    async fn update_application(&self, id: i32, changes: ApplicationChanges) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.applications.contains(id) {
            return Err(not_found("Application", id));
        }
        tables.check_application(&changes, Some(id))?;

        if let Some(row) = tables.applications.rows.get_mut(&id) {
            row.server_ids = dedup(&changes.server_ids);
            row.name = changes.name;
            row.description = changes.description;
            row.department_id = changes.department_id;
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_application(&self, id: i32) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        tables
            .applications
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("Application", id))
    }

    async fn delete_all_applications(&self) -> Result<u64, DatabaseError> {
        Ok(self.tables.write().await.applications.clear())
    }

    async fn list_links(&self) -> Result<Vec<LinkRecord>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut links: Vec<LinkRecord> = tables
            .links
            .rows
            .iter()
            .map(|(id, row)| tables.link_record(*id, row))
            .collect();
        links.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(links)
    }

    async fn get_link(&self, id: i32) -> Result<LinkRecord, DatabaseError> {
        let tables = self.tables.read().await;
        tables
            .links
            .rows
            .get(&id)
            .map(|row| tables.link_record(id, row))
            .ok_or_else(|| not_found("Link", id))
    }

    async fn create_link(&self, link: NewLink) -> Result<i32, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.check_link(&link, None)?;

        let now = Utc::now();
        Ok(tables.links.insert(LinkRow {
            general_department_ids: dedup(&link.general_department_ids),
            name: link.name,
            service: link.service,
            url: link.url,
            created_at: now,
            updated_at: now,
        }))
    }

    async fn update_link(&self, id: i32, changes: LinkChanges) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.links.contains(id) {
            return Err(not_found("Link", id));
        }
        tables.check_link(&changes, Some(id))?;

        if let Some(row) = tables.links.rows.get_mut(&id) {
            row.general_department_ids = dedup(&changes.general_department_ids);
            row.name = changes.name;
            row.service = changes.service;
            row.url = changes.url;
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_link(&self, id: i32) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        tables
            .links
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("Link", id))
    }

    async fn delete_all_links(&self) -> Result<u64, DatabaseError> {
        Ok(self.tables.write().await.links.clear())
    }

    async fn list_lookup(&self, kind: Lookup) -> Result<Vec<LookupRecord>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut records: Vec<LookupRecord> = tables
            .lookup(kind)
            .rows
            .iter()
            .map(|(id, name)| LookupRecord {
                id: *id,
                name: name.clone(),
            })
            .collect();

        match kind {
            Lookup::Profile => records.sort_by(|a, b| b.id.cmp(&a.id)),
            Lookup::Department | Lookup::GeneralDepartment => {
                records.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)))
            }
        }
        Ok(records)
    }

    async fn get_lookup(&self, kind: Lookup, id: i32) -> Result<LookupRecord, DatabaseError> {
        let tables = self.tables.read().await;
        tables
            .lookup_name(kind, id)
            .map(|name| LookupRecord { id, name })
            .ok_or_else(|| not_found(kind.label(), id))
    }

    async fn create_lookup(&self, kind: Lookup, name: String) -> Result<i32, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.check_lookup_unique(kind, &name, None)?;
        Ok(tables.lookup_mut(kind).insert(name))
    }

    async fn update_lookup(&self, kind: Lookup, id: i32, name: String) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.lookup(kind).contains(id) {
            return Err(not_found(kind.label(), id));
        }
        tables.check_lookup_unique(kind, &name, Some(id))?;
        tables.lookup_mut(kind).rows.insert(id, name);
        Ok(())
    }

    async fn delete_lookup(&self, kind: Lookup, id: i32) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.lookup(kind).contains(id) {
            return Err(not_found(kind.label(), id));
        }
        tables.check_unreferenced(kind, &[id])?;

        if kind == Lookup::GeneralDepartment {
            tables.forget_general_departments(&[id]);
        }
        tables.lookup_mut(kind).rows.remove(&id);
        Ok(())
    }

    async fn delete_all_lookup(&self, kind: Lookup) -> Result<u64, DatabaseError> {
        let mut tables = self.tables.write().await;
        let ids: Vec<i32> = tables.lookup(kind).rows.keys().copied().collect();
        tables.check_unreferenced(kind, &ids)?;

        if kind == Lookup::GeneralDepartment {
            tables.forget_general_departments(&ids);
        }
        Ok(tables.lookup_mut(kind).clear())
    }

    async fn list_servers(&self) -> Result<Vec<ServerRecord>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.servers.rows.values().rev().cloned().collect())
    }

    async fn get_server(&self, id: i32) -> Result<ServerRecord, DatabaseError> {
        let tables = self.tables.read().await;
        tables
            .servers
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("Server", id))
    }

    async fn create_server(&self, server: NewServer) -> Result<i32, DatabaseError> {
        let mut tables = self.tables.write().await;
        let id = tables.servers.next_id;
        Ok(tables.servers.insert(ServerRecord {
            id,
            name: server.name,
            ip_address: server.ip_address,
            operating_system: server.operating_system,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, department_id: Option<i32>) -> NewUser {
        NewUser {
            username: username.to_string(),
            name: username.to_string(),
            email: format!("{}@x.com", username),
            password_hash: "hash".to_string(),
            profile_id: Role::USER_PROFILE_ID,
            department_id,
        }
    }

    async fn server(store: &MemoryStore, name: &str) -> i32 {
        store
            .create_server(NewServer {
                name: name.to_string(),
                ip_address: "10.0.0.1".to_string(),
                operating_system: "Linux".to_string(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn seeds_builtin_profiles() {
        let store = MemoryStore::new();
        let profiles = store.list_lookup(Lookup::Profile).await.unwrap();
        let names: Vec<_> = profiles.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["user", "admin"]);
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let store = MemoryStore::new();
        store.create_user(new_user("jdoe", None)).await.unwrap();

        let mut again = new_user("jdoe", None);
        again.email = "other@x.com".to_string();
        let err = store.create_user(again).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));
        assert_eq!(store.list_users(Scope::All).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_may_keep_its_own_unique_values() {
        let store = MemoryStore::new();
        let id = store.create_user(new_user("jdoe", None)).await.unwrap();

        let changes = UserChanges {
            username: "jdoe".to_string(),
            name: "John Doe".to_string(),
            email: "jdoe@x.com".to_string(),
            profile_id: Role::USER_PROFILE_ID,
            department_id: None,
        };
        store.update_user(id, changes).await.unwrap();
        assert_eq!(store.get_user(id).await.unwrap().name, "John Doe");
    }

    #[tokio::test]
    async fn list_users_respects_scope() {
        let store = MemoryStore::new();
        let sales = store.create_lookup(Lookup::Department, "Sales".into()).await.unwrap();
        let ops = store.create_lookup(Lookup::Department, "Ops".into()).await.unwrap();
        store.create_user(new_user("a", Some(sales))).await.unwrap();
        store.create_user(new_user("b", Some(ops))).await.unwrap();
        store.create_user(new_user("c", None)).await.unwrap();

        let scoped = store.list_users(Scope::Department(sales)).await.unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].department_name.as_deref(), Some("Sales"));

        let all = store.list_users(Scope::All).await.unwrap();
        let usernames: Vec<_> = all.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(usernames, vec!["c", "b", "a"]);

        assert!(store.list_users(Scope::Nothing).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn application_update_replaces_servers() {
        let store = MemoryStore::new();
        let dept = store.create_lookup(Lookup::Department, "IT".into()).await.unwrap();
        let first = server(&store, "srv-1").await;
        let second = server(&store, "srv-2").await;

        let id = store
            .create_application(NewApplication {
                name: "Payroll".into(),
                description: String::new(),
                department_id: dept,
                server_ids: vec![first],
            })
            .await
            .unwrap();

        store
            .update_application(
                id,
                NewApplication {
                    name: "Payroll".into(),
                    description: "v2".into(),
                    department_id: dept,
                    server_ids: vec![second],
                },
            )
            .await
            .unwrap();

        let app = store.get_application(id).await.unwrap();
        let servers: Vec<_> = app.servers.iter().map(|s| s.id).collect();
        assert_eq!(servers, vec![second]);
    }

    #[tokio::test]
    async fn unknown_server_reference_changes_nothing() {
        let store = MemoryStore::new();
        let dept = store.create_lookup(Lookup::Department, "IT".into()).await.unwrap();

        let err = store
            .create_application(NewApplication {
                name: "Payroll".into(),
                description: String::new(),
                department_id: dept,
                server_ids: vec![99],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidReference { field: "server_ids", id: 99 }));
        assert!(store.list_applications(Scope::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn referenced_department_cannot_be_deleted() {
        let store = MemoryStore::new();
        let dept = store.create_lookup(Lookup::Department, "IT".into()).await.unwrap();
        store.create_user(new_user("a", Some(dept))).await.unwrap();

        assert!(matches!(
            store.delete_lookup(Lookup::Department, dept).await,
            Err(DatabaseError::Conflict(_))
        ));
        assert!(matches!(
            store.delete_all_lookup(Lookup::Department).await,
            Err(DatabaseError::Conflict(_))
        ));
        assert!(store.get_lookup(Lookup::Department, dept).await.is_ok());
    }

    #[tokio::test]
    async fn deleting_general_department_detaches_links() {
        let store = MemoryStore::new();
        let gd = store
            .create_lookup(Lookup::GeneralDepartment, "Finance".into())
            .await
            .unwrap();
        let link = store
            .create_link(NewLink {
                name: "Wiki".into(),
                service: "docs".into(),
                url: "https://wiki".into(),
                general_department_ids: vec![gd, gd],
            })
            .await
            .unwrap();
        assert_eq!(store.get_link(link).await.unwrap().general_departments.len(), 1);

        store.delete_lookup(Lookup::GeneralDepartment, gd).await.unwrap();
        assert!(store.get_link(link).await.unwrap().general_departments.is_empty());
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_bulk_delete() {
        let store = MemoryStore::new();
        let first = store.create_user(new_user("a", None)).await.unwrap();
        assert_eq!(store.delete_all_users().await.unwrap(), 1);
        let second = store.create_user(new_user("b", None)).await.unwrap();
        assert!(second > first);
    }
}
