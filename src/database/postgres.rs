use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use std::collections::HashMap;
use tracing::{debug, info};

use super::manager::DatabaseError;
use super::models::{
    ApplicationChanges, ApplicationRecord, Credentials, LinkChanges, LinkRecord, Lookup,
    LookupRecord, NewApplication, NewLink, NewServer, NewUser, ServerRecord, UserChanges,
    UserRecord,
};
use super::store::Store;
use crate::policy::Scope;

const SCHEMA: &str = include_str!("schema.sql");

const USER_SELECT: &str = r#"
    SELECT u.id, u.username, u.name, u.email,
           u.profile_id, p.name AS profile_name,
           u.department_id, d.name AS department_name,
           u.created_at, u.updated_at
      FROM users u
      LEFT JOIN profiles p ON p.id = u.profile_id
      LEFT JOIN departments d ON d.id = u.department_id
"#;

const APPLICATION_SELECT: &str = r#"
    SELECT a.id, a.name, a.description, a.department_id, d.name AS department_name,
           a.created_at, a.updated_at
      FROM applications a
      LEFT JOIN departments d ON d.id = a.department_id
"#;

const LINK_SELECT: &str = r#"
    SELECT l.id, l.name, l.service, l.url, l.created_at, l.updated_at
      FROM links l
"#;

#[derive(Debug, FromRow)]
struct ApplicationRow {
    id: i32,
    name: String,
    description: String,
    department_id: i32,
    department_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct ApplicationServerRow {
    application_id: i32,
    id: i32,
    name: String,
    ip_address: String,
    operating_system: String,
}

#[derive(Debug, FromRow)]
struct LinkRow {
    id: i32,
    name: String,
    service: String,
    url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct LinkDepartmentRow {
    link_id: i32,
    id: i32,
    name: String,
}

/// PostgreSQL-backed store. Connections are borrowed from the pool per statement
/// or per transaction and returned on drop.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the idempotent bootstrap schema
    pub async fn apply_schema(&self) -> Result<(), DatabaseError> {
        let statements = schema_statements(SCHEMA);
        for statement in &statements {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Applied bootstrap schema ({} statements)", statements.len());
        Ok(())
    }

    async fn attach_servers(&self, rows: Vec<ApplicationRow>) -> Result<Vec<ApplicationRecord>, DatabaseError> {
        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let joined: Vec<ApplicationServerRow> = sqlx::query_as(
            r#"
            SELECT j.application_id, s.id, s.name, s.ip_address, s.operating_system
              FROM application_servers j
              JOIN servers s ON s.id = j.server_id
             WHERE j.application_id = ANY($1)
             ORDER BY s.id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut servers: HashMap<i32, Vec<ServerRecord>> = HashMap::new();
        for row in joined {
            servers.entry(row.application_id).or_default().push(ServerRecord {
                id: row.id,
                name: row.name,
                ip_address: row.ip_address,
                operating_system: row.operating_system,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| ApplicationRecord {
                servers: servers.remove(&row.id).unwrap_or_default(),
                id: row.id,
                name: row.name,
                description: row.description,
                department_id: row.department_id,
                department_name: row.department_name,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect())
    }

    async fn attach_general_departments(&self, rows: Vec<LinkRow>) -> Result<Vec<LinkRecord>, DatabaseError> {
        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let joined: Vec<LinkDepartmentRow> = sqlx::query_as(
            r#"
            SELECT j.link_id, g.id, g.name
              FROM link_general_departments j
              JOIN general_departments g ON g.id = j.general_department_id
             WHERE j.link_id = ANY($1)
             ORDER BY g.name, g.id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut departments: HashMap<i32, Vec<LookupRecord>> = HashMap::new();
        for row in joined {
            departments
                .entry(row.link_id)
                .or_default()
                .push(LookupRecord { id: row.id, name: row.name });
        }

        Ok(rows
            .into_iter()
            .map(|row| LinkRecord {
                general_departments: departments.remove(&row.id).unwrap_or_default(),
                id: row.id,
                name: row.name,
                service: row.service,
                url: row.url,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect())
    }
}

/// Split the schema file into executable statements, dropping comment-only fragments.
fn schema_statements(schema: &str) -> Vec<String> {
    schema
        .split(';')
        .map(|fragment| {
            fragment
                .lines()
                .filter(|line| !line.trim_start().starts_with("--"))
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string()
        })
        .filter(|statement| !statement.is_empty())
        .collect()
}

/// Fallback for constraint violations that slip past the explicit checks (concurrent writers).
fn map_write_error(err: sqlx::Error) -> DatabaseError {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            Some("23505") => {
                debug!("Unique violation on {:?}", db.constraint());
                return DatabaseError::Conflict("Record already exists".to_string());
            }
            Some("23503") => {
                debug!("Foreign key violation on {:?}", db.constraint());
                return DatabaseError::Conflict("Record is still referenced".to_string());
            }
            _ => {}
        }
    }
    DatabaseError::Sqlx(err)
}

fn not_found(label: &str, id: i32) -> DatabaseError {
    DatabaseError::NotFound(format!("{} {} not found", label, id))
}

async fn exists(conn: &mut PgConnection, table: &str, id: i32) -> Result<bool, DatabaseError> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", table);
    Ok(sqlx::query_scalar(&sql).bind(id).fetch_one(&mut *conn).await?)
}

/// `true` when another row (not `except`) already holds `value` in `column`.
async fn taken(
    conn: &mut PgConnection,
    table: &str,
    column: &str,
    value: &str,
    except: Option<i32>,
) -> Result<bool, DatabaseError> {
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = $1 AND id <> $2)",
        table, column
    );
    Ok(sqlx::query_scalar(&sql)
        .bind(value)
        .bind(except.unwrap_or(0))
        .fetch_one(&mut *conn)
        .await?)
}

async fn require(conn: &mut PgConnection, table: &str, field: &'static str, id: i32) -> Result<(), DatabaseError> {
    if exists(conn, table, id).await? {
        Ok(())
    } else {
        Err(DatabaseError::InvalidReference { field, id })
    }
}

async fn require_all(
    conn: &mut PgConnection,
    table: &str,
    field: &'static str,
    ids: &[i32],
) -> Result<(), DatabaseError> {
    let sql = format!("SELECT id FROM {} WHERE id = ANY($1)", table);
    let found: Vec<i32> = sqlx::query_scalar(&sql).bind(ids).fetch_all(&mut *conn).await?;
    match ids.iter().find(|id| !found.contains(id)) {
        Some(missing) => Err(DatabaseError::InvalidReference { field, id: *missing }),
        None => Ok(()),
    }
}

async fn check_user(
    conn: &mut PgConnection,
    username: &str,
    email: &str,
    profile_id: i32,
    department_id: Option<i32>,
    except: Option<i32>,
) -> Result<(), DatabaseError> {
    if taken(conn, "users", "username", username, except).await? {
        return Err(DatabaseError::Conflict("Username already in use".to_string()));
    }
    if taken(conn, "users", "email", email, except).await? {
        return Err(DatabaseError::Conflict("Email already in use".to_string()));
    }
    require(conn, "profiles", "profile_id", profile_id).await?;
    if let Some(department_id) = department_id {
        require(conn, "departments", "department_id", department_id).await?;
    }
    Ok(())
}

async fn check_application(
    conn: &mut PgConnection,
    application: &NewApplication,
    except: Option<i32>,
) -> Result<(), DatabaseError> {
    if taken(conn, "applications", "name", &application.name, except).await? {
        return Err(DatabaseError::Conflict("Application name already in use".to_string()));
    }
    require(conn, "departments", "department_id", application.department_id).await?;
    require_all(conn, "servers", "server_ids", &application.server_ids).await
}

async fn check_link(conn: &mut PgConnection, link: &NewLink, except: Option<i32>) -> Result<(), DatabaseError> {
    if taken(conn, "links", "name", &link.name, except).await? {
        return Err(DatabaseError::Conflict("Link name already in use".to_string()));
    }
    require_all(
        conn,
        "general_departments",
        "general_department_ids",
        &link.general_department_ids,
    )
    .await
}

async fn insert_application_servers(
    conn: &mut PgConnection,
    application_id: i32,
    server_ids: &[i32],
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO application_servers (application_id, server_id)
        SELECT $1, UNNEST($2::int[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(application_id)
    .bind(server_ids)
    .execute(&mut *conn)
    .await
    .map_err(map_write_error)?;
    Ok(())
}

async fn insert_link_departments(
    conn: &mut PgConnection,
    link_id: i32,
    department_ids: &[i32],
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO link_general_departments (link_id, general_department_id)
        SELECT $1, UNNEST($2::int[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(link_id)
    .bind(department_ids)
    .execute(&mut *conn)
    .await
    .map_err(map_write_error)?;
    Ok(())
}

/// Rejects deleting profiles or departments that users or applications still point at.
async fn check_unreferenced(conn: &mut PgConnection, kind: Lookup, ids: &[i32]) -> Result<(), DatabaseError> {
    let sql = match kind {
        Lookup::Profile => "SELECT EXISTS(SELECT 1 FROM users WHERE profile_id = ANY($1))",
        Lookup::Department => {
            "SELECT EXISTS(SELECT 1 FROM users WHERE department_id = ANY($1))
                 OR EXISTS(SELECT 1 FROM applications WHERE department_id = ANY($1))"
        }
        Lookup::GeneralDepartment => return Ok(()),
    };

    let referenced: bool = sqlx::query_scalar(sql).bind(ids).fetch_one(&mut *conn).await?;
    if referenced {
        Err(DatabaseError::Conflict(format!("{} is still in use", kind.label())))
    } else {
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_credentials(&self, username: &str) -> Result<Option<Credentials>, DatabaseError> {
        let credentials = sqlx::query_as::<_, Credentials>(
            r#"
            SELECT id, username, name, email, password_hash, profile_id, department_id
              FROM users
             WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(credentials)
    }

    async fn list_users(&self, scope: Scope) -> Result<Vec<UserRecord>, DatabaseError> {
        let users = match scope {
            Scope::All => {
                let sql = format!("{} ORDER BY u.id DESC", USER_SELECT);
                sqlx::query_as::<_, UserRecord>(&sql).fetch_all(&self.pool).await?
            }
            Scope::Department(department_id) => {
                let sql = format!("{} WHERE u.department_id = $1 ORDER BY u.id DESC", USER_SELECT);
                sqlx::query_as::<_, UserRecord>(&sql)
                    .bind(department_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            Scope::Nothing => Vec::new(),
        };
        Ok(users)
    }

    async fn get_user(&self, id: i32) -> Result<UserRecord, DatabaseError> {
        let sql = format!("{} WHERE u.id = $1", USER_SELECT);
        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found("User", id))
    }

    async fn create_user(&self, user: NewUser) -> Result<i32, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        check_user(&mut tx, &user.username, &user.email, user.profile_id, user.department_id, None).await?;

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, name, email, password_hash, profile_id, department_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.profile_id)
        .bind(user.department_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;

        tx.commit().await?;
        Ok(id)
    }

    async fn update_user(&self, id: i32, changes: UserChanges) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        if !exists(&mut tx, "users", id).await? {
            return Err(not_found("User", id));
        }
        check_user(
            &mut tx,
            &changes.username,
            &changes.email,
            changes.profile_id,
            changes.department_id,
            Some(id),
        )
        .await?;

        sqlx::query(
            r#"
            UPDATE users
               SET username = $2, name = $3, email = $4, profile_id = $5, department_id = $6,
                   updated_at = now()
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&changes.username)
        .bind(&changes.name)
        .bind(&changes.email)
        .bind(changes.profile_id)
        .bind(changes.department_id)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        tx.commit().await?;
        Ok(())
    }

    async fn update_password(&self, id: i32, password_hash: String) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(&password_hash)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found("User", id));
        }
        Ok(())
    }

    async fn delete_user(&self, id: i32) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(not_found("User", id));
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_all_users(&self) -> Result<u64, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM users")
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }

    async fn list_applications(&self, scope: Scope) -> Result<Vec<ApplicationRecord>, DatabaseError> {
        let rows = match scope {
            Scope::All => {
                let sql = format!("{} ORDER BY a.id DESC", APPLICATION_SELECT);
                sqlx::query_as::<_, ApplicationRow>(&sql).fetch_all(&self.pool).await?
            }
            Scope::Department(department_id) => {
                let sql = format!("{} WHERE a.department_id = $1 ORDER BY a.id DESC", APPLICATION_SELECT);
                sqlx::query_as::<_, ApplicationRow>(&sql)
                    .bind(department_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            Scope::Nothing => return Ok(Vec::new()),
        };
        self.attach_servers(rows).await
    }

    async fn get_application(&self, id: i32) -> Result<ApplicationRecord, DatabaseError> {
        let sql = format!("{} WHERE a.id = $1", APPLICATION_SELECT);
        let row = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found("Application", id))?;

        self.attach_servers(vec![row])
            .await?
            .pop()
            .ok_or_else(|| not_found("Application", id))
    }

    async fn create_application(&self, application: NewApplication) -> Result<i32, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        check_application(&mut tx, &application, None).await?;

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO applications (name, description, department_id)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&application.name)
        .bind(&application.description)
        .bind(application.department_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;

        insert_application_servers(&mut tx, id, &application.server_ids).await?;

        tx.commit().await?;
        Ok(id)
    }

    async fn update_application(&self, id: i32, changes: ApplicationChanges) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        if !exists(&mut tx, "applications", id).await? {
            return Err(not_found("Application", id));
        }
        check_application(&mut tx, &changes, Some(id)).await?;

        sqlx::query(
            r#"
            UPDATE applications
               SET name = $2, description = $3, department_id = $4, updated_at = now()
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(changes.department_id)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        sqlx::query("DELETE FROM application_servers WHERE application_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_application_servers(&mut tx, id, &changes.server_ids).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_application(&self, id: i32) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM application_servers WHERE application_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM applications WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found("Application", id));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_all_applications(&self) -> Result<u64, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM application_servers").execute(&mut *tx).await?;
        let result = sqlx::query("DELETE FROM applications").execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }

    async fn list_links(&self) -> Result<Vec<LinkRecord>, DatabaseError> {
        let sql = format!("{} ORDER BY l.name ASC, l.id ASC", LINK_SELECT);
        let rows = sqlx::query_as::<_, LinkRow>(&sql).fetch_all(&self.pool).await?;
        self.attach_general_departments(rows).await
    }

    async fn get_link(&self, id: i32) -> Result<LinkRecord, DatabaseError> {
        let sql = format!("{} WHERE l.id = $1", LINK_SELECT);
        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found("Link", id))?;

        self.attach_general_departments(vec![row])
            .await?
            .pop()
            .ok_or_else(|| not_found("Link", id))
    }

    async fn create_link(&self, link: NewLink) -> Result<i32, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        check_link(&mut tx, &link, None).await?;

        let id: i32 = sqlx::query_scalar("INSERT INTO links (name, service, url) VALUES ($1, $2, $3) RETURNING id")
            .bind(&link.name)
            .bind(&link.service)
            .bind(&link.url)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_write_error)?;

        insert_link_departments(&mut tx, id, &link.general_department_ids).await?;

        tx.commit().await?;
        Ok(id)
    }

    async fn update_link(&self, id: i32, changes: LinkChanges) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        if !exists(&mut tx, "links", id).await? {
            return Err(not_found("Link", id));
        }
        check_link(&mut tx, &changes, Some(id)).await?;

        sqlx::query("UPDATE links SET name = $2, service = $3, url = $4, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.service)
            .bind(&changes.url)
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;

        sqlx::query("DELETE FROM link_general_departments WHERE link_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_link_departments(&mut tx, id, &changes.general_department_ids).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_link(&self, id: i32) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM link_general_departments WHERE link_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM links WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found("Link", id));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_all_links(&self) -> Result<u64, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM link_general_departments").execute(&mut *tx).await?;
        let result = sqlx::query("DELETE FROM links").execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }

    async fn list_lookup(&self, kind: Lookup) -> Result<Vec<LookupRecord>, DatabaseError> {
        let sql = format!("SELECT id, name FROM {} ORDER BY {}", kind.table(), kind.order_by());
        Ok(sqlx::query_as::<_, LookupRecord>(&sql).fetch_all(&self.pool).await?)
    }

    async fn get_lookup(&self, kind: Lookup, id: i32) -> Result<LookupRecord, DatabaseError> {
        let sql = format!("SELECT id, name FROM {} WHERE id = $1", kind.table());
        sqlx::query_as::<_, LookupRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(kind.label(), id))
    }

    async fn create_lookup(&self, kind: Lookup, name: String) -> Result<i32, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        if taken(&mut tx, kind.table(), "name", &name, None).await? {
            return Err(DatabaseError::Conflict(format!("{} name already in use", kind.label())));
        }

        let sql = format!("INSERT INTO {} (name) VALUES ($1) RETURNING id", kind.table());
        let id: i32 = sqlx::query_scalar(&sql)
            .bind(&name)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_write_error)?;

        tx.commit().await?;
        Ok(id)
    }

    async fn update_lookup(&self, kind: Lookup, id: i32, name: String) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        if !exists(&mut tx, kind.table(), id).await? {
            return Err(not_found(kind.label(), id));
        }
        if taken(&mut tx, kind.table(), "name", &name, Some(id)).await? {
            return Err(DatabaseError::Conflict(format!("{} name already in use", kind.label())));
        }

        let sql = format!("UPDATE {} SET name = $2 WHERE id = $1", kind.table());
        sqlx::query(&sql)
            .bind(id)
            .bind(&name)
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_lookup(&self, kind: Lookup, id: i32) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        if !exists(&mut tx, kind.table(), id).await? {
            return Err(not_found(kind.label(), id));
        }
        check_unreferenced(&mut tx, kind, &[id]).await?;

        if kind == Lookup::GeneralDepartment {
            sqlx::query("DELETE FROM link_general_departments WHERE general_department_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        let sql = format!("DELETE FROM {} WHERE id = $1", kind.table());
        sqlx::query(&sql)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_all_lookup(&self, kind: Lookup) -> Result<u64, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let ids_sql = format!("SELECT id FROM {}", kind.table());
        let ids: Vec<i32> = sqlx::query_scalar(&ids_sql).fetch_all(&mut *tx).await?;
        check_unreferenced(&mut tx, kind, &ids).await?;

        if kind == Lookup::GeneralDepartment {
            sqlx::query("DELETE FROM link_general_departments")
                .execute(&mut *tx)
                .await?;
        }

        let sql = format!("DELETE FROM {}", kind.table());
        let result = sqlx::query(&sql)
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }

    async fn list_servers(&self) -> Result<Vec<ServerRecord>, DatabaseError> {
        Ok(sqlx::query_as::<_, ServerRecord>(
            "SELECT id, name, ip_address, operating_system FROM servers ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_server(&self, id: i32) -> Result<ServerRecord, DatabaseError> {
        sqlx::query_as::<_, ServerRecord>(
            "SELECT id, name, ip_address, operating_system FROM servers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found("Server", id))
    }

    async fn create_server(&self, server: NewServer) -> Result<i32, DatabaseError> {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO servers (name, ip_address, operating_system) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&server.name)
        .bind(&server.ip_address)
        .bind(&server.operating_system)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_splits_into_statements() {
        let statements = schema_statements(SCHEMA);
        assert!(statements.iter().all(|s| !s.starts_with("--")));
        assert!(statements[0].starts_with("CREATE TABLE IF NOT EXISTS profiles"));
        assert!(statements
            .iter()
            .any(|s| s.contains("CREATE TABLE IF NOT EXISTS link_general_departments")));
        assert!(statements.iter().all(|s| !s.is_empty()));
    }

    #[test]
    fn comment_only_fragments_are_dropped() {
        let statements = schema_statements("-- header\n;\nSELECT 1;\n-- trailer\n");
        assert_eq!(statements, vec!["SELECT 1".to_string()]);
    }

    #[test]
    fn non_database_errors_pass_through() {
        assert!(matches!(
            map_write_error(sqlx::Error::RowNotFound),
            DatabaseError::Sqlx(sqlx::Error::RowNotFound)
        ));
    }
}
