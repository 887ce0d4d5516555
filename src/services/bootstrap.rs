use tracing::info;

use crate::config::BootstrapAdmin;
use crate::database::models::NewUser;
use crate::database::Store;
use crate::error::ApiError;
use crate::policy::Role;
use crate::services::password::PasswordService;

/// Creates the configured administrator unless a user with that username exists.
/// Returns the new user's id, or `None` when nothing was created.
pub async fn ensure_admin(
    store: &dyn Store,
    passwords: &PasswordService,
    admin: &BootstrapAdmin,
) -> Result<Option<i32>, ApiError> {
    if store.find_credentials(&admin.username).await?.is_some() {
        info!("Bootstrap admin '{}' already present", admin.username);
        return Ok(None);
    }

    let password_hash = passwords.hash(admin.password.clone()).await?;
    let id = store
        .create_user(NewUser {
            username: admin.username.clone(),
            name: admin.username.clone(),
            email: admin.email.clone(),
            password_hash,
            profile_id: Role::ADMIN_PROFILE_ID,
            department_id: None,
        })
        .await?;

    info!("Created bootstrap admin '{}' (id {})", admin.username, id);
    Ok(Some(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PasswordHashConfig;
    use crate::database::MemoryStore;

    fn admin() -> BootstrapAdmin {
        BootstrapAdmin {
            username: "root".to_string(),
            password: "changeme".to_string(),
            email: "root@localhost".to_string(),
        }
    }

    fn passwords() -> PasswordService {
        PasswordService::new(&PasswordHashConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn creates_admin_once() {
        let store = MemoryStore::new();
        let passwords = passwords();

        let first = ensure_admin(&store, &passwords, &admin()).await.unwrap();
        let second = ensure_admin(&store, &passwords, &admin()).await.unwrap();
        assert!(first.is_some());
        assert!(second.is_none());

        let credentials = store.find_credentials("root").await.unwrap().unwrap();
        assert_eq!(credentials.profile_id, Role::ADMIN_PROFILE_ID);
        assert!(passwords.verify_blocking("changeme", &credentials.password_hash).unwrap());
    }
}
