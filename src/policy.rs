// Role-based visibility shared by every department-scoped resource (users, applications).

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::middleware::AuthUser;

/// Authorization tier, carried in tokens as the user's profile id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    StandardUser,
}

impl Role {
    pub const ADMIN_PROFILE_ID: i32 = 1;
    pub const USER_PROFILE_ID: i32 = 2;

    pub fn profile_id(self) -> i32 {
        match self {
            Role::Admin => Self::ADMIN_PROFILE_ID,
            Role::StandardUser => Self::USER_PROFILE_ID,
        }
    }

    pub fn from_profile_id(profile_id: i32) -> Option<Role> {
        match profile_id {
            Self::ADMIN_PROFILE_ID => Some(Role::Admin),
            Self::USER_PROFILE_ID => Some(Role::StandardUser),
            _ => None,
        }
    }
}

/// Which rows of a department-scoped table a requester may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    Department(i32),
    /// A standard user without a department sees nothing.
    Nothing,
}

impl Scope {
    pub fn admits(&self, department: Option<i32>) -> bool {
        match self {
            Scope::All => true,
            Scope::Department(id) => department == Some(*id),
            Scope::Nothing => false,
        }
    }
}

/// The authenticated caller, with a recognized role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    pub id: i32,
    pub role: Role,
    pub department: Option<i32>,
}

impl Requester {
    /// Fails with `Forbidden` when the token carries a profile id outside the known roles.
    pub fn from_auth(user: &AuthUser) -> Result<Self, ApiError> {
        let role = Role::from_profile_id(user.role).ok_or_else(|| {
            tracing::warn!("User '{}' presented unrecognized role {}", user.username, user.role);
            ApiError::forbidden("User profile is not authorized")
        })?;

        Ok(Self {
            id: user.id,
            role,
            department: user.department,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn scope(&self) -> Scope {
        match (self.role, self.department) {
            (Role::Admin, _) => Scope::All,
            (Role::StandardUser, Some(department)) => Scope::Department(department),
            (Role::StandardUser, None) => Scope::Nothing,
        }
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Administrator profile required"))
        }
    }

    pub fn require_self_or_admin(&self, user_id: i32) -> Result<(), ApiError> {
        if self.is_admin() || self.id == user_id {
            Ok(())
        } else {
            Err(ApiError::forbidden("Only administrators may modify other users"))
        }
    }
}

/// `requester.role == admin OR resource.department == requester.department`
pub fn visible(resource_department: Option<i32>, requester: &Requester) -> bool {
    requester.scope().admits(resource_department)
}
