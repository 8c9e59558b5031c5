use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role carried in tokens for every authenticated user.
pub const ROLE_USER: &str = "user";
/// Role carried in tokens for superusers.
pub const ROLE_SUPERUSER: &str = "superuser";

/// User entity - an account that can own posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a freshly registered user: active, unverified, no elevated rights.
    pub fn new(email: String, hashed_password: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            hashed_password,
            is_active: true,
            is_superuser: false,
            is_verified: false,
            created_at: Utc::now(),
        }
    }

    /// Roles to embed in this user's access tokens.
    pub fn roles(&self) -> Vec<String> {
        let mut roles = vec![ROLE_USER.to_string()];
        if self.is_superuser {
            roles.push(ROLE_SUPERUSER.to_string());
        }
        roles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_flags() {
        let user = User::new("a@b.io".to_string(), "hash".to_string());
        assert!(user.is_active);
        assert!(!user.is_superuser);
        assert!(!user.is_verified);
        assert_eq!(user.roles(), vec!["user".to_string()]);
    }

    #[test]
    fn test_superuser_roles() {
        let mut user = User::new("root@b.io".to_string(), "hash".to_string());
        user.is_superuser = true;
        assert_eq!(
            user.roles(),
            vec!["user".to_string(), "superuser".to_string()]
        );
    }
}
