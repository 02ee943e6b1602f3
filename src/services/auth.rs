//! Authorization service implementation
//!
//! Single authorization capability consulted by every staff/admin-gated
//! entry point. The static admin allowlist from configuration is
//! authoritative for admin-ness and overrides any persisted role; the
//! persisted role decides the staff/user distinction.

use tracing::{debug, warn};
use crate::config::settings::Settings;
use crate::database::repositories::UserRepository;
use crate::models::user::UserRole;
use crate::utils::errors::{DeskGenieError, Result};

#[derive(Debug, Clone)]
pub struct AuthService {
    users: UserRepository,
    settings: Settings,
}

impl AuthService {
    pub fn new(users: UserRepository, settings: Settings) -> Self {
        Self { users, settings }
    }

    /// Check the static allowlist. Pure configuration data, no store access.
    pub fn is_allowlisted_admin(&self, telegram_id: i64) -> bool {
        self.settings.bot.admin_ids.contains(&telegram_id)
    }

    /// Effective role of a user. Allowlisted ids always resolve to admin,
    /// even when the persisted role was downgraded.
    pub async fn role_of(&self, telegram_id: i64) -> Result<UserRole> {
        let stored = self
            .users
            .find_by_telegram_id(telegram_id)
            .await?
            .map(|u| u.role);

        let role = Self::resolve_role(self.is_allowlisted_admin(telegram_id), stored);
        debug!(user_id = telegram_id, role = %role, "Resolved effective role");
        Ok(role)
    }

    /// Role resolution rule, kept pure for testability.
    pub fn resolve_role(allowlisted: bool, stored: Option<UserRole>) -> UserRole {
        if allowlisted {
            UserRole::Admin
        } else {
            stored.unwrap_or(UserRole::User)
        }
    }

    /// Whether `actor` holds at least the required role.
    pub async fn authorize(&self, actor_id: i64, required: UserRole) -> Result<bool> {
        let role = self.role_of(actor_id).await?;
        Ok(Self::role_rank(role) >= Self::role_rank(required))
    }

    /// Require at least the given role or fail with `PermissionDenied`.
    pub async fn require(&self, actor_id: i64, required: UserRole) -> Result<UserRole> {
        let role = self.role_of(actor_id).await?;
        if Self::role_rank(role) < Self::role_rank(required) {
            warn!(user_id = actor_id, role = %role, required = %required, "Authorization denied");
            return Err(DeskGenieError::PermissionDenied(format!(
                "User {} has role {} but {} is required",
                actor_id, role, required
            )));
        }
        Ok(role)
    }

    fn role_rank(role: UserRole) -> u8 {
        match role {
            UserRole::User => 0,
            UserRole::Staff => 1,
            UserRole::Admin => 2,
        }
    }

    /// Everyone who should hear about administrative events: the static
    /// allowlist plus users holding a persisted admin role.
    pub async fn admin_notification_targets(&self) -> Result<Vec<i64>> {
        let mut targets = self.settings.bot.admin_ids.clone();
        for id in self.users.list_admin_ids().await? {
            if !targets.contains(&id) {
                targets.push(id);
            }
        }
        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowlist_overrides_stored_role() {
        // Downgraded in the store, still admin by configuration.
        assert_eq!(
            AuthService::resolve_role(true, Some(UserRole::User)),
            UserRole::Admin
        );
        assert_eq!(AuthService::resolve_role(true, None), UserRole::Admin);
    }

    #[test]
    fn test_stored_role_when_not_allowlisted() {
        assert_eq!(
            AuthService::resolve_role(false, Some(UserRole::Staff)),
            UserRole::Staff
        );
        assert_eq!(AuthService::resolve_role(false, None), UserRole::User);
    }

    #[test]
    fn test_role_ranks() {
        assert!(AuthService::role_rank(UserRole::Admin) > AuthService::role_rank(UserRole::Staff));
        assert!(AuthService::role_rank(UserRole::Staff) > AuthService::role_rank(UserRole::User));
    }
}
