//! One account per role, so the permission gate can be exercised locally.

use db::models::user::{Role, UpsertUser, User};
use tracing::info;

use super::store::{CrmBackend, StoreError};

pub const DEMO_USERS: [(&str, Role); 2] = [
    ("viewtest1@example.com", Role::Viewer),
    ("saletest1@example.com", Role::Saler),
];

/// Creates the demo accounts, or resets their roles if they already exist.
pub async fn ensure_demo_users<B: CrmBackend + ?Sized>(
    backend: &B,
) -> Result<Vec<User>, StoreError> {
    let mut users = Vec::with_capacity(DEMO_USERS.len());
    for (email, role) in DEMO_USERS {
        let user = backend
            .upsert_user(UpsertUser {
                email: email.to_string(),
                full_name: None,
                role: Some(role),
            })
            .await?;
        info!(id = %user.id, email = %user.email, %role, "Demo user ready");
        users.push(user);
    }
    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::MemoryStore;

    #[tokio::test]
    async fn demo_users_cover_both_roles_and_are_idempotent() {
        let store = MemoryStore::new();

        let first = ensure_demo_users(&store).await.unwrap();
        let roles: Vec<Role> = first.iter().map(User::effective_role).collect();
        assert_eq!(roles, [Role::Viewer, Role::Saler]);

        let second = ensure_demo_users(&store).await.unwrap();
        let ids = |users: &[User]| users.iter().map(|u| u.id).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));

        let saler = store.find_user(first[1].id).await.unwrap().unwrap();
        assert_eq!(saler.email, "saletest1@example.com");
    }
}
