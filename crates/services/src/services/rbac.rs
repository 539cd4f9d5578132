//! Two-tier role-based access control.

use db::models::user::Role;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    View,
    Create,
    Update,
    Delete,
}

/// Viewers may only view, salers may do anything, callers without a role
/// may do nothing.
pub fn check_permission(role: Option<Role>, action: Action) -> bool {
    match role {
        None => false,
        Some(Role::Viewer) => action == Action::View,
        Some(Role::Saler) => true,
    }
}

pub fn has_minimum_role(role: Option<Role>, minimum: Role) -> bool {
    role.is_some_and(|role| role >= minimum)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct Capabilities {
    pub view: bool,
    pub create: bool,
    pub update: bool,
    pub delete: bool,
}

/// What a role is allowed to do, in the shape the frontend's RBAC context
/// consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    pub role: Option<Role>,
    pub is_viewer: bool,
    pub is_saler: bool,
    pub can: Capabilities,
}

impl Permissions {
    pub fn for_role(role: Option<Role>) -> Self {
        Self {
            role,
            is_viewer: role == Some(Role::Viewer),
            is_saler: role == Some(Role::Saler),
            can: Capabilities {
                view: check_permission(role, Action::View),
                create: check_permission(role, Action::Create),
                update: check_permission(role, Action::Update),
                delete: check_permission(role, Action::Delete),
            },
        }
    }
}

/// How the API applies the permission check to incoming requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RbacPolicy {
    /// Check every request against the caller's role.
    pub enforce: bool,
    /// Skip the check even when `enforce` is set.
    pub bypass: bool,
    /// Treat every caller as a saler.
    pub force_saler: bool,
}

impl RbacPolicy {
    pub fn enforced() -> Self {
        Self {
            enforce: true,
            ..Self::default()
        }
    }

    pub fn is_active(&self) -> bool {
        self.enforce && !self.bypass
    }

    pub fn effective_role(&self, resolved: Option<Role>) -> Option<Role> {
        if self.force_saler {
            Some(Role::Saler)
        } else {
            resolved
        }
    }

    pub fn allows(&self, resolved: Option<Role>, action: Action) -> bool {
        !self.is_active() || check_permission(self.effective_role(resolved), action)
    }
}
