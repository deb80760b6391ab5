//! Access control and trading state
//!
//! `AccessControl` is the in-memory [`Permissions`] collaborator: a role
//! table with one primary admin who can grant and revoke roles. Admins pass
//! every role check. `TradingState` is the engine's two-state machine.

use auction_types::ids::AccountId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::host::Permissions;

/// Roles recognised by the auction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Full system control, including role management
    Admin,
    /// Router/operator: may pause and resume trading
    Operator,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => f.write_str("admin"),
            Role::Operator => f.write_str("operator"),
        }
    }
}

/// Role-based access control table.
#[derive(Debug, Clone)]
pub struct AccessControl {
    roles: HashMap<AccountId, Role>,
    admin: AccountId,
}

impl AccessControl {
    /// Create access control with an initial admin.
    pub fn new(admin: AccountId) -> Self {
        let mut roles = HashMap::new();
        roles.insert(admin, Role::Admin);
        Self { roles, admin }
    }

    /// Check if a caller holds exactly the specified role.
    pub fn has_role(&self, caller: &AccountId, role: Role) -> bool {
        self.roles.get(caller).map_or(false, |r| *r == role)
    }

    pub fn is_admin(&self, caller: &AccountId) -> bool {
        self.has_role(caller, Role::Admin)
    }

    /// Assign a role. Only an admin can assign roles.
    pub fn grant_role(&mut self, admin_caller: &AccountId, target: AccountId, role: Role) -> bool {
        if !self.is_admin(admin_caller) {
            return false;
        }
        self.roles.insert(target, role);
        true
    }

    /// Remove a role. Only an admin can revoke, and never from the primary admin.
    pub fn revoke_role(&mut self, admin_caller: &AccountId, target: &AccountId) -> bool {
        if !self.is_admin(admin_caller) || *target == self.admin {
            return false;
        }
        self.roles.remove(target);
        true
    }
}

impl Permissions for AccessControl {
    fn is_authorized(&self, caller: &AccountId, role: Role) -> bool {
        self.is_admin(caller) || self.has_role(caller, role)
    }
}

/// Whether new orders are accepted.
///
/// While `Paused`, placements and matches are rejected; cancellations and
/// claims on existing orders still go through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TradingState {
    #[default]
    Active,
    Paused,
}

impl TradingState {
    pub fn from_paused(paused: bool) -> Self {
        if paused {
            TradingState::Paused
        } else {
            TradingState::Active
        }
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, TradingState::Paused)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_control_admin() {
        let alice = AccountId::new();
        let ac = AccessControl::new(alice);
        assert!(ac.is_admin(&alice));
        assert!(!ac.is_admin(&AccountId::new()));
    }

    #[test]
    fn test_access_control_grant_role() {
        let alice = AccountId::new();
        let bob = AccountId::new();
        let mut ac = AccessControl::new(alice);
        assert!(ac.grant_role(&alice, bob, Role::Operator));
        assert!(ac.is_authorized(&bob, Role::Operator));
        assert!(!ac.is_authorized(&bob, Role::Admin));
    }

    #[test]
    fn test_access_control_non_admin_cannot_grant() {
        let alice = AccountId::new();
        let bob = AccountId::new();
        let mut ac = AccessControl::new(alice);
        assert!(!ac.grant_role(&bob, AccountId::new(), Role::Operator));
    }

    #[test]
    fn test_access_control_revoke_role() {
        let alice = AccountId::new();
        let bob = AccountId::new();
        let mut ac = AccessControl::new(alice);
        ac.grant_role(&alice, bob, Role::Operator);
        assert!(ac.revoke_role(&alice, &bob));
        assert!(!ac.is_authorized(&bob, Role::Operator));
    }

    #[test]
    fn test_access_control_cannot_revoke_primary_admin() {
        let alice = AccountId::new();
        let mut ac = AccessControl::new(alice);
        assert!(!ac.revoke_role(&alice, &alice));
    }

    #[test]
    fn test_admin_passes_operator_check() {
        let alice = AccountId::new();
        let ac = AccessControl::new(alice);
        assert!(ac.is_authorized(&alice, Role::Operator));
    }

    #[test]
    fn test_trading_state() {
        assert_eq!(TradingState::default(), TradingState::Active);
        assert!(TradingState::from_paused(true).is_paused());
        assert!(!TradingState::from_paused(false).is_paused());
    }
}
