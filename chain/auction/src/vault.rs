//! Vault — in-memory token custody
//!
//! The [`ValueLedger`] the auction runs against in tests and simulations:
//! - Token whitelist (admin-managed)
//! - Balance tracking by (account, token) with overflow-checked arithmetic
//! - Pulls into and pushes out of a single custody account
//! - Allowances granted from custody to third parties (oracle fees)

use auction_types::ids::{AccountId, AssetId};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::errors::LedgerError;
use crate::host::ValueLedger;
use crate::security::AccessControl;

#[derive(Debug)]
pub struct Vault {
    /// Balances: account -> (token -> amount)
    balances: HashMap<AccountId, HashMap<AssetId, u128>>,
    /// Allowances out of custody: (token, spender) -> amount
    allowances: HashMap<(AssetId, AccountId), u128>,
    whitelist: HashSet<AssetId>,
    /// Account holding everything pulled in by `transfer_in`
    custody: AccountId,
    access_control: AccessControl,
}

impl Vault {
    pub fn new(admin: AccountId, custody: AccountId) -> Self {
        Self {
            balances: HashMap::new(),
            allowances: HashMap::new(),
            whitelist: HashSet::new(),
            custody,
            access_control: AccessControl::new(admin),
        }
    }

    // ───────────────────────── Token Whitelist ─────────────────────────

    /// Add a token to the whitelist. Admin-only.
    pub fn add_to_whitelist(&mut self, caller: &AccountId, token: AssetId) -> Result<(), LedgerError> {
        if !self.access_control.is_admin(caller) {
            return Err(LedgerError::Unauthorized);
        }
        self.whitelist.insert(token);
        Ok(())
    }

    pub fn is_whitelisted(&self, token: &AssetId) -> bool {
        self.whitelist.contains(token)
    }

    // ───────────────────────── Funding & Queries ─────────────────────────

    /// Credit an account from outside the system (bridge deposit, faucet).
    pub fn mint(&mut self, account: AccountId, token: &AssetId, amount: u128) -> Result<(), LedgerError> {
        self.check_token(token)?;
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        self.safe_credit(account, token, amount)
    }

    pub fn get_balance(&self, account: &AccountId, token: &AssetId) -> u128 {
        self.balances
            .get(account)
            .and_then(|tokens| tokens.get(token))
            .copied()
            .unwrap_or(0)
    }

    /// Amount of `token` held in custody.
    pub fn custody_balance(&self, token: &AssetId) -> u128 {
        self.get_balance(&self.custody, token)
    }

    pub fn allowance(&self, token: &AssetId, spender: &AccountId) -> u128 {
        self.allowances
            .get(&(token.clone(), *spender))
            .copied()
            .unwrap_or(0)
    }

    pub fn custody(&self) -> &AccountId {
        &self.custody
    }

    // ───────────────────────── Safe Transfer ─────────────────────────

    fn safe_credit(&mut self, account: AccountId, token: &AssetId, amount: u128) -> Result<(), LedgerError> {
        let current = self
            .balances
            .entry(account)
            .or_default()
            .entry(token.clone())
            .or_insert(0);
        *current = current.checked_add(amount).ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    fn safe_debit(&mut self, account: &AccountId, token: &AssetId, amount: u128) -> Result<(), LedgerError> {
        let available = self.get_balance(account, token);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                asset: token.to_string(),
                required: amount,
                available,
            });
        }
        if let Some(current) = self
            .balances
            .get_mut(account)
            .and_then(|tokens| tokens.get_mut(token))
        {
            *current -= amount;
        }
        Ok(())
    }

    /// Debit `from` and credit `to`, or change nothing.
    fn move_balance(&mut self, token: &AssetId, from: &AccountId, to: AccountId, amount: u128) -> Result<(), LedgerError> {
        self.check_token(token)?;
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        if self.get_balance(&to, token).checked_add(amount).is_none() {
            return Err(LedgerError::Overflow);
        }
        self.safe_debit(from, token, amount)?;
        self.safe_credit(to, token, amount)
    }

    fn check_token(&self, token: &AssetId) -> Result<(), LedgerError> {
        if !self.is_whitelisted(token) {
            return Err(LedgerError::TokenNotWhitelisted {
                token: token.to_string(),
            });
        }
        Ok(())
    }
}

impl ValueLedger for Vault {
    fn transfer_in(&mut self, token: &AssetId, from: &AccountId, amount: u128) -> Result<(), LedgerError> {
        let custody = self.custody;
        self.move_balance(token, from, custody, amount)?;
        debug!(%token, %from, amount, "Pulled into custody");
        Ok(())
    }

    fn transfer_out(&mut self, token: &AssetId, to: &AccountId, amount: u128) -> Result<(), LedgerError> {
        let custody = self.custody;
        self.move_balance(token, &custody, *to, amount)?;
        debug!(%token, %to, amount, "Paid out of custody");
        Ok(())
    }

    fn approve(&mut self, token: &AssetId, spender: &AccountId, amount: u128) -> Result<(), LedgerError> {
        self.check_token(token)?;
        self.allowances.insert((token.clone(), *spender), amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        vault: Vault,
        usdc: AssetId,
        user: AccountId,
    }

    fn setup() -> Fixture {
        let admin = AccountId::new();
        let mut vault = Vault::new(admin, AccountId::new());
        let usdc = AssetId::new("USDC");
        vault.add_to_whitelist(&admin, usdc.clone()).unwrap();
        let user = AccountId::new();
        vault.mint(user, &usdc, 1_000).unwrap();
        Fixture { vault, usdc, user }
    }

    #[test]
    fn test_whitelist_unauthorized() {
        let mut vault = Vault::new(AccountId::new(), AccountId::new());
        let result = vault.add_to_whitelist(&AccountId::new(), AssetId::new("USDC"));
        assert_eq!(result, Err(LedgerError::Unauthorized));
    }

    #[test]
    fn test_mint_non_whitelisted_token() {
        let mut f = setup();
        let result = f.vault.mint(f.user, &AssetId::new("SHIB"), 1);
        assert_eq!(
            result,
            Err(LedgerError::TokenNotWhitelisted {
                token: "SHIB".to_string()
            })
        );
    }

    #[test]
    fn test_transfer_in_and_out() {
        let mut f = setup();
        f.vault.transfer_in(&f.usdc, &f.user, 400).unwrap();
        assert_eq!(f.vault.get_balance(&f.user, &f.usdc), 600);
        assert_eq!(f.vault.custody_balance(&f.usdc), 400);

        f.vault.transfer_out(&f.usdc, &f.user, 150).unwrap();
        assert_eq!(f.vault.get_balance(&f.user, &f.usdc), 750);
        assert_eq!(f.vault.custody_balance(&f.usdc), 250);
    }

    #[test]
    fn test_transfer_in_insufficient_leaves_balances() {
        let mut f = setup();
        let result = f.vault.transfer_in(&f.usdc, &f.user, 1_001);
        assert!(matches!(result, Err(LedgerError::InsufficientBalance { .. })));
        assert_eq!(f.vault.get_balance(&f.user, &f.usdc), 1_000);
        assert_eq!(f.vault.custody_balance(&f.usdc), 0);
    }

    #[test]
    fn test_transfer_out_exceeding_custody() {
        let mut f = setup();
        let result = f.vault.transfer_out(&f.usdc, &f.user, 1);
        assert!(matches!(result, Err(LedgerError::InsufficientBalance { .. })));
    }

    #[test]
    fn test_zero_transfer_rejected() {
        let mut f = setup();
        assert_eq!(
            f.vault.transfer_in(&f.usdc, &f.user, 0),
            Err(LedgerError::InvalidAmount)
        );
    }

    #[test]
    fn test_credit_overflow_rejected() {
        let mut f = setup();
        let whale = AccountId::new();
        f.vault.mint(whale, &f.usdc, u128::MAX).unwrap();
        assert_eq!(f.vault.mint(whale, &f.usdc, 1), Err(LedgerError::Overflow));
        assert_eq!(f.vault.get_balance(&whale, &f.usdc), u128::MAX);
    }

    #[test]
    fn test_approve_sets_allowance() {
        let mut f = setup();
        let spender = AccountId::new();
        f.vault.approve(&f.usdc, &spender, 25).unwrap();
        assert_eq!(f.vault.allowance(&f.usdc, &spender), 25);
        f.vault.approve(&f.usdc, &spender, 5).unwrap();
        assert_eq!(f.vault.allowance(&f.usdc, &spender), 5);
    }
}
