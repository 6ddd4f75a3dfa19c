//! State-backed bookkeeping for the fungible settlement asset.

use crate::store;
use meridian_api::state::StateAccess;
use meridian_api::token::SettlementLedger;
use meridian_types::error::{TokenError, TransactionError};
use meridian_types::keys::TOKEN_BALANCE_PREFIX;
use meridian_types::Principal;

/// The reference [`SettlementLedger`]: plain per-account balances in the
/// state store. Embedders with an external asset can substitute their own
/// implementation behind the same capability interface.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettlementVault;

impl SettlementVault {
    fn balance_key(who: &Principal) -> Vec<u8> {
        [TOKEN_BALANCE_PREFIX, who.as_ref()].concat()
    }
}

impl SettlementLedger for SettlementVault {
    fn balance_of(
        &self,
        state: &dyn StateAccess,
        who: &Principal,
    ) -> Result<u128, TransactionError> {
        store::get_u128(state, &Self::balance_key(who))
    }

    fn mint(
        &self,
        state: &mut dyn StateAccess,
        to: &Principal,
        amount: u128,
    ) -> Result<(), TransactionError> {
        let balance = self.balance_of(state, to)?;
        let updated = balance
            .checked_add(amount)
            .ok_or(TokenError::BalanceOverflow)?;
        store::put_u128(state, &Self::balance_key(to), updated)
    }

    fn transfer(
        &self,
        state: &mut dyn StateAccess,
        from: &Principal,
        to: &Principal,
        amount: u128,
    ) -> Result<(), TransactionError> {
        let from_balance = self.balance_of(state, from)?;
        if from_balance < amount {
            return Err(TokenError::InsufficientBalance.into());
        }
        let to_balance = self.balance_of(state, to)?;
        let credited = to_balance
            .checked_add(amount)
            .ok_or(TokenError::BalanceOverflow)?;

        store::put_u128(state, &Self::balance_key(from), from_balance - amount)?;
        store::put_u128(state, &Self::balance_key(to), credited)
    }
}
