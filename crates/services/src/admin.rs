//! The administrative role and per-service halt flags.

use crate::store;
use meridian_api::state::StateAccess;
use meridian_api::TxContext;
use meridian_types::error::{AdminError, TransactionError};
use meridian_types::keys::{halt_key, SYSTEM_ADMIN_KEY};
use meridian_types::Principal;

/// Holds the single administrative principal and the halt flags gating the
/// mutating entry points of each service. Reads are never gated.
pub struct AdminRegistry;

impl AdminRegistry {
    /// Records the administrative principal at kernel construction. The
    /// first write wins; later initializations are no-ops.
    pub fn initialize(
        state: &mut dyn StateAccess,
        admin: &Principal,
    ) -> Result<(), TransactionError> {
        if state.get(SYSTEM_ADMIN_KEY)?.is_none() {
            store::put_record(state, SYSTEM_ADMIN_KEY, admin)?;
            log::info!("admin initialized to {}", admin);
        }
        Ok(())
    }

    pub fn admin(state: &dyn StateAccess) -> Result<Option<Principal>, TransactionError> {
        store::get_record(state, SYSTEM_ADMIN_KEY)
    }

    pub fn require_admin(
        state: &dyn StateAccess,
        caller: &Principal,
    ) -> Result<(), TransactionError> {
        let admin = Self::admin(state)?.ok_or(AdminError::AdminNotConfigured)?;
        if admin != *caller {
            return Err(AdminError::CallerNotAdmin.into());
        }
        Ok(())
    }

    /// Sets or clears a service's halt flag. Admin only.
    pub fn set_halted(
        state: &mut dyn StateAccess,
        ctx: &TxContext,
        service: &str,
        halted: bool,
    ) -> Result<(), TransactionError> {
        Self::require_admin(state, &ctx.caller)?;
        let key = halt_key(service);
        if halted {
            state.insert(&key, &[1u8])?;
            log::warn!("service '{}' halted by admin", service);
        } else {
            state.delete(&key)?;
            log::info!("service '{}' resumed by admin", service);
        }
        Ok(())
    }

    pub fn is_halted(state: &dyn StateAccess, service: &str) -> Result<bool, TransactionError> {
        Ok(state.get(&halt_key(service))?.is_some())
    }

    /// Gate for mutating entry points.
    pub fn ensure_active(state: &dyn StateAccess, service: &str) -> Result<(), TransactionError> {
        if Self::is_halted(state, service)? {
            return Err(AdminError::Halted(service.to_string()).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_api::state::MemoryState;
    use meridian_types::error::ErrorCode;

    #[test]
    fn only_the_admin_can_halt_and_resume() {
        let mut state = MemoryState::new();
        let admin = Principal([1u8; 20]);
        let outsider = Principal([2u8; 20]);
        AdminRegistry::initialize(&mut state, &admin).unwrap();

        let err = AdminRegistry::set_halted(
            &mut state,
            &TxContext::new(outsider, 0),
            "identity",
            true,
        )
        .unwrap_err();
        assert_eq!(err.code(), "ADMIN_CALLER_NOT_ADMIN");

        AdminRegistry::set_halted(&mut state, &TxContext::new(admin, 0), "identity", true)
            .unwrap();
        assert!(AdminRegistry::is_halted(&state, "identity").unwrap());
        let err = AdminRegistry::ensure_active(&state, "identity").unwrap_err();
        assert_eq!(err.code(), "ADMIN_HALTED");

        AdminRegistry::set_halted(&mut state, &TxContext::new(admin, 0), "identity", false)
            .unwrap();
        AdminRegistry::ensure_active(&state, "identity").unwrap();
    }

    #[test]
    fn first_initialization_wins() {
        let mut state = MemoryState::new();
        let first = Principal([1u8; 20]);
        let second = Principal([2u8; 20]);
        AdminRegistry::initialize(&mut state, &first).unwrap();
        AdminRegistry::initialize(&mut state, &second).unwrap();
        assert_eq!(AdminRegistry::admin(&state).unwrap(), Some(first));
    }
}
