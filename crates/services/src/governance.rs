//! The proposal board: a minimal registry of governance proposals.

use crate::admin::AdminRegistry;
use crate::store;
use meridian_api::state::StateAccess;
use meridian_api::TxContext;
use meridian_types::error::{ProposalError, TransactionError};
use meridian_types::keys::{PROPOSAL_NEXT_ID_KEY, PROPOSAL_RECORD_PREFIX};
use meridian_types::records::Proposal;

/// Halt-flag name for this service.
pub const SERVICE_ID: &str = "proposals";

/// Records proposals with their participant counts and off-ledger voting
/// outcomes under dense sequential ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProposalBoard;

impl ProposalBoard {
    fn record_key(id: u64) -> Vec<u8> {
        [PROPOSAL_RECORD_PREFIX, &id.to_le_bytes()[..]].concat()
    }

    pub fn add_proposal(
        &self,
        state: &mut dyn StateAccess,
        ctx: &TxContext,
        total_participants: u64,
        info: &str,
        result: &str,
    ) -> Result<u64, TransactionError> {
        AdminRegistry::ensure_active(state, SERVICE_ID)?;

        if total_participants == 0 {
            return Err(ProposalError::ZeroParticipants.into());
        }
        if info.is_empty() {
            return Err(ProposalError::EmptyProposalInfo.into());
        }

        let id = store::get_u64(state, PROPOSAL_NEXT_ID_KEY)?.max(1);
        store::put_u64(state, PROPOSAL_NEXT_ID_KEY, id + 1)?;

        let proposal = Proposal {
            id,
            total_participants,
            info: info.to_string(),
            result: result.to_string(),
        };
        store::put_record(state, &Self::record_key(id), &proposal)?;

        log::debug!("proposal {} recorded by {}", id, ctx.caller);
        Ok(id)
    }

    pub fn proposal(state: &dyn StateAccess, id: u64) -> Result<Proposal, TransactionError> {
        store::get_record(state, &Self::record_key(id))?
            .ok_or_else(|| ProposalError::UnknownProposal(id).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_api::state::MemoryState;
    use meridian_types::error::ErrorCode;
    use meridian_types::Principal;

    #[test]
    fn proposals_get_dense_ids() {
        let mut state = MemoryState::new();
        let board = ProposalBoard;
        let ctx = TxContext::new(Principal([1u8; 20]), 0);

        let a = board
            .add_proposal(&mut state, &ctx, 100, "This is a proposal", "Passed")
            .unwrap();
        let b = board
            .add_proposal(&mut state, &ctx, 10, "Another proposal", "")
            .unwrap();
        assert_eq!((a, b), (1, 2));
        assert_eq!(
            ProposalBoard::proposal(&state, 1).unwrap().info,
            "This is a proposal"
        );
    }

    #[test]
    fn guards_reject_empty_input() {
        let mut state = MemoryState::new();
        let board = ProposalBoard;
        let ctx = TxContext::new(Principal([1u8; 20]), 0);

        let err = board
            .add_proposal(&mut state, &ctx, 0, "info", "")
            .unwrap_err();
        assert_eq!(err.code(), "PROPOSAL_ZERO_PARTICIPANTS");

        let err = board.add_proposal(&mut state, &ctx, 10, "", "").unwrap_err();
        assert_eq!(err.code(), "PROPOSAL_EMPTY_INFO");

        let err = ProposalBoard::proposal(&state, 5).unwrap_err();
        assert_eq!(err.code(), "PROPOSAL_UNKNOWN");
    }
}
