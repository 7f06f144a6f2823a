//! The upgrade proposal pipeline: derive, validate, build, submit

use anchor_client::solana_sdk::pubkey::Pubkey;
use anchor_client::solana_sdk::signature::{Keypair, Signature, Signer};
use log::info;

use crate::error::UpgradeError;
use crate::gateway::Gateway;
use crate::instruction_data::{CreateProgramUpgrade, CreateProgramUpgradeAccounts};
use crate::pda;
use crate::request_builder::build_upgrade_transaction;
use crate::state::ManagedProgram;
use crate::submitter::{submit_with_retry, RetryPolicy};

/// Caller-supplied inputs for one upgrade proposal.
pub struct UpgradeProposal {
    pub multisig: Pubkey,
    /// The program the caller believes `program_index` tracks.
    pub program: Pubkey,
    pub program_index: u32,
    pub buffer: Pubkey,
    pub spill: Pubkey,
    pub authority: Pubkey,
    pub name: String,
}

pub struct UpgradeService<G> {
    pub gateway: G,
    pub program_id: Pubkey,
    pub priority_micro_lamports: u64,
    pub retry: RetryPolicy,
}

impl<G: Gateway> UpgradeService<G> {
    /// Proposes an upgrade for the managed program at
    /// `proposal.program_index`. The managed-program record is read and
    /// checked against `proposal.program` before anything is built; a
    /// mismatch means the index does not belong to the program the caller
    /// thinks it does, and nothing is submitted.
    pub fn propose_program_upgrade(
        &self,
        payer: &Keypair,
        proposal: &UpgradeProposal,
    ) -> Result<Signature, UpgradeError> {
        let (program_manager, _) = pda::program_manager_pda(&proposal.multisig, &self.program_id)?;
        let (managed_program, _) =
            pda::managed_program_pda(&program_manager, proposal.program_index, &self.program_id)?;
        info!("program manager pda: {}", program_manager);
        info!(
            "managed program pda: {} (program index {})",
            managed_program, proposal.program_index
        );

        let upgrade_index = self.validate_managed_program(managed_program, proposal)?;

        // The next-index PDA doubles as an optimistic lock: if another
        // proposal lands first, the record's counter moves past us and the
        // on-chain init of this exact address fails instead of clobbering.
        let next_index = upgrade_index.checked_add(1).ok_or_else(|| {
            UpgradeError::InvalidSeed(format!(
                "upgrade index {} cannot advance any further",
                upgrade_index
            ))
        })?;
        let (program_upgrade, _) =
            pda::program_upgrade_pda(&managed_program, next_index, &self.program_id)?;
        info!(
            "program upgrade pda: {} (upgrade index {})",
            program_upgrade, next_index
        );

        let pending = build_upgrade_transaction(
            self.program_id,
            &CreateProgramUpgradeAccounts {
                creator: payer.pubkey(),
                multisig: proposal.multisig,
                program_manager,
                managed_program,
                program_upgrade,
            },
            &CreateProgramUpgrade {
                buffer: proposal.buffer,
                spill: proposal.spill,
                authority: proposal.authority,
                name: proposal.name.clone(),
            },
            self.priority_micro_lamports,
        );

        let recent_blockhash = self.gateway.latest_blockhash()?;
        let tx = pending.into_signed(payer, recent_blockhash);
        let signature = submit_with_retry(&self.gateway, &tx, &self.retry)?;
        info!(
            "created program upgrade for multisig {}: https://explorer.solana.com/tx/{}",
            proposal.multisig, signature
        );
        Ok(signature)
    }

    /// Derives and fetches the managed-program record at an index.
    pub fn managed_program(
        &self,
        multisig: Pubkey,
        program_index: u32,
    ) -> Result<(Pubkey, ManagedProgram), UpgradeError> {
        let (program_manager, _) = pda::program_manager_pda(&multisig, &self.program_id)?;
        let (address, _) =
            pda::managed_program_pda(&program_manager, program_index, &self.program_id)?;
        let record = self.gateway.managed_program(address)?;
        Ok((address, record))
    }

    fn validate_managed_program(
        &self,
        address: Pubkey,
        proposal: &UpgradeProposal,
    ) -> Result<u32, UpgradeError> {
        let record = self.gateway.managed_program(address)?;
        if record.program_address != proposal.program {
            return Err(UpgradeError::StateMismatch {
                index: proposal.program_index,
                expected: proposal.program,
                actual: record.program_address,
            });
        }
        Ok(record.upgrade_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::mock::MockGateway;
    use crate::submitter::DEFAULT_MAX_ATTEMPTS;

    struct Fixture {
        program_id: Pubkey,
        multisig: Pubkey,
        program: Pubkey,
        payer: Keypair,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                program_id: Pubkey::new_unique(),
                multisig: Pubkey::new_unique(),
                program: Pubkey::new_unique(),
                payer: Keypair::new(),
            }
        }

        fn record(&self, upgrade_index: u32) -> ManagedProgram {
            ManagedProgram {
                managed_program_index: 3,
                multisig: self.multisig,
                program_address: self.program,
                upgrade_index,
                name: "governed".to_string(),
            }
        }

        fn proposal(&self) -> UpgradeProposal {
            UpgradeProposal {
                multisig: self.multisig,
                program: self.program,
                program_index: 3,
                buffer: Pubkey::new_unique(),
                spill: Pubkey::new_unique(),
                authority: Pubkey::new_unique(),
                name: "governed".to_string(),
            }
        }

        fn service(&self, gateway: MockGateway) -> UpgradeService<MockGateway> {
            UpgradeService {
                gateway,
                program_id: self.program_id,
                priority_micro_lamports: 100_000,
                retry: RetryPolicy::default(),
            }
        }
    }

    #[test]
    fn proposes_upgrade_at_the_next_revision() {
        let fixture = Fixture::new();
        let signature = Signature::new_unique();
        let service = fixture.service(
            MockGateway::with_record(fixture.record(3)).script_sends(vec![Ok(signature)]),
        );

        let got = service
            .propose_program_upgrade(&fixture.payer, &fixture.proposal())
            .unwrap();
        assert_eq!(got, signature);
        assert_eq!(service.gateway.reads.get(), 1);
        assert_eq!(service.gateway.sends.get(), 1);

        // Revision 3 on chain means the upgrade account is derived at 4.
        let (program_manager, _) =
            pda::program_manager_pda(&fixture.multisig, &fixture.program_id).unwrap();
        let (managed_program, _) =
            pda::managed_program_pda(&program_manager, 3, &fixture.program_id).unwrap();
        let (expected_upgrade, _) =
            pda::program_upgrade_pda(&managed_program, 4, &fixture.program_id).unwrap();

        let tx = service.gateway.last_tx.borrow().clone().unwrap();
        assert!(tx.message.account_keys.contains(&expected_upgrade));
    }

    #[test]
    fn mismatched_index_fails_before_any_submission() {
        let fixture = Fixture::new();
        let mut record = fixture.record(3);
        record.program_address = Pubkey::new_unique();
        let service = fixture.service(MockGateway::with_record(record.clone()));

        let err = service
            .propose_program_upgrade(&fixture.payer, &fixture.proposal())
            .unwrap_err();
        match err {
            UpgradeError::StateMismatch {
                index,
                expected,
                actual,
            } => {
                assert_eq!(index, 3);
                assert_eq!(expected, fixture.program);
                assert_eq!(actual, record.program_address);
            }
            other => panic!("expected StateMismatch, got {:?}", other),
        }
        assert_eq!(service.gateway.sends.get(), 0);
        assert!(service.gateway.last_tx.borrow().is_none());
    }

    #[test]
    fn recovers_on_the_final_attempt() {
        let fixture = Fixture::new();
        let signature = Signature::new_unique();
        let service = fixture.service(
            MockGateway::with_record(fixture.record(0)).script_sends(vec![
                Err("attempt 1".to_string()),
                Err("attempt 2".to_string()),
                Err("attempt 3".to_string()),
                Err("attempt 4".to_string()),
                Ok(signature),
            ]),
        );

        let got = service
            .propose_program_upgrade(&fixture.payer, &fixture.proposal())
            .unwrap();
        assert_eq!(got, signature);
        assert_eq!(service.gateway.sends.get(), DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn exhausted_submissions_surface_as_terminal_error() {
        let fixture = Fixture::new();
        let service = fixture.service(MockGateway::with_record(fixture.record(7)));

        let err = service
            .propose_program_upgrade(&fixture.payer, &fixture.proposal())
            .unwrap_err();
        assert!(matches!(
            err,
            UpgradeError::SubmissionExhausted { attempts: 5, .. }
        ));
        assert_eq!(service.gateway.sends.get(), DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn saturated_upgrade_counter_cannot_advance() {
        let fixture = Fixture::new();
        let service = fixture.service(MockGateway::with_record(fixture.record(u32::MAX)));

        let err = service
            .propose_program_upgrade(&fixture.payer, &fixture.proposal())
            .unwrap_err();
        assert!(matches!(err, UpgradeError::InvalidSeed(_)));
        assert_eq!(service.gateway.sends.get(), 0);
        assert!(service.gateway.last_tx.borrow().is_none());
    }

    #[test]
    fn missing_record_is_a_read_failure_not_a_mismatch() {
        let fixture = Fixture::new();
        let service = fixture.service(MockGateway::default());

        let err = service
            .propose_program_upgrade(&fixture.payer, &fixture.proposal())
            .unwrap_err();
        assert!(matches!(err, UpgradeError::Rpc(_)));
        assert_eq!(service.gateway.sends.get(), 0);
    }

    #[test]
    fn managed_program_lookup_returns_record_and_address() {
        let fixture = Fixture::new();
        let service = fixture.service(MockGateway::with_record(fixture.record(9)));

        let (address, record) = service.managed_program(fixture.multisig, 3).unwrap();
        let (program_manager, _) =
            pda::program_manager_pda(&fixture.multisig, &fixture.program_id).unwrap();
        let (expected, _) =
            pda::managed_program_pda(&program_manager, 3, &fixture.program_id).unwrap();
        assert_eq!(address, expected);
        assert_eq!(record.upgrade_index, 9);
    }
}
