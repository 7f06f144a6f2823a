//! Assembles the upgrade proposal transaction: a compute-budget priority
//! directive followed by the program instruction.

use anchor_client::solana_sdk::compute_budget::ComputeBudgetInstruction;
use anchor_client::solana_sdk::hash::Hash;
use anchor_client::solana_sdk::instruction::Instruction;
use anchor_client::solana_sdk::pubkey::Pubkey;
use anchor_client::solana_sdk::signature::{Keypair, Signer};
use anchor_client::solana_sdk::transaction::Transaction;

use crate::instruction_data::{
    create_program_upgrade, CreateProgramUpgrade, CreateProgramUpgradeAccounts,
};

/// In-memory representation of what will be sent. Built fresh per proposal;
/// instruction order is fixed.
pub struct PendingTransaction {
    pub instructions: Vec<Instruction>,
}

impl PendingTransaction {
    /// Signs once against one recent blockhash. Retries re-submit this same
    /// transaction, so every attempt carries the same signature.
    pub fn into_signed(self, payer: &Keypair, recent_blockhash: Hash) -> Transaction {
        Transaction::new_signed_with_payer(
            &self.instructions,
            Some(&payer.pubkey()),
            &[payer],
            recent_blockhash,
        )
    }
}

pub fn build_upgrade_transaction(
    program_id: Pubkey,
    accounts: &CreateProgramUpgradeAccounts,
    args: &CreateProgramUpgrade,
    priority_micro_lamports: u64,
) -> PendingTransaction {
    let priority = ComputeBudgetInstruction::set_compute_unit_price(priority_micro_lamports);
    let upgrade = create_program_upgrade(program_id, accounts, args);
    PendingTransaction {
        instructions: vec![priority, upgrade],
    }
}
