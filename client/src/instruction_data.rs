//! Wire encoding for the program manager's `create_program_upgrade`
//! instruction, without pulling in the on-chain crate

use anchor_client::solana_sdk::hash;
use anchor_client::solana_sdk::instruction::{AccountMeta, Instruction};
use anchor_client::solana_sdk::pubkey::Pubkey;
use anchor_client::solana_sdk::system_program;
use anchor_lang::{AnchorDeserialize, AnchorSerialize, ToAccountMetas};

/// Anchor global-namespace instruction discriminator.
pub fn sighash(name: &str) -> [u8; 8] {
    let preimage = format!("global:{}", name);
    let mut result = [0u8; 8];
    result.copy_from_slice(&hash::hash(preimage.as_bytes()).to_bytes()[..8]);
    result
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct CreateProgramUpgrade {
    pub buffer: Pubkey,
    pub spill: Pubkey,
    pub authority: Pubkey,
    pub name: String,
}

impl CreateProgramUpgrade {
    pub fn data(&self) -> Vec<u8> {
        let mut data = sighash("create_program_upgrade").to_vec();
        self.serialize(&mut data)
            .expect("writing to a Vec never fails");
        data
    }
}

/// The exact account list the instruction accepts, in declaration order.
/// There is no remaining-accounts hook: a superset or subset cannot be
/// expressed.
pub struct CreateProgramUpgradeAccounts {
    pub creator: Pubkey,
    pub multisig: Pubkey,
    pub program_manager: Pubkey,
    pub managed_program: Pubkey,
    pub program_upgrade: Pubkey,
}

impl ToAccountMetas for CreateProgramUpgradeAccounts {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.creator, true),
            AccountMeta::new_readonly(self.multisig, false),
            AccountMeta::new_readonly(self.program_manager, false),
            AccountMeta::new(self.managed_program, false),
            AccountMeta::new(self.program_upgrade, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ]
    }
}

pub fn create_program_upgrade(
    program_id: Pubkey,
    accounts: &CreateProgramUpgradeAccounts,
    args: &CreateProgramUpgrade,
) -> Instruction {
    Instruction {
        program_id,
        accounts: accounts.to_account_metas(None),
        data: args.data(),
    }
}
