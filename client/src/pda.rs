//! Deterministic address derivation for the program manager hierarchy

use anchor_client::solana_sdk::pubkey::Pubkey;

use crate::error::UpgradeError;

pub const SEED_PREFIX: &[u8] = b"squad";
pub const SEED_PROGRAM_MANAGER: &[u8] = b"pmanage";
pub const SEED_MANAGED_PROGRAM: &[u8] = b"program";
pub const SEED_PROGRAM_UPGRADE: &[u8] = b"pupgrade";

/// The program manager account owned by a multisig.
pub fn program_manager_pda(
    multisig: &Pubkey,
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), UpgradeError> {
    Pubkey::try_find_program_address(
        &[SEED_PREFIX, multisig.as_ref(), SEED_PROGRAM_MANAGER],
        program_id,
    )
    .ok_or_else(|| UpgradeError::InvalidSeed(format!("program manager for multisig {}", multisig)))
}

/// The record tracking one governed program, keyed by its index under the
/// program manager.
pub fn managed_program_pda(
    program_manager: &Pubkey,
    program_index: u32,
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), UpgradeError> {
    Pubkey::try_find_program_address(
        &[
            SEED_PREFIX,
            program_manager.as_ref(),
            &program_index.to_le_bytes(),
            SEED_MANAGED_PROGRAM,
        ],
        program_id,
    )
    .ok_or_else(|| UpgradeError::InvalidSeed(format!("managed program index {}", program_index)))
}

/// The upgrade slot for a managed program at a given upgrade index.
pub fn program_upgrade_pda(
    managed_program: &Pubkey,
    upgrade_index: u32,
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), UpgradeError> {
    Pubkey::try_find_program_address(
        &[
            SEED_PREFIX,
            managed_program.as_ref(),
            &upgrade_index.to_le_bytes(),
            SEED_PROGRAM_UPGRADE,
        ],
        program_id,
    )
    .ok_or_else(|| UpgradeError::InvalidSeed(format!("upgrade index {}", upgrade_index)))
}
