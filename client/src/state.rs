//! Client-side view of the on-chain accounts this tool reads

use anchor_client::solana_sdk::hash;
use anchor_client::solana_sdk::pubkey::Pubkey;
use anchor_lang::error::ErrorCode;
use anchor_lang::{AccountDeserialize, AnchorDeserialize, AnchorSerialize};

/// Record tracking one governed program: the address currently deployed and
/// the monotonically increasing upgrade counter. Read-only to this client.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct ManagedProgram {
    pub managed_program_index: u32,
    pub multisig: Pubkey,
    pub program_address: Pubkey,
    pub upgrade_index: u32,
    pub name: String,
}

impl ManagedProgram {
    pub fn discriminator() -> [u8; 8] {
        let mut out = [0u8; 8];
        out.copy_from_slice(&hash::hash(b"account:ManagedProgram").to_bytes()[..8]);
        out
    }

    /// Full account image (discriminator + body), as the chain stores it.
    pub fn to_account_data(&self) -> Vec<u8> {
        let mut data = Self::discriminator().to_vec();
        self.serialize(&mut data)
            .expect("writing to a Vec never fails");
        data
    }
}

impl AccountDeserialize for ManagedProgram {
    fn try_deserialize(buf: &mut &[u8]) -> anchor_lang::Result<Self> {
        if buf.len() < 8 || buf[..8] != Self::discriminator() {
            return Err(ErrorCode::AccountDiscriminatorMismatch.into());
        }
        Self::try_deserialize_unchecked(buf)
    }

    fn try_deserialize_unchecked(buf: &mut &[u8]) -> anchor_lang::Result<Self> {
        let mut data: &[u8] = &buf[8..];
        AnchorDeserialize::deserialize(&mut data)
            .map_err(|_| ErrorCode::AccountDidNotDeserialize.into())
    }
}
