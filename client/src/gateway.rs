//! Thin boundary over the cluster: one account read, blockhash, and
//! transaction submission. Everything network-bound goes through here.

use std::rc::Rc;

use anchor_client::solana_client::rpc_config::RpcSendTransactionConfig;
use anchor_client::solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use anchor_client::solana_sdk::hash::Hash;
use anchor_client::solana_sdk::pubkey::Pubkey;
use anchor_client::solana_sdk::signature::{Keypair, Signature};
use anchor_client::solana_sdk::transaction::Transaction;
use anchor_client::{Cluster, Program};
use anyhow::Result;

use crate::state::ManagedProgram;

pub trait Gateway {
    fn managed_program(&self, address: Pubkey) -> Result<ManagedProgram>;

    fn latest_blockhash(&self) -> Result<Hash>;

    /// One submission attempt. Blocks until the cluster confirms or the
    /// send fails, so callers need no extra wait between attempts.
    fn send_transaction(&self, tx: &Transaction) -> Result<Signature>;
}

pub struct RpcGateway {
    pub client: Program<Rc<Keypair>>,
    pub cluster: Cluster,
    pub commitment: CommitmentLevel,
}

impl Gateway for RpcGateway {
    fn managed_program(&self, address: Pubkey) -> Result<ManagedProgram> {
        Ok(self.client.account::<ManagedProgram>(address)?)
    }

    fn latest_blockhash(&self) -> Result<Hash> {
        Ok(self.client.rpc().get_latest_blockhash()?)
    }

    fn send_transaction(&self, tx: &Transaction) -> Result<Signature> {
        let config = RpcSendTransactionConfig {
            preflight_commitment: Some(self.commitment),
            ..RpcSendTransactionConfig::default()
        };
        let signature = self
            .client
            .rpc()
            .send_and_confirm_transaction_with_spinner_and_config(
                tx,
                CommitmentConfig {
                    commitment: self.commitment,
                },
                config,
            )?;
        Ok(signature)
    }
}
