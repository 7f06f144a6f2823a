pub mod config;
pub mod error;
pub mod gateway;
pub mod instruction_data;
pub mod pda;
pub mod request_builder;
pub mod service;
pub mod state;
pub mod submitter;

use std::rc::Rc;

use anchor_client::solana_sdk::commitment_config::CommitmentConfig;
use anchor_client::solana_sdk::signature::{read_keypair_file, Keypair};
use anchor_client::Client;
use anyhow::{anyhow, Result};

use config::UpgradeConfig;
use gateway::RpcGateway;
use service::UpgradeService;

pub fn load_payer(path: &str) -> Result<Keypair> {
    let path = &*shellexpand::tilde(path);
    read_keypair_file(path).map_err(|e| anyhow!("could not read keypair at {}: {}", path, e))
}

pub fn load_service(
    payer: Rc<Keypair>,
    config: &UpgradeConfig,
) -> Result<UpgradeService<RpcGateway>> {
    let cluster = config.cluster();
    let connection = Client::new_with_options(
        cluster.clone(),
        payer,
        CommitmentConfig {
            commitment: config.commitment,
        },
    );
    let client = connection.program(config.program_id)?;

    Ok(UpgradeService {
        gateway: RpcGateway {
            client,
            cluster,
            commitment: config.commitment,
        },
        program_id: config.program_id,
        priority_micro_lamports: config.priority_micro_lamports,
        retry: config.retry_policy(),
    })
}
