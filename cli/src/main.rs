use std::rc::Rc;

use anchor_client::solana_sdk::pubkey::Pubkey;
use anchor_client::solana_sdk::signature::Keypair;
use anyhow::{Context, Result};
use clap::Parser;
use program_manager_client::config::{self, UpgradeConfig};
use program_manager_client::gateway::RpcGateway;
use program_manager_client::service::{UpgradeProposal, UpgradeService};

use cli::{Job, Opts};

mod cli;

fn main() -> Result<()> {
    solana_logger::setup_with_default("solana=info,program_manager_client=info");
    let cli_opts = Opts::parse();
    let multisig_config: UpgradeConfig = config::load(&cli_opts.config)?;
    let payer = Rc::new(program_manager_client::load_payer(&multisig_config.wallet)?);
    let service = program_manager_client::load_service(payer.clone(), &multisig_config)?;
    run_job(cli_opts.job, &service, &payer, &multisig_config)
}

fn run_job(
    job: Job,
    service: &UpgradeService<RpcGateway>,
    payer: &Keypair,
    config: &UpgradeConfig,
) -> Result<()> {
    match job {
        Job::ProposeUpgrade(cmd) => {
            let multisig = resolve_multisig(cmd.multisig, config)?;
            let signature = service.propose_program_upgrade(
                payer,
                &UpgradeProposal {
                    multisig,
                    program: cmd.program,
                    program_index: cmd.program_index,
                    buffer: cmd.buffer,
                    spill: cmd.spill,
                    authority: cmd.authority,
                    name: cmd.name,
                },
            )?;
            println!("{}", signature);
            println!("https://explorer.solana.com/tx/{}", signature);
        }
        Job::GetManagedProgram(cmd) => {
            let multisig = resolve_multisig(cmd.multisig, config)?;
            let (address, record) = service.managed_program(multisig, cmd.program_index)?;
            println!("{}", address);
            println!("{:#?}", record);
        }
    }
    Ok(())
}

fn resolve_multisig(arg: Option<Pubkey>, config: &UpgradeConfig) -> Result<Pubkey> {
    arg.or(config.multisig)
        .context("no multisig given on the command line or in the config")
}
