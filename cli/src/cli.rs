use anchor_client::solana_sdk::pubkey::Pubkey;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
pub struct Opts {
    #[arg(short, long, default_value = "~/.config/program-manager.toml")]
    pub config: String,

    #[command(subcommand)]
    pub job: Job,
}

#[derive(Subcommand)]
pub enum Job {
    /// Propose an upgrade for a managed program
    ProposeUpgrade(ProposeUpgrade),
    /// Fetch and print a managed program record
    GetManagedProgram(ManagedProgramKey),
}

#[derive(Args)]
pub struct ProposeUpgrade {
    /// Program the managed-program index is expected to track
    pub program: Pubkey,
    pub program_index: u32,
    /// Buffer account holding the new program data
    pub buffer: Pubkey,
    /// Account refunded with the old program data rent
    pub spill: Pubkey,
    /// Upgrade authority of the target program
    pub authority: Pubkey,
    pub name: String,

    #[arg(long)]
    pub multisig: Option<Pubkey>,
}

#[derive(Args)]
pub struct ManagedProgramKey {
    pub program_index: u32,

    #[arg(long)]
    pub multisig: Option<Pubkey>,
}
