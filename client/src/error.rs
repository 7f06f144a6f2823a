use anchor_client::solana_sdk::pubkey::Pubkey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpgradeError {
    /// Derivation input that the address space cannot represent.
    #[error("invalid derivation seeds: {0}")]
    InvalidSeed(String),

    /// The managed program record does not track the program the caller
    /// expects, i.e. the index belongs to something else.
    #[error("managed program at index {index} tracks {actual}, expected {expected}")]
    StateMismatch {
        index: u32,
        expected: Pubkey,
        actual: Pubkey,
    },

    /// Every submission attempt failed. Individual attempt errors are kept
    /// for diagnostics.
    #[error("all {attempts} submission attempts failed; last error: {last}",
        last = .failures.last().map(String::as_str).unwrap_or("<none>"))]
    SubmissionExhausted {
        attempts: usize,
        failures: Vec<String>,
    },

    /// Failure at the remote read boundary, before anything was submitted.
    #[error(transparent)]
    Rpc(#[from] anyhow::Error),
}
