use std::io::ErrorKind;
use std::time::Duration;

use anchor_client::solana_sdk::commitment_config::CommitmentLevel;
use anchor_client::solana_sdk::pubkey::Pubkey;
use anchor_client::Cluster;
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde_derive::Deserialize;

use crate::submitter::RetryPolicy;

pub fn load<T: DeserializeOwned>(path: &str) -> Result<T> {
    let path = &*shellexpand::tilde(path);
    let conf_str = read_to_string(path)?;
    let config: T = toml::from_str(&conf_str)?;
    Ok(config)
}

/// Same behavior as std::fs::read_to_string, except
/// it tells you the filename when it can't be found
fn read_to_string<P>(path: P) -> std::io::Result<String>
where
    P: AsRef<std::path::Path> + std::fmt::Display + Copy,
{
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            std::io::Error::new(ErrorKind::NotFound, format!("{}: {}", e, path))
        } else {
            e
        }
    })
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "kebab-case")]
pub struct UpgradeConfig {
    pub cluster: String,

    pub wallet: String,

    /// The program manager program that owns every derived address.
    #[serde(with = "serde_with::rust::display_fromstr")]
    pub program_id: Pubkey,

    #[serde(default, with = "optional_display_fromstr")]
    pub multisig: Option<Pubkey>,

    #[serde(default)]
    pub commitment: CommitmentLevel,

    #[serde(default = "default_priority_micro_lamports")]
    pub priority_micro_lamports: u64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    #[serde(default)]
    pub retry_delay_ms: u64,
}

fn default_priority_micro_lamports() -> u64 {
    100_000
}

fn default_max_attempts() -> usize {
    crate::submitter::DEFAULT_MAX_ATTEMPTS
}

impl UpgradeConfig {
    pub fn cluster(&self) -> Cluster {
        match &*self.cluster.to_lowercase() {
            "l" | "localnet" | "localhost" => Cluster::Localnet,
            "d" | "devnet" => Cluster::Devnet,
            "m" | "mainnet" => Cluster::Mainnet,
            rpc => {
                let wss = rpc.replace("https", "wss");
                Cluster::Custom(rpc.to_owned(), wss)
            }
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

mod optional_display_fromstr {
    use super::Pubkey;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Pubkey>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Helper(#[serde(with = "serde_with::rust::display_fromstr")] Pubkey);

        let helper = Option::deserialize(deserializer)?;
        Ok(helper.map(|Helper(external)| external))
    }
}
