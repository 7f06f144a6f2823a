//! Bounded retry around transaction submission

use std::thread;
use std::time::Duration;

use anchor_client::solana_sdk::signature::Signature;
use anchor_client::solana_sdk::transaction::Transaction;
use log::{info, warn};

use crate::error::UpgradeError;
use crate::gateway::Gateway;

pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    /// Pause between attempts. Zero by default: the send itself blocks on
    /// confirmation, which is spacing enough.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: Duration::ZERO,
        }
    }
}

/// Re-submits the same signed transaction until one attempt confirms or the
/// policy is exhausted. Attempt failures are logged and collected into the
/// terminal error; they never abort the loop early.
pub fn submit_with_retry<G: Gateway>(
    gateway: &G,
    tx: &Transaction,
    policy: &RetryPolicy,
) -> Result<Signature, UpgradeError> {
    let mut failures = Vec::with_capacity(policy.max_attempts);
    for attempt in 1..=policy.max_attempts {
        match gateway.send_transaction(tx) {
            Ok(signature) => {
                info!("submission attempt {} confirmed: {}", attempt, signature);
                return Ok(signature);
            }
            Err(err) => {
                warn!(
                    "submission attempt {} of {} failed: {:#}",
                    attempt, policy.max_attempts, err
                );
                failures.push(err.to_string());
                if attempt < policy.max_attempts && !policy.delay.is_zero() {
                    thread::sleep(policy.delay);
                }
            }
        }
    }
    Err(UpgradeError::SubmissionExhausted {
        attempts: policy.max_attempts,
        failures,
    })
}

#[cfg(test)]
mod tests {
    use anchor_client::solana_sdk::hash::Hash;
    use anchor_client::solana_sdk::pubkey::Pubkey;
    use anchor_client::solana_sdk::signature::{Keypair, Signer};
    use anchor_client::solana_sdk::system_instruction;

    use super::*;
    use crate::gateway::mock::MockGateway;

    fn any_tx() -> Transaction {
        let payer = Keypair::new();
        let ix = system_instruction::transfer(&payer.pubkey(), &Pubkey::new_unique(), 1);
        Transaction::new_signed_with_payer(
            &[ix],
            Some(&payer.pubkey()),
            &[&payer],
            Hash::new_unique(),
        )
    }

    #[test]
    fn returns_on_first_success() {
        let signature = Signature::new_unique();
        let gateway = MockGateway::default().script_sends(vec![Ok(signature)]);

        let got = submit_with_retry(&gateway, &any_tx(), &RetryPolicy::default()).unwrap();
        assert_eq!(got, signature);
        assert_eq!(gateway.sends.get(), 1);
    }

    #[test]
    fn keeps_trying_until_the_last_attempt() {
        let signature = Signature::new_unique();
        let gateway = MockGateway::default().script_sends(vec![
            Err("blockhash not found".to_string()),
            Err("node is behind".to_string()),
            Err("connection reset".to_string()),
            Err("timed out".to_string()),
            Ok(signature),
        ]);

        let got = submit_with_retry(&gateway, &any_tx(), &RetryPolicy::default()).unwrap();
        assert_eq!(got, signature);
        assert_eq!(gateway.sends.get(), 5);
    }

    #[test]
    fn exhaustion_reports_every_attempt() {
        let gateway = MockGateway::default()
            .script_sends((0..5).map(|i| Err(format!("attempt {} down", i + 1))).collect());

        let err = submit_with_retry(&gateway, &any_tx(), &RetryPolicy::default()).unwrap_err();
        assert_eq!(gateway.sends.get(), 5);
        match err {
            UpgradeError::SubmissionExhausted { attempts, failures } => {
                assert_eq!(attempts, 5);
                assert_eq!(failures.len(), 5);
                assert_eq!(failures[0], "attempt 1 down");
                assert_eq!(failures[4], "attempt 5 down");
            }
            other => panic!("expected SubmissionExhausted, got {:?}", other),
        }
    }

    #[test]
    fn never_exceeds_the_attempt_bound() {
        let gateway = MockGateway::default();

        let err = submit_with_retry(
            &gateway,
            &any_tx(),
            &RetryPolicy {
                max_attempts: 3,
                delay: Duration::ZERO,
            },
        )
        .unwrap_err();
        assert_eq!(gateway.sends.get(), 3);
        assert!(matches!(
            err,
            UpgradeError::SubmissionExhausted { attempts: 3, .. }
        ));
    }
}
