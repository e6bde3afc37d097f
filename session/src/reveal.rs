//! Publishing the secret behind a commitment.

use std::sync::Arc;

use vx_oracle::{OracleClient, RetryPolicy};
use vx_store::{AuditStore, StoreError};
use vx_types::RevealPackage;

use crate::SessionError;

/// Sends a reveal to the oracle and records it, at most once per commitment.
///
/// The store is checked before the oracle is contacted, and the reveal is
/// recorded only after the oracle accepted it. A second reveal for the same
/// commitment is a [`SessionError::DoubleRevealError`] whichever side notices
/// it first.
pub struct RevealEngine {
    store: Arc<dyn AuditStore>,
    oracle: Arc<dyn OracleClient>,
    retry: RetryPolicy,
}

impl RevealEngine {
    pub fn new(store: Arc<dyn AuditStore>, oracle: Arc<dyn OracleClient>, retry: RetryPolicy) -> Self {
        Self {
            store,
            oracle,
            retry,
        }
    }

    pub async fn publish(&self, package: &RevealPackage) -> Result<(), SessionError> {
        let commitment = package.commitment;
        if self.store.reveal(&commitment)?.is_some() {
            return Err(SessionError::DoubleRevealError(commitment));
        }

        let context = package.context.as_ref().map(|c| c.encode()).transpose()?;
        let oracle = Arc::clone(&self.oracle);
        self.retry
            .run("reveal", || {
                oracle.reveal(&commitment, &package.secret, context.as_deref())
            })
            .await?;

        match self.store.record_reveal(package) {
            Ok(()) => {}
            Err(StoreError::AlreadyRevealed(c)) => return Err(SessionError::DoubleRevealError(c)),
            Err(e) => return Err(e.into()),
        }
        tracing::info!(mode = ?package.mode, "secret revealed");
        Ok(())
    }
}
