//! `vx replay`: re-verify every revealed session in an audit log.

use std::path::PathBuf;

use anyhow::Context;
use vx_session::{audit_session, audit_store, SessionConfig};
use vx_store::{AuditStore, JsonlAuditStore};
use vx_types::PublicKey;
use vx_utils::parse_hex32;

#[derive(clap::Args)]
pub struct ReplayArgs {
    /// Audit log to read. Defaults to the configured audit path.
    #[arg(long, env = "VX_AUDIT_PATH")]
    pub audit: Option<PathBuf>,

    /// Oracle public key (hex) to check against instead of the logged one.
    #[arg(long)]
    pub pubkey: Option<String>,

    /// Only replay this commitment (hex).
    #[arg(long)]
    pub commitment: Option<String>,
}

pub fn run(config: &SessionConfig, args: ReplayArgs) -> anyhow::Result<()> {
    let path = args.audit.clone().unwrap_or_else(|| config.audit_path.clone());
    let store = JsonlAuditStore::open(&path)
        .with_context(|| format!("opening audit log {}", path.display()))?;
    let pubkey = args
        .pubkey
        .as_deref()
        .map(hex::decode)
        .transpose()
        .context("--pubkey is not hex")?
        .map(PublicKey::new);
    let only = args
        .commitment
        .as_deref()
        .map(parse_hex32)
        .transpose()
        .context("--commitment is not a 32-byte hex string")?;

    let mut verified = 0usize;
    let mut failed = 0usize;
    for commitment in store.commitments()? {
        if only.is_some_and(|c| &c != commitment.as_bytes()) {
            continue;
        }
        let Some(reveal) = store.reveal(&commitment)? else {
            tracing::warn!(commitment = %commitment, "session not revealed yet, skipping");
            continue;
        };
        let result = match &pubkey {
            Some(pk) => audit_session(&reveal, pk, &store.rounds(&commitment)?),
            None => audit_store(&store, &commitment),
        };
        match result {
            Ok(report) => {
                verified += 1;
                println!("{}", serde_json::to_string(&report)?);
            }
            Err(e) => {
                failed += 1;
                tracing::error!(commitment = %commitment, error = %e, "replay failed");
            }
        }
    }

    tracing::info!(verified, failed, "replay finished");
    if failed > 0 {
        anyhow::bail!("{failed} session(s) failed verification");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::play::{self, Game, PlayArgs};

    fn play_args(game: Game, audit: PathBuf) -> PlayArgs {
        PlayArgs {
            game,
            rounds: 4,
            mode: None,
            chain_length: None,
            client_seed: Some("replay-test".into()),
            audit: Some(audit),
            oracle_url: None,
            target: 1.5,
            house_edge_bps: 100,
        }
    }

    fn replay_args(audit: PathBuf) -> ReplayArgs {
        ReplayArgs {
            audit: Some(audit),
            pubkey: None,
            commitment: None,
        }
    }

    #[tokio::test]
    async fn played_sessions_replay_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let config = SessionConfig::default();

        play::run(config.clone(), play_args(Game::Dice, path.clone()))
            .await
            .unwrap();
        play::run(config.clone(), play_args(Game::Crash, path.clone()))
            .await
            .unwrap();

        run(&config, replay_args(path.clone())).unwrap();
        let store = JsonlAuditStore::open(&path).unwrap();
        assert_eq!(store.commitments().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn wrong_pubkey_fails_replay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let config = SessionConfig::default();
        play::run(config.clone(), play_args(Game::Coin, path.clone()))
            .await
            .unwrap();

        let mut args = replay_args(path);
        args.pubkey = Some("00".repeat(48));
        assert!(run(&config, args).is_err());
    }
}
