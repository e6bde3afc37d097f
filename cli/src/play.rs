//! `vx play`: one non-interactive session, start to reveal.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use vx_commitment::{EntropySource, OsEntropy};
use vx_oracle::{HttpOracle, LocalOracle, OracleClient};
use vx_session::{ModeKind, Session, SessionConfig, SessionError};
use vx_store::JsonlAuditStore;
use vx_types::{
    Amount, Bet, CoinSide, Crash, CrashDice, Currency, FairCoinToss, MessageContext, Multiplier,
    MultiRoulette, RevealPackage, RouletteOutcome,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Game {
    Coin,
    Dice,
    Roulette,
    Crash,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Single,
    Chain,
}

#[derive(clap::Args)]
pub struct PlayArgs {
    #[arg(value_enum)]
    pub game: Game,

    /// Rounds to play before revealing.
    #[arg(long, default_value_t = 10)]
    pub rounds: u32,

    #[arg(long, value_enum, env = "VX_MODE")]
    pub mode: Option<ModeArg>,

    /// Hashes in the chain, commitment included. Raised automatically
    /// when shorter than `rounds + 1`.
    #[arg(long, env = "VX_CHAIN_LENGTH")]
    pub chain_length: Option<u32>,

    #[arg(long, env = "VX_CLIENT_SEED")]
    pub client_seed: Option<String>,

    /// JSON-lines audit log to append to.
    #[arg(long, env = "VX_AUDIT_PATH")]
    pub audit: Option<PathBuf>,

    /// HTTP oracle base URL. Without it the in-process oracle signs.
    #[arg(long, env = "VX_ORACLE_URL")]
    pub oracle_url: Option<String>,

    /// Dice target multiplier.
    #[arg(long, default_value_t = 2.0)]
    pub target: f64,

    #[arg(long, default_value_t = 100)]
    pub house_edge_bps: u16,
}

impl PlayArgs {
    /// Fold the flags into the file/default configuration.
    pub fn apply(&self, config: &mut SessionConfig) {
        match self.mode {
            Some(ModeArg::Single) => config.mode = ModeKind::Single,
            Some(ModeArg::Chain) => config.mode = ModeKind::Chain,
            None => {}
        }
        if self.game == Game::Crash && config.mode != ModeKind::Chain {
            tracing::info!("crash is played on a hash chain, switching to chain mode");
            config.mode = ModeKind::Chain;
            config.derivation = None;
        }
        if let Some(length) = self.chain_length {
            config.chain_length = length;
        }
        if config.mode == ModeKind::Chain && config.chain_length <= self.rounds {
            config.chain_length = self.rounds + 1;
        }
        if let Some(seed) = &self.client_seed {
            config.client_seed = seed.clone();
        }
        if let Some(path) = &self.audit {
            config.audit_path = path.clone();
        }
        if let Some(url) = &self.oracle_url {
            config.oracle.url = Some(url.clone());
        }
    }

    /// The wager for round `round` (1-based).
    pub fn context(&self, round: u64) -> MessageContext {
        match self.game {
            Game::Coin => MessageContext::FairCoinToss(FairCoinToss {
                player_choice: CoinSide::from_bit((round % 2) as u8),
            }),
            Game::Dice => MessageContext::CrashDice(CrashDice {
                amount: Amount::new(Currency::Btc, 100),
                target: Multiplier::from_hundredths((self.target * 100.0).round() as u64),
                house_edge_bps: self.house_edge_bps,
            }),
            Game::Crash => MessageContext::Crash(Crash {
                house_edge_bps: self.house_edge_bps,
            }),
            Game::Roulette => MessageContext::MultiRoulette(demo_wheel()),
        }
    }
}

/// Red and green at even money, plus a rare bonus bucket.
fn demo_wheel() -> MultiRoulette {
    let bet = |uname: &str, value, currency| Bet {
        uname: uname.to_string(),
        amount: Amount::new(currency, value),
    };
    MultiRoulette {
        outcomes: vec![
            RouletteOutcome {
                probability: 0.495,
                multiplier: 2.0,
                bets: vec![bet("red-1", 23, Currency::Btc), bet("red-2", 13, Currency::Btc)],
            },
            RouletteOutcome {
                probability: 0.495,
                multiplier: 2.0,
                bets: vec![bet("green-1", 1, Currency::Tbtc)],
            },
            RouletteOutcome {
                probability: 0.01,
                multiplier: 99.0,
                bets: vec![bet("bonus-1", 14, Currency::Eth)],
            },
        ],
    }
}

fn oracle_for(config: &SessionConfig) -> anyhow::Result<Arc<dyn OracleClient>> {
    match &config.oracle.url {
        Some(url) => Ok(Arc::new(HttpOracle::with_timeout(
            url,
            Duration::from_millis(config.oracle.timeout_ms),
        ))),
        None => {
            let mut master = [0u8; 32];
            OsEntropy.fill(&mut master)?;
            Ok(Arc::new(LocalOracle::new(master)))
        }
    }
}

pub async fn run(mut config: SessionConfig, args: PlayArgs) -> anyhow::Result<()> {
    args.apply(&mut config);
    config.validate()?;

    let oracle = oracle_for(&config)?;
    let store = Arc::new(
        JsonlAuditStore::open(&config.audit_path)
            .with_context(|| format!("opening audit log {}", config.audit_path.display()))?,
    );
    let mut session = Session::start(&config, &OsEntropy, oracle, store).await?;
    tracing::info!(
        commitment = %session.commitment(),
        game = ?args.game,
        rounds = args.rounds,
        "session started"
    );

    let mut failure = None;
    for round in 1..=u64::from(args.rounds) {
        match session.play_round(args.context(round)).await {
            Ok(result) => {
                println!(
                    "{}",
                    serde_json::json!({ "round": result.key, "outcome": result.outcome })
                );
            }
            Err(e) => {
                tracing::error!(round, error = %e, "round failed");
                if !e.is_fatal() {
                    session.abandon();
                }
                failure = Some(e);
                break;
            }
        }
    }

    let revealed = session.reveal().await;
    if let Ok(package) = &revealed {
        println!("{}", serde_json::to_string(package)?);
        tracing::info!(audit = %config.audit_path.display(), "session revealed");
    }
    settle(revealed, failure)
}

/// Combine the end-of-session reveal with the round failure that stopped play,
/// if any. The round failure stays the reported error.
fn settle(
    revealed: Result<RevealPackage, SessionError>,
    failure: Option<SessionError>,
) -> anyhow::Result<()> {
    match (revealed, failure) {
        (Ok(_), None) => Ok(()),
        (Ok(_), Some(round)) => Err(round.into()),
        (Err(reveal), None) => Err(reveal.into()),
        (Err(reveal), Some(round)) => {
            tracing::error!(error = %reveal, "reveal failed after a round failure");
            Err(anyhow::Error::new(round).context(format!("reveal also failed: {reveal}")))
        }
    }
}
