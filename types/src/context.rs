//! Game-context records signed alongside every oracle request.
//!
//! The protocol core treats a context as opaque bytes that are included
//! verbatim in what gets signed and logged. Inside this workspace each context
//! is a closed tagged enum, one case per game family, so decoding is exhaustive
//! and a new game cannot silently fall through to a default decoder.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{Amount, ContextError, Multiplier};

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ContextError> {
    serde_json::to_vec(value).map_err(|e| ContextError::Encode(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ContextError> {
    serde_json::from_slice(bytes).map_err(|e| ContextError::Decode(e.to_string()))
}

// ── Commitment ─────────────────────────────────────────────────────────

/// How the commitment registered with the oracle was built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommitmentContext {
    /// `commitment = SHA256(seed)`.
    Sha256Commitment {},
    /// `commitment` is the terminal hash of a SHA-256 chain.
    Sha256Chain {},
}

impl CommitmentContext {
    pub fn encode(&self) -> Result<Vec<u8>, ContextError> {
        encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ContextError> {
        decode(bytes)
    }
}

// ── Reveal ─────────────────────────────────────────────────────────────

/// Extra data published with the secret so a verifier can rebuild every
/// contribution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RevealContext {
    /// Contributions were `HMAC-SHA256(seed, "{player_seed}:{round}[:{move}]")`.
    #[serde(rename_all = "camelCase")]
    StandardDerivation { player_seed: String },
    /// Messages were the chain links, each followed by the player seed bytes.
    #[serde(rename_all = "camelCase")]
    ChainDerivation { player_seed: String },
}

impl RevealContext {
    pub fn player_seed(&self) -> &str {
        match self {
            RevealContext::StandardDerivation { player_seed }
            | RevealContext::ChainDerivation { player_seed } => player_seed,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, ContextError> {
        encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ContextError> {
        decode(bytes)
    }
}

// ── Messages ───────────────────────────────────────────────────────────

/// Game family tag, used for logging and for replay dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameFamily {
    CoinToss,
    CrashDice,
    Crash,
    HiLo,
    Mines,
    Tower,
    MultiRoulette,
}

impl GameFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameFamily::CoinToss => "coin-toss",
            GameFamily::CrashDice => "crash-dice",
            GameFamily::Crash => "crash",
            GameFamily::HiLo => "hilo",
            GameFamily::Mines => "mines",
            GameFamily::Tower => "tower",
            GameFamily::MultiRoulette => "multi-roulette",
        }
    }
}

/// Wager parameters for one oracle request, one case per game family.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageContext {
    FairCoinToss(FairCoinToss),
    CrashDice(CrashDice),
    Crash(Crash),
    #[serde(rename = "hilo")]
    HiLo(HiLo),
    Mines(Mines),
    Tower(Tower),
    MultiRoulette(MultiRoulette),
}

impl MessageContext {
    pub fn family(&self) -> GameFamily {
        match self {
            MessageContext::FairCoinToss(_) => GameFamily::CoinToss,
            MessageContext::CrashDice(_) => GameFamily::CrashDice,
            MessageContext::Crash(_) => GameFamily::Crash,
            MessageContext::HiLo(_) => GameFamily::HiLo,
            MessageContext::Mines(_) => GameFamily::Mines,
            MessageContext::Tower(_) => GameFamily::Tower,
            MessageContext::MultiRoulette(_) => GameFamily::MultiRoulette,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, ContextError> {
        encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ContextError> {
        decode(bytes)
    }
}

/// Side of a fair coin. The discriminant is the decoded bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CoinSide {
    Heads = 0,
    Tails = 1,
}

impl CoinSide {
    pub fn from_bit(bit: u8) -> Self {
        if bit & 1 == 0 {
            CoinSide::Heads
        } else {
            CoinSide::Tails
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FairCoinToss {
    pub player_choice: CoinSide,
}

/// Single-player crash: the player wins `target` if the round's multiplier
/// reaches it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrashDice {
    pub amount: Amount,
    pub target: Multiplier,
    pub house_edge_bps: u16,
}

/// Multiplayer crash on a hash chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crash {
    pub house_edge_bps: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HiLo {
    Start(HiLoStart),
    Move(HiLoMove),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiLoStart {
    pub amount: Amount,
    /// Rank 1 (ace) to 13 (king).
    pub starting_card: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiLoMove {
    pub move_index: u32,
    pub player_choice: HiLoChoice,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HiLoChoice {
    Hi,
    Lo,
    Cashout,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mines {
    Start(MinesStart),
    Move { cell: u32 },
    Cashout,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinesStart {
    pub amount: Amount,
    pub cells: u32,
    /// Row width, for display only.
    pub cell_line_break: u32,
    pub mines: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tower {
    Start(TowerStart),
    Move { choice: u32 },
    Cashout,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TowerStart {
    pub amount: Amount,
    pub house_edge_bps: u16,
    pub levels: u32,
    pub choices_per_level: u32,
    pub mines_per_level: u32,
}

/// Shared-wheel roulette with declared, ordered outcomes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiRoulette {
    pub outcomes: Vec<RouletteOutcome>,
}

impl MultiRoulette {
    pub fn probabilities(&self) -> Vec<f64> {
        self.outcomes.iter().map(|o| o.probability).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouletteOutcome {
    pub probability: f64,
    pub multiplier: f64,
    #[serde(default)]
    pub bets: Vec<Bet>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bet {
    pub uname: String,
    pub amount: Amount,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Currency;

    #[test]
    fn commitment_context_wire_shape() {
        let bytes = CommitmentContext::Sha256Chain {}.encode().unwrap();
        assert_eq!(bytes, br#"{"sha256Chain":{}}"#);
        assert_eq!(
            CommitmentContext::decode(br#"{"sha256Commitment":{}}"#).unwrap(),
            CommitmentContext::Sha256Commitment {}
        );
    }

    #[test]
    fn message_context_is_externally_tagged() {
        let ctx = MessageContext::FairCoinToss(FairCoinToss {
            player_choice: CoinSide::Tails,
        });
        let bytes = ctx.encode().unwrap();
        assert_eq!(bytes, br#"{"fairCoinToss":{"playerChoice":"tails"}}"#);
        assert_eq!(MessageContext::decode(&bytes).unwrap(), ctx);
        assert_eq!(ctx.family(), GameFamily::CoinToss);
    }

    #[test]
    fn mines_cashout_and_move_shapes() {
        let cashout = MessageContext::Mines(Mines::Cashout).encode().unwrap();
        assert_eq!(cashout, br#"{"mines":"cashout"}"#);
        let mv = MessageContext::Mines(Mines::Move { cell: 12 }).encode().unwrap();
        assert_eq!(mv, br#"{"mines":{"move":{"cell":12}}}"#);
    }

    #[test]
    fn hilo_tag_is_lowercase() {
        let ctx = MessageContext::HiLo(HiLo::Start(HiLoStart {
            amount: Amount::new(Currency::Btc, 1),
            starting_card: 7,
        }));
        let json = String::from_utf8(ctx.encode().unwrap()).unwrap();
        assert!(json.starts_with(r#"{"hilo":{"start":"#), "{json}");
    }

    #[test]
    fn unknown_family_is_rejected() {
        let err = MessageContext::decode(br#"{"keno":{}}"#).unwrap_err();
        assert!(matches!(err, ContextError::Decode(_)));
    }

    #[test]
    fn reveal_context_round_trips() {
        let ctx = RevealContext::StandardDerivation {
            player_seed: "chicken".into(),
        };
        let bytes = ctx.encode().unwrap();
        assert_eq!(bytes, br#"{"standardDerivation":{"playerSeed":"chicken"}}"#);
        assert_eq!(RevealContext::decode(&bytes).unwrap(), ctx);
    }

    #[test]
    fn coin_side_from_bit() {
        assert_eq!(CoinSide::from_bit(0), CoinSide::Heads);
        assert_eq!(CoinSide::from_bit(1), CoinSide::Tails);
        assert_eq!(CoinSide::from_bit(3), CoinSide::Tails);
    }
}
