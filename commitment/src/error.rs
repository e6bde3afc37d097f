use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommitmentError {
    #[error("entropy source failed: {0}")]
    Entropy(String),

    #[error("hash chain length must be at least 2, got {0}")]
    InvalidChainLength(u32),

    #[error("hash chain exhausted after {used} rounds")]
    ChainExhausted { used: u32 },

    #[error("round {got} requested but the chain is positioned at round {expected}")]
    RoundOutOfOrder { expected: u64, got: u64 },

    #[error("chain-link contributions do not support sub-moves")]
    MoveNotSupported,

    #[error("{strategy} derivation cannot be used with a {mode} commitment")]
    StrategyMismatch {
        strategy: &'static str,
        mode: &'static str,
    },
}
