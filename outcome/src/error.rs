use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum OutcomeError {
    #[error("signature too short to decode: {len} bytes, need at least {min}")]
    SignatureTooShort { len: usize, min: usize },

    #[error("no unassigned cells left: {assigned} of {cells} already assigned")]
    NoRemainingCells { cells: u32, assigned: u32 },

    #[error("invalid probabilities: {0}")]
    InvalidProbabilities(String),

    #[error("house edge of {0} bps is not below 100%")]
    InvalidHouseEdge(u16),

    #[error("invalid game parameters: {0}")]
    InvalidParameters(String),

    #[error("invalid move: {0}")]
    InvalidMove(String),

    #[error("no {0} game in progress")]
    NoGameInProgress(&'static str),

    #[error("game is already over")]
    GameOver,

    #[error("chain crash needs the next chain link to decode")]
    MissingChainSuccessor,
}
