//! vx session: one provably-fair session from commitment to reveal.
//!
//! | stage    | where                | what                                          |
//! |----------|----------------------|-----------------------------------------------|
//! | open     | [`Session::open`]    | generate the secret, build the commitment     |
//! | register | [`Session::register`]| `make_commitment`, returns the BLS public key |
//! | round    | [`Session`]          | derive, sign, verify, record, decode          |
//! | reveal   | [`RevealEngine`]     | `make_reveal`, once per commitment            |
//! | replay   | [`audit_session`]    | anyone, from the audit log alone              |

pub mod config;
pub mod error;
pub mod replay;
pub mod reveal;
pub mod session;
pub mod tracing_spans;

pub use config::{ModeKind, OracleConfig, SessionConfig};
pub use error::SessionError;
pub use replay::{audit_session, audit_store, AuditReport, ReplayError, ReplayedRound};
pub use reveal::RevealEngine;
pub use session::{RoundResult, Session, SessionStatus};
