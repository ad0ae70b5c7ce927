//! Error types shared across the daemon's components.

/// Everything that can go wrong while running the tablet engine.
///
/// Every fallible operation in this crate returns `Result<_, TmError>` rather
/// than a sentinel or a bare `bool`; see the component docs for which
/// variants each operation can produce.
#[derive(thiserror::Error, Debug)]
pub enum TmError {
    #[error("serial transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("no tablet responded to identification probe")]
    ProbeTimeout,

    #[error("framer desynchronized: {0}")]
    ProtocolDesync(&'static str),

    #[error("decoder received a short packet: expected {expected}, got {got}")]
    ShortPacket { expected: usize, got: usize },

    #[error("malformed setup word: {0}")]
    BadSettingsImport(&'static str),

    #[error("unrecognized control command: {0}")]
    ControlParseError(String),

    #[error("host event sink unavailable")]
    SinkUnavailable,
}

pub type Result<T> = std::result::Result<T, TmError>;
