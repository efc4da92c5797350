use thiserror::Error;

/// Validation and contract errors exposed by `tickerpulse-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter or '^': '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },
    #[error("index symbol '{value}' must continue with a letter or digit after '^'")]
    SymbolIncompleteIndex { value: String },

    #[error("invalid provider '{value}', expected one of yahoo, alphavantage")]
    InvalidProvider { value: String },

    #[error("long lookback must cover at least 2 sessions, got {value}")]
    LookbackTooShort { value: usize },
    #[error("range must cover at least one session")]
    EmptyRange,

    #[error("provider '{provider}' requires an API key")]
    MissingApiKey { provider: &'static str },
    #[error("max concurrency must be greater than zero")]
    ZeroConcurrency,
}

/// Failures decoding caller-supplied payloads.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
