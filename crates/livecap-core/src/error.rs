use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("environment variable not found: {0}")]
    EnvVarNotFound(String),
}

/// Errors raised while driving a recognition stream. Connection, auth,
/// close, and receive failures are fatal to the session; send failures are
/// handled per the configured policy.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("failed to establish stream: {0}")]
    Connection(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("failed to send audio frame: {0}")]
    Send(String),

    #[error("failed to half-close send side: {0}")]
    Close(String),

    #[error("failed to receive results: {0}")]
    Receive(String),

    #[error("audio pump aborted after {0} consecutive send failures")]
    PumpAborted(u32),
}
