use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutofilterError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("config parse error: {0}")]
    ConfigParse(String),

    #[error("invalid entity: {0}")]
    InvalidEntity(String),

    #[error("invalid CIDR {0}: {1}")]
    InvalidCidr(String, String),

    #[error("bot artifact line malformed: {0}")]
    BotArtifactParse(String),

    #[error("DNS resolution failed: {0}")]
    Dns(String),
}
