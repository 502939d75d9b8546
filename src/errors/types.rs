use thiserror::Error;

#[derive(Debug, Error)]
pub enum AwdError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown subject: {0}")]
    UnknownSubject(String),

    #[error("Exploit error: {0}")]
    Exploit(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
