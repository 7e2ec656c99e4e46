use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(#[from] crate::parser::ParserError),
}

pub type Result<T> = std::result::Result<T, MigrateError>;
