use thiserror::Error;

#[derive(Error, Debug)]
pub enum KitError {
    #[error("Configuration error: {0}")] Config(String),

    #[error("Secure random source unavailable: {0}")] Entropy(String),

    #[error("Config parse error: {0}")] Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")] Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")] Io(#[from] std::io::Error),
}

impl KitError {
    /// Errors that leave a service unusable until the process is fixed
    pub fn is_critical(&self) -> bool {
        match self {
            KitError::Entropy(_) => true,
            KitError::Config(_) => true,
            KitError::Toml(_) => true,
            _ => false,
        }
    }
}

impl From<rand::Error> for KitError {
    fn from(e: rand::Error) -> Self {
        KitError::Entropy(e.to_string())
    }
}

pub type KitResult<T> = Result<T, KitError>;
