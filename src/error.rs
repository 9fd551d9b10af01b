use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("unknown crop type '{0}'")]
    UnknownCrop(String),
    #[error("unknown program type '{0}'")]
    UnknownProgram(String),
    #[error("unknown watering method '{0}'")]
    UnknownWateringMethod(String),
    #[error("unknown water efficiency class '{0}'")]
    UnknownWaterEfficiencyClass(String),
    #[error("invalid rate card: {0}")]
    InvalidRateCard(String),
}

pub type Result<T> = std::result::Result<T, Error>;
