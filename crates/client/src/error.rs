//! Client error types

use thiserror::Error;
use vswap_math::MathError;
use vswap_overlay::OverlayError;

use crate::receipt::WaitError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Math error: {0}")]
    Math(#[from] MathError),

    #[error("Overlay error: {0}")]
    Overlay(#[from] OverlayError),

    #[error("Receipt wait failed: {0}")]
    Wait(#[from] WaitError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Telemetry error: {0}")]
    Telemetry(String),
}

impl ClientError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn invalid_parameters(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
