use crate::sanitize::sanitize_message;
use jsonrpsee::{core::Error as RpcError, types::error::CallError};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which rate-limit window rejected a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateLimitScope {
    PerMinute,
    PerDay,
}

impl fmt::Display for RateLimitScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateLimitScope::PerMinute => write!(f, "per-minute window"),
            RateLimitScope::PerDay => write!(f, "per-day window"),
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub enum SkittyError {
    #[error("Object {0} not found")]
    ObjectNotFound(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Signing error: {0}")]
    SigningError(String),

    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("Transaction execution failed: {0}")]
    TransactionExecutionFailed(String),

    #[error("Simulation failed: {0}")]
    SimulationFailed(String),

    #[error("Sponsorship not viable: user rebate {user_rebate_mist} mist is below gas + fee recoup {required_mist} mist")]
    InfeasibleSponsorship { user_rebate_mist: u64, required_mist: u64 },

    #[error("Internal error: {0}")]
    InternalServerError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limit exceeded ({scope}), retry after {retry_after_seconds}s")]
    RateLimitExceeded { scope: RateLimitScope, retry_after_seconds: u64 },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl From<reqwest::Error> for SkittyError {
    fn from(_e: reqwest::Error) -> Self {
        #[cfg(feature = "unsafe-debug")]
        {
            SkittyError::RpcError(_e.to_string())
        }
        #[cfg(not(feature = "unsafe-debug"))]
        {
            SkittyError::RpcError(sanitize_message(&_e.to_string()))
        }
    }
}

impl From<bcs::Error> for SkittyError {
    fn from(_e: bcs::Error) -> Self {
        #[cfg(feature = "unsafe-debug")]
        {
            SkittyError::SerializationError(_e.to_string())
        }
        #[cfg(not(feature = "unsafe-debug"))]
        {
            SkittyError::SerializationError(sanitize_message(&_e.to_string()))
        }
    }
}

impl From<base64::DecodeError> for SkittyError {
    fn from(_e: base64::DecodeError) -> Self {
        #[cfg(feature = "unsafe-debug")]
        {
            SkittyError::SerializationError(_e.to_string())
        }
        #[cfg(not(feature = "unsafe-debug"))]
        {
            SkittyError::SerializationError(sanitize_message(&_e.to_string()))
        }
    }
}

impl From<serde_json::Error> for SkittyError {
    fn from(_e: serde_json::Error) -> Self {
        #[cfg(feature = "unsafe-debug")]
        {
            SkittyError::SerializationError(_e.to_string())
        }
        #[cfg(not(feature = "unsafe-debug"))]
        {
            SkittyError::SerializationError(sanitize_message(&_e.to_string()))
        }
    }
}

impl From<std::io::Error> for SkittyError {
    fn from(_e: std::io::Error) -> Self {
        #[cfg(feature = "unsafe-debug")]
        {
            SkittyError::InternalServerError(_e.to_string())
        }
        #[cfg(not(feature = "unsafe-debug"))]
        {
            SkittyError::InternalServerError(sanitize_message(&_e.to_string()))
        }
    }
}

impl From<ed25519_dalek::SignatureError> for SkittyError {
    fn from(_e: ed25519_dalek::SignatureError) -> Self {
        #[cfg(feature = "unsafe-debug")]
        {
            SkittyError::SigningError(_e.to_string())
        }
        #[cfg(not(feature = "unsafe-debug"))]
        {
            SkittyError::SigningError(sanitize_message(&_e.to_string()))
        }
    }
}

impl From<anyhow::Error> for SkittyError {
    fn from(_err: anyhow::Error) -> Self {
        #[cfg(feature = "unsafe-debug")]
        {
            SkittyError::InternalServerError(_err.to_string())
        }
        #[cfg(not(feature = "unsafe-debug"))]
        {
            SkittyError::InternalServerError(sanitize_message(&_err.to_string()))
        }
    }
}

impl From<SkittyError> for RpcError {
    fn from(err: SkittyError) -> Self {
        match err {
            SkittyError::ObjectNotFound(_)
            | SkittyError::InvalidTransaction(_)
            | SkittyError::ValidationError(_)
            | SkittyError::InvalidRequest(_)
            | SkittyError::InfeasibleSponsorship { .. } => invalid_request(err),

            SkittyError::InternalServerError(_) | SkittyError::SerializationError(_) => {
                internal_server_error(err)
            }

            _ => invalid_request(err),
        }
    }
}

pub fn invalid_request(e: SkittyError) -> RpcError {
    RpcError::Call(CallError::from_std_error(e))
}

pub fn internal_server_error(e: SkittyError) -> RpcError {
    RpcError::Call(CallError::from_std_error(e))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkittyResponse<T> {
    pub data: Option<T>,
    pub error: Option<SkittyError>,
}

impl<T> SkittyResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { data: Some(data), error: None }
    }

    pub fn err(error: SkittyError) -> Self {
        Self { data: None, error: Some(error) }
    }

    pub fn from_result(result: Result<T, SkittyError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(error) => Self::err(error),
        }
    }
}

// Extension trait for Result<T, E> to convert to SkittyResponse
pub trait IntoSkittyResponse<T> {
    fn into_response(self) -> SkittyResponse<T>;
}

impl<T, E: Into<SkittyError>> IntoSkittyResponse<T> for Result<T, E> {
    fn into_response(self) -> SkittyResponse<T> {
        match self {
            Ok(data) => SkittyResponse::ok(data),
            Err(e) => SkittyResponse::err(e.into()),
        }
    }
}
