// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Custom application error with conversions from common Rust and 3rd-party errors.

use awc::error::{JsonPayloadError, SendRequestError};
use derive_more::Display;
use log::error;

#[derive(Debug, Display, PartialEq)]
pub enum ServiceError {
    #[display("Internal server error: {_0}")]
    InternalServerError(String),

    #[display("Internal serialization error: {_0}")]
    SerializationError(String),

    #[display("BadRequest: {_0}")]
    BadRequest(String),

    /// The Freebox gateway or the home node can't be reached, or it answered with a protocol error.
    #[display("Remote unavailable: {_0}")]
    RemoteUnavailable(String),

    /// The remote answered, but the returned endpoint value is not usable.
    #[display("Invalid response: {_0}")]
    InvalidResponse(String),
}

impl std::error::Error for ServiceError {}

impl From<std::io::Error> for ServiceError {
    fn from(e: std::io::Error) -> Self {
        ServiceError::InternalServerError(format!("{:?}", e))
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        error!("{:?}", e);
        ServiceError::SerializationError(e.to_string())
    }
}

impl From<strum::ParseError> for ServiceError {
    fn from(e: strum::ParseError) -> Self {
        ServiceError::SerializationError(e.to_string())
    }
}

impl From<url::ParseError> for ServiceError {
    fn from(e: url::ParseError) -> Self {
        ServiceError::InternalServerError(format!("Invalid URL: {e}"))
    }
}

impl From<SendRequestError> for ServiceError {
    fn from(e: SendRequestError) -> Self {
        ServiceError::RemoteUnavailable(format!("Request failed: {e}"))
    }
}

impl From<JsonPayloadError> for ServiceError {
    fn from(e: JsonPayloadError) -> Self {
        ServiceError::RemoteUnavailable(format!("Invalid response payload: {e}"))
    }
}
