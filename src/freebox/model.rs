// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Freebox OS API JSON message structures.

use crate::errors::ServiceError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{DurationMilliSeconds, serde_as};
use std::time::Duration;

/// Common response envelope of all Freebox OS API calls.
///
/// See <https://dev.freebox.fr/sdk/os/#APIResponse>
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub result: Option<T>,
    pub msg: Option<String>,
    pub error_code: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Convert the response envelope into the enclosed result.
    ///
    /// An unsuccessful response is mapped to [`ServiceError::RemoteUnavailable`], including the
    /// Freebox error code and message. A successful response without `result` object returns
    /// `None`.
    pub fn into_result(self) -> Result<Option<T>, ServiceError> {
        if self.success {
            return Ok(self.result);
        }

        Err(ServiceError::RemoteUnavailable(format!(
            "{}: {}",
            self.error_code.as_deref().unwrap_or("unknown_error"),
            self.msg.as_deref().unwrap_or("no error message")
        )))
    }
}

/// Current value of a home node endpoint.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct EndpointValue {
    pub value: Value,
    pub value_type: Option<String>,
    /// Refresh interval hint of the gateway.
    #[serde_as(as = "Option<DurationMilliSeconds>")]
    #[serde(default)]
    pub refresh: Option<Duration>,
}

impl EndpointValue {
    pub fn from_value(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            value_type: Some("int".into()),
            refresh: None,
        }
    }
}

/// Payload to set a home node endpoint value.
///
/// Serializes to `{"value": <value>}`, or to an empty object for action endpoints like `stop`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EndpointPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl EndpointPayload {
    pub fn value(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
        }
    }

    pub fn empty() -> Self {
        Self { value: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn successful_response_returns_result() {
        let response: ApiResponse<EndpointValue> = serde_json::from_value(json!({
            "success": true,
            "result": { "value": 30, "value_type": "int", "refresh": 2000 }
        }))
        .unwrap();

        let value = response.into_result().unwrap().unwrap();
        assert_eq!(json!(30), value.value);
        assert_eq!(Some("int"), value.value_type.as_deref());
        assert_eq!(Some(Duration::from_secs(2)), value.refresh);
    }

    #[test]
    fn successful_response_without_result_returns_none() {
        let response: ApiResponse<EndpointValue> =
            serde_json::from_value(json!({ "success": true })).unwrap();

        assert_eq!(Ok(None), response.into_result());
    }

    #[test]
    fn failed_response_returns_remote_unavailable() {
        let response: ApiResponse<EndpointValue> = serde_json::from_value(json!({
            "success": false,
            "msg": "Vous devez vous connecter pour accéder à cette fonction",
            "error_code": "auth_required"
        }))
        .unwrap();

        match response.into_result() {
            Err(ServiceError::RemoteUnavailable(msg)) => {
                assert!(msg.starts_with("auth_required: "), "Unexpected message: {msg}")
            }
            r => panic!("Expected RemoteUnavailable, but got: {r:?}"),
        }
    }

    #[test]
    fn endpoint_payload_serialization() {
        assert_eq!(
            json!({ "value": 75 }),
            serde_json::to_value(EndpointPayload::value(75)).unwrap()
        );
        assert_eq!(
            json!({}),
            serde_json::to_value(EndpointPayload::empty()).unwrap()
        );
    }
}
