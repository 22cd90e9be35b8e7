// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Freebox OS REST API client for home node endpoints.

use crate::configuration::{ENV_MSG_TRACING, FreeboxSettings};
use crate::errors::ServiceError;
use crate::freebox::HomeApi;
use crate::freebox::model::{ApiResponse, EndpointPayload, EndpointValue};
use crate::util::{bool_from_env, new_http_client};
use awc::http::StatusCode;
use log::{debug, error};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Session authentication header of the Freebox OS API.
const AUTH_HEADER: &str = "X-Fbx-App-Auth";

/// HTTP client for the Freebox OS home API.
///
/// The client is cheap to clone: clones share the same connection pool.
#[derive(Clone)]
pub struct FreeboxClient {
    /// Client id for logging: `host:port`
    id: String,
    client: awc::Client,
    /// Versioned API base URL, e.g. `http://mafreebox.freebox.fr/api/v8/`
    base_url: Url,
    session_token: Option<String>,
    msg_tracing: bool,
}

impl FreeboxClient {
    pub fn new(settings: &FreeboxSettings) -> Result<Self, ServiceError> {
        let base_url = settings.api_base_url()?;
        let host = base_url.host_str().unwrap_or(base_url.as_str());
        let port = base_url.port_or_known_default().unwrap_or_default();

        Ok(Self {
            id: format!("{host}:{port}"),
            client: new_http_client(
                Duration::from_secs(settings.connection_timeout as u64),
                Duration::from_secs(settings.request_timeout as u64),
                base_url.scheme() == "https",
            )?,
            session_token: settings.get_session_token(),
            msg_tracing: bool_from_env(ENV_MSG_TRACING),
            base_url,
        })
    }

    fn endpoint_url(&self, node_id: u32, endpoint_id: u32) -> Result<Url, ServiceError> {
        Ok(endpoint_url(&self.base_url, node_id, endpoint_id)?)
    }

    fn with_auth(&self, request: awc::ClientRequest) -> awc::ClientRequest {
        match self.session_token.as_deref() {
            Some(token) => request.insert_header((AUTH_HEADER, token)),
            None => request,
        }
    }

    fn get_request(
        &self,
        node_id: u32,
        endpoint_id: u32,
    ) -> Result<awc::ClientRequest, ServiceError> {
        let url = self.endpoint_url(node_id, endpoint_id)?;
        Ok(self.with_auth(self.client.get(url.as_str())))
    }

    fn put_request(
        &self,
        node_id: u32,
        endpoint_id: u32,
    ) -> Result<awc::ClientRequest, ServiceError> {
        let url = self.endpoint_url(node_id, endpoint_id)?;
        Ok(self.with_auth(self.client.put(url.as_str())))
    }

    /// Send a request and decode the API response envelope.
    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: awc::ClientRequest,
        body: Option<Value>,
    ) -> Result<Option<T>, ServiceError> {
        let method = request.get_method().clone();
        let uri = request.get_uri().clone();
        if self.msg_tracing {
            debug!("[{}] <- {method} {uri} {body:?}", self.id);
        }

        let mut response = match body {
            Some(body) => request.send_json(&body).await,
            None => request.send().await,
        }
        .map_err(|e| {
            error!("[{}] {method} {uri} failed: {e}", self.id);
            ServiceError::from(e)
        })?;

        let status = response.status();
        let payload = response.body().await.map_err(|e| {
            ServiceError::RemoteUnavailable(format!("HTTP {status}: error reading response: {e}"))
        })?;
        if self.msg_tracing {
            debug!(
                "[{}] -> {status} {}",
                self.id,
                String::from_utf8_lossy(&payload)
            );
        }

        decode_response(status, &payload).inspect_err(|e| {
            error!("[{}] {method} {uri}: {e}", self.id);
        })
    }
}

impl HomeApi for FreeboxClient {
    async fn get_home_endpoint_value(
        &self,
        node_id: u32,
        endpoint_id: u32,
    ) -> Result<EndpointValue, ServiceError> {
        let request = self.get_request(node_id, endpoint_id)?;

        self.send(request, None).await?.ok_or_else(|| {
            ServiceError::RemoteUnavailable(format!(
                "No value returned for endpoint {node_id}/{endpoint_id}"
            ))
        })
    }

    async fn set_home_endpoint_value(
        &self,
        node_id: u32,
        endpoint_id: u32,
        payload: &EndpointPayload,
    ) -> Result<(), ServiceError> {
        let request = self.put_request(node_id, endpoint_id)?;

        // the acknowledgement doesn't carry any information
        let _: Option<Value> = self
            .send(request, Some(serde_json::to_value(payload)?))
            .await?;
        Ok(())
    }
}

/// Decode the API response envelope from a response body.
///
/// The Freebox answers errors with a JSON envelope as well, independent of the HTTP status.
fn decode_response<T: serde::de::DeserializeOwned>(
    status: StatusCode,
    payload: &[u8],
) -> Result<Option<T>, ServiceError> {
    let envelope: ApiResponse<T> = serde_json::from_slice(payload).map_err(|e| {
        ServiceError::RemoteUnavailable(format!("HTTP {status}: unexpected response: {e}"))
    })?;
    envelope.into_result()
}

fn endpoint_url(base_url: &Url, node_id: u32, endpoint_id: u32) -> Result<Url, url::ParseError> {
    base_url.join(&format!("home/endpoints/{node_id}/{endpoint_id}"))
}
