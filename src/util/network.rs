// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

use crate::errors::ServiceError;
use rustls::ClientConfig;
use rustls_platform_verifier::ConfigVerifierExt;
use std::sync::Arc;
use std::time::Duration;

/// Create a new HTTP client for the Freebox OS API.
///
/// # Arguments
///
/// * `connection_timeout`: max time to connect to the remote host, including DNS name resolution.
/// * `request_timeout`: total time before a response must be received.
/// * `tls`: use a rustls connector with the platform certificate verifier.
///
/// returns: Result<Client, ServiceError>
pub fn new_http_client(
    connection_timeout: Duration,
    request_timeout: Duration,
    tls: bool,
) -> Result<awc::Client, ServiceError> {
    let connector = awc::Connector::new().timeout(connection_timeout);

    let connector = if tls {
        let mut config = ClientConfig::with_platform_verifier().map_err(|e| {
            ServiceError::InternalServerError(format!("TLS configuration error: {e}"))
        })?;
        config.alpn_protocols = vec![b"http/1.1".to_vec()];
        connector.rustls_0_23(Arc::new(config))
    } else {
        connector
    };

    Ok(awc::ClientBuilder::new()
        .timeout(request_timeout)
        .connector(connector)
        .finish())
}
