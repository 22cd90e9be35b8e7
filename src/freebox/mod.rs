// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Freebox home API access.
//!
//! The cover adapter only depends on the [`HomeApi`] capability: reading and writing home node
//! endpoint values. [`FreeboxClient`] implements it with the Freebox OS REST API.

use crate::errors::ServiceError;

mod client;
pub mod model;

pub use client::FreeboxClient;
pub use model::{EndpointPayload, EndpointValue};

/// Remote home node endpoint access.
///
/// Both operations may suspend while awaiting network I/O. An unreachable gateway or node, or a
/// protocol error, fails with [`ServiceError::RemoteUnavailable`].
#[allow(async_fn_in_trait)] // awc futures are not Send
pub trait HomeApi {
    /// Read the current value of an endpoint of the given home node.
    async fn get_home_endpoint_value(
        &self,
        node_id: u32,
        endpoint_id: u32,
    ) -> Result<EndpointValue, ServiceError>;

    /// Set the value of an endpoint of the given home node.
    async fn set_home_endpoint_value(
        &self,
        node_id: u32,
        endpoint_id: u32,
        payload: &EndpointPayload,
    ) -> Result<(), ServiceError>;
}
