// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Freebox home shutter as cover entity.
//!
//! The Freebox reports and expects the shutter travel: 0 is fully open, 100 is fully closed.
//! All positions are inverted here, on the read and on every write path.

use crate::configuration::CoverSettings;
use crate::cover::{
    COVER_SUPPORT_CLOSE, COVER_SUPPORT_OPEN, COVER_SUPPORT_SET_POSITION, COVER_SUPPORT_STOP,
    CoverDeviceClass, CoverEntity,
};
use crate::errors::ServiceError;
use crate::freebox::{EndpointPayload, HomeApi};
use log::{debug, info, warn};

/// Endpoint id of the shutter position state.
pub const POSITION_ENDPOINT_ID: u32 = 4;

const VENDOR_OPEN: u8 = 0;
const VENDOR_CLOSED: u8 = 100;

pub struct FreeboxCover<C> {
    api: C,
    id: String,
    label: String,
    node_id: u32,
    endpoint_id_position: u32,
    endpoint_id_stop: u32,
    /// Last refreshed shutter travel in vendor convention. `None` until the first update.
    position: Option<u8>,
}

impl<C: HomeApi> FreeboxCover<C> {
    pub fn new(api: C, settings: &CoverSettings) -> Self {
        Self {
            api,
            id: settings.unique_id(),
            label: settings.label.clone(),
            node_id: settings.node_id,
            endpoint_id_position: settings.endpoint_id_position,
            endpoint_id_stop: settings.endpoint_id_stop,
            position: None,
        }
    }

    async fn set_position_value(&self, value: u8) -> Result<(), ServiceError> {
        self.api
            .set_home_endpoint_value(
                self.node_id,
                self.endpoint_id_position,
                &EndpointPayload::value(value),
            )
            .await
    }
}

impl<C: HomeApi> CoverEntity for FreeboxCover<C> {
    fn name(&self) -> &str {
        &self.label
    }

    fn unique_id(&self) -> &str {
        &self.id
    }

    fn supported_features(&self) -> u32 {
        COVER_SUPPORT_OPEN | COVER_SUPPORT_CLOSE | COVER_SUPPORT_SET_POSITION | COVER_SUPPORT_STOP
    }

    fn device_class(&self) -> CoverDeviceClass {
        CoverDeviceClass::Shutter
    }

    fn should_poll(&self) -> bool {
        true
    }

    // no motion information available from the home API
    fn is_opening(&self) -> Option<bool> {
        None
    }

    fn is_closing(&self) -> Option<bool> {
        None
    }

    fn is_closed(&self) -> Option<bool> {
        self.position.map(|p| p == VENDOR_CLOSED)
    }

    fn current_position(&self) -> Option<u8> {
        self.position.map(|p| 100 - p)
    }

    async fn update(&mut self) -> Result<(), ServiceError> {
        let result = self
            .api
            .get_home_endpoint_value(self.node_id, POSITION_ENDPOINT_ID)
            .await?;

        let position = match result.value.as_u64() {
            Some(value @ 0..=100) => value as u8,
            _ => {
                return Err(ServiceError::InvalidResponse(format!(
                    "[{}] invalid position value: {}",
                    self.id, result.value
                )));
            }
        };

        debug!("[{}] position: {position}", self.id);
        self.position = Some(position);
        Ok(())
    }

    async fn open_cover(&self) -> Result<(), ServiceError> {
        info!("[{}] open", self.id);
        self.set_position_value(VENDOR_OPEN).await
    }

    async fn close_cover(&self) -> Result<(), ServiceError> {
        info!("[{}] close", self.id);
        self.set_position_value(VENDOR_CLOSED).await
    }

    async fn set_cover_position(&self, position: u8) -> Result<(), ServiceError> {
        if position > 100 {
            warn!("[{}] position {position} out of range, using 100", self.id);
        }
        let position = position.min(100);
        info!("[{}] set position: {position}", self.id);
        self.set_position_value(100 - position).await
    }

    async fn stop_cover(&self) -> Result<(), ServiceError> {
        info!("[{}] stop", self.id);
        self.api
            .set_home_endpoint_value(self.node_id, self.endpoint_id_stop, &EndpointPayload::empty())
            .await
    }
}
