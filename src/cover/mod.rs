// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Cover entity model.
//!
//! Positions exposed by a [`CoverEntity`] follow the common cover convention: 0 is fully closed,
//! 100 is fully open.

use crate::errors::ServiceError;
use serde::Serialize;
use strum::{AsRefStr, Display, EnumString, VariantNames};

mod attributes;
mod command;
mod freebox;

pub use attributes::{cover_attributes, refresh_cover_attributes};
pub use command::{CoverCommand, EntityCommand, handle_cover_command};
pub use freebox::{FreeboxCover, POSITION_ENDPOINT_ID};

// https://developers.home-assistant.io/docs/core/entity/cover#supported-features
pub const COVER_SUPPORT_OPEN: u32 = 1;
pub const COVER_SUPPORT_CLOSE: u32 = 2;
pub const COVER_SUPPORT_SET_POSITION: u32 = 4;
pub const COVER_SUPPORT_STOP: u32 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr, Display, EnumString, VariantNames)]
#[strum(serialize_all = "snake_case")]
pub enum CoverFeature {
    Open,
    Close,
    Stop,
    Position,
}

/// Cover device class, used for icon and behaviour selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum CoverDeviceClass {
    Blind,
    Curtain,
    Garage,
    Shade,
    Shutter,
}

/// Open or closed state, or unknown if the cover hasn't reported a position yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum CoverState {
    Open,
    Closed,
    Unknown,
}

/// Map a supported features bitmask to the list of named features.
pub fn cover_features(supported_features: u32) -> Vec<CoverFeature> {
    let mut cover_feats = Vec::with_capacity(4);

    if supported_features & COVER_SUPPORT_OPEN > 0 {
        cover_feats.push(CoverFeature::Open);
    }
    if supported_features & COVER_SUPPORT_CLOSE > 0 {
        cover_feats.push(CoverFeature::Close);
    }
    if supported_features & COVER_SUPPORT_STOP > 0 {
        cover_feats.push(CoverFeature::Stop);
    }
    if supported_features & COVER_SUPPORT_SET_POSITION > 0 {
        cover_feats.push(CoverFeature::Position);
    }

    cover_feats
}

/// A cover entity as seen by the host.
///
/// Property getters are pure reads of the last refreshed state. Commands are fire-and-forget:
/// they return once the remote accepted the request and don't wait for the cover to move.
#[allow(async_fn_in_trait)]
pub trait CoverEntity {
    /// Human-readable name.
    fn name(&self) -> &str;

    /// Stable unique identifier of the entity.
    fn unique_id(&self) -> &str;

    /// Bitmask of `COVER_SUPPORT_*` flags.
    fn supported_features(&self) -> u32;

    fn device_class(&self) -> CoverDeviceClass;

    /// The entity requires periodic [`update`](CoverEntity::update) calls, state changes are not pushed.
    fn should_poll(&self) -> bool;

    /// `None` if the opening state can't be determined.
    fn is_opening(&self) -> Option<bool>;

    /// `None` if the closing state can't be determined.
    fn is_closing(&self) -> Option<bool>;

    /// `None` if the position is unknown.
    fn is_closed(&self) -> Option<bool>;

    /// Current position of the cover, `None` if unknown.
    fn current_position(&self) -> Option<u8>;

    fn state(&self) -> CoverState {
        match self.is_closed() {
            Some(true) => CoverState::Closed,
            Some(false) => CoverState::Open,
            None => CoverState::Unknown,
        }
    }

    /// Refresh the entity state from the remote device.
    async fn update(&mut self) -> Result<(), ServiceError>;

    async fn open_cover(&self) -> Result<(), ServiceError>;

    async fn close_cover(&self) -> Result<(), ServiceError>;

    /// Move the cover to the given position in the range 0..=100.
    async fn set_cover_position(&self, position: u8) -> Result<(), ServiceError>;

    async fn stop_cover(&self) -> Result<(), ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, vec![])]
    #[case(COVER_SUPPORT_OPEN | COVER_SUPPORT_CLOSE, vec![CoverFeature::Open, CoverFeature::Close])]
    #[case(COVER_SUPPORT_SET_POSITION, vec![CoverFeature::Position])]
    #[case(15, vec![CoverFeature::Open, CoverFeature::Close, CoverFeature::Stop, CoverFeature::Position])]
    #[case(16 | COVER_SUPPORT_STOP, vec![CoverFeature::Stop])]
    fn supported_features_are_mapped(#[case] features: u32, #[case] expected: Vec<CoverFeature>) {
        assert_eq!(expected, cover_features(features));
    }

    #[test]
    fn enum_names() {
        assert_eq!("position", CoverFeature::Position.to_string());
        assert_eq!("shutter", CoverDeviceClass::Shutter.as_ref());
        assert_eq!("UNKNOWN", CoverState::Unknown.to_string());
        assert_eq!(
            serde_json::json!("CLOSED"),
            serde_json::to_value(CoverState::Closed).unwrap()
        );
    }
}
