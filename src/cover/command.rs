// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Cover entity command handling.
//! Translates textual entity commands into [`CoverEntity`] operations.

use crate::cover::CoverEntity;
use crate::errors::ServiceError;
use derive_more::Constructor;
use serde_json::{Map, Value};
use strum::{Display, EnumString, VariantNames};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, VariantNames)]
#[strum(serialize_all = "snake_case")]
pub enum CoverCommand {
    Open,
    Close,
    Stop,
    Position,
}

/// Command request for a single entity.
#[derive(Clone, Debug, Constructor)]
pub struct EntityCommand {
    pub entity_id: String,
    pub cmd_id: String,
    pub params: Option<Map<String, Value>>,
}

/// Execute an entity command on the given cover.
///
/// The `position` command requires the `position` parameter in the range 0..=100.
///
/// returns: Result<(), ServiceError>, `BadRequest` for commands addressed to another entity,
/// unknown commands or invalid parameters.
pub async fn handle_cover_command<E: CoverEntity>(
    entity: &E,
    msg: &EntityCommand,
) -> Result<(), ServiceError> {
    if msg.entity_id != entity.unique_id() {
        return Err(ServiceError::BadRequest(format!(
            "Command for entity {} sent to {}",
            msg.entity_id,
            entity.unique_id()
        )));
    }
    let cmd: CoverCommand = cmd_from_str(&msg.cmd_id)?;

    match cmd {
        CoverCommand::Open => entity.open_cover().await,
        CoverCommand::Close => entity.close_cover().await,
        CoverCommand::Stop => entity.stop_cover().await,
        CoverCommand::Position => {
            let params = get_required_params(msg)?;
            if let Some(pos @ 0..=100) = params.get("position").and_then(|v| v.as_u64()) {
                entity.set_cover_position(pos as u8).await
            } else {
                Err(ServiceError::BadRequest(
                    "Invalid or missing params.position attribute".into(),
                ))
            }
        }
    }
}

pub fn cmd_from_str<T: std::str::FromStr + VariantNames>(cmd: &str) -> Result<T, ServiceError> {
    T::from_str(cmd).map_err(|_| {
        ServiceError::BadRequest(format!(
            "Invalid cmd_id: {cmd}. Valid commands: {}",
            T::VARIANTS.to_vec().join(",")
        ))
    })
}

/// Get a serde_json::Map reference of the params attribute of the provided EntityCommand.
///
/// A BadRequest error is returned if `params` is not set.
fn get_required_params(cmd: &EntityCommand) -> Result<&Map<String, Value>, ServiceError> {
    cmd.params
        .as_ref()
        .ok_or_else(|| ServiceError::BadRequest("Missing params object".into()))
}
