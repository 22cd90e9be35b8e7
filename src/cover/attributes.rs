// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Cover entity state as JSON attributes.

use crate::cover::{CoverEntity, cover_features};
use log::error;
use serde_json::{Map, Value};

/// Map the entity properties to a JSON attribute object.
///
/// `state` is always set, `position` only if the current position is known.
pub fn cover_attributes<E: CoverEntity>(entity: &E) -> Map<String, Value> {
    let mut attributes = Map::with_capacity(6);

    attributes.insert("unique_id".into(), entity.unique_id().into());
    attributes.insert("name".into(), entity.name().into());
    attributes.insert(
        "device_class".into(),
        entity.device_class().as_ref().into(),
    );
    attributes.insert(
        "features".into(),
        cover_features(entity.supported_features())
            .into_iter()
            .map(|v| Value::String(v.to_string()))
            .collect(),
    );
    attributes.insert("state".into(), entity.state().to_string().into());
    if let Some(value) = entity.current_position() {
        attributes.insert("position".into(), value.into());
    }

    attributes
}

/// Refresh all covers and map their attributes.
///
/// A cover failing to update is included with its last known state.
///
/// returns: the attribute objects and the number of failed updates.
pub async fn refresh_cover_attributes<E: CoverEntity>(
    covers: &mut [E],
) -> (Vec<Map<String, Value>>, usize) {
    let mut failed = 0;
    let mut states = Vec::with_capacity(covers.len());
    for cover in covers.iter_mut() {
        if let Err(e) = cover.update().await {
            error!("[{}] update failed: {e}", cover.unique_id());
            failed += 1;
        }
        states.push(cover_attributes(&*cover));
    }

    (states, failed)
}
