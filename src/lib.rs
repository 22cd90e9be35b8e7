// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Freebox home gateway shutter exposed as cover entity.

pub mod configuration;
pub mod cover;
pub mod errors;
pub mod freebox;
pub mod util;
mod version;

pub use version::*;
