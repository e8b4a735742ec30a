//! Runtime-tunable resolver parameters.
//!
//! The module-level constants in [`crate::config`] are the defaults; systems
//! read `Res<ParcelRoadParams>` so a host can retune search radii or batch
//! sizes without recompiling. Parameters can be loaded from a JSON document,
//! and missing fields fall back to their defaults.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{FRONT_ACCESS_RADIUS, SEARCH_BATCH_SIZE, SIDE_ACCESS_RADIUS};
use crate::error::ParamsError;

/// Tunables for the parcel-to-road connection resolver.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParcelRoadParams {
    /// Search radius around the front access point.
    pub front_radius: f32,
    /// Search radius around the left and right access points.
    pub side_radius: f32,
    /// Whether side access points may attach to a point on the road surface
    /// between its boundary curves, like the front access does.
    pub side_can_be_on_road: bool,
    /// Resolve left/right access points at all. When false only the front
    /// road is searched and the side flags stay cleared.
    pub resolve_side_access: bool,
    /// Work items per compute task in the search stage.
    pub search_batch_size: usize,
}

impl Default for ParcelRoadParams {
    fn default() -> Self {
        Self {
            front_radius: FRONT_ACCESS_RADIUS,
            side_radius: SIDE_ACCESS_RADIUS,
            side_can_be_on_road: true,
            resolve_side_access: true,
            search_batch_size: SEARCH_BATCH_SIZE,
        }
    }
}

impl ParcelRoadParams {
    /// Parse and validate parameters from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ParamsError> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, ParamsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that every radius is positive and finite and the batch size is
    /// non-zero.
    pub fn validate(&self) -> Result<(), ParamsError> {
        for (name, value) in [
            ("front_radius", self.front_radius),
            ("side_radius", self.side_radius),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ParamsError::InvalidRadius { name, value });
            }
        }
        if self.search_batch_size == 0 {
            return Err(ParamsError::InvalidBatchSize);
        }
        Ok(())
    }
}

/// Replace host-supplied params that fail validation with the defaults, so a
/// bad radius or a zero batch size never reaches the search stage.
pub fn fall_back_on_invalid_params(mut params: ResMut<ParcelRoadParams>) {
    if !params.is_changed() {
        return;
    }
    if let Err(err) = params.validate() {
        warn!("parcel road params rejected ({err}), using defaults");
        *params = ParcelRoadParams::default();
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
