#![warn(missing_docs)]
//! Core primitives shared across the workspace.

pub mod color;
pub mod error;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use color::{Color, ColorParseError};
pub use error::{Error, Result};

/// Upper bound of a panner cone angle, in degrees.
pub const MAX_CONE_DEGREES: f32 = 360.0;

/// Inner/outer cone angles of a directional sound source, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConeAngles {
    /// Full angle of the full-volume region.
    pub inner_deg: f32,
    /// Full angle beyond which the outer gain applies.
    pub outer_deg: f32,
}

impl ConeAngles {
    /// Omnidirectional cone (the Web Audio panner default).
    pub const OMNI: Self = Self {
        inner_deg: MAX_CONE_DEGREES,
        outer_deg: MAX_CONE_DEGREES,
    };

    /// Create a cone from two angles, clamping each to `[0, 360]`.
    ///
    /// `inner <= outer` is not enforced.
    pub fn clamped(inner_deg: f32, outer_deg: f32) -> Self {
        Self {
            inner_deg: clamp_degrees(inner_deg),
            outer_deg: clamp_degrees(outer_deg),
        }
    }

    /// Half of the inner angle, in radians.
    pub fn half_inner_rad(self) -> f32 {
        self.inner_deg.to_radians() / 2.0
    }

    /// Half of the outer angle, in radians.
    pub fn half_outer_rad(self) -> f32 {
        self.outer_deg.to_radians() / 2.0
    }

    /// True when there is no falloff band between inner and outer angle.
    pub fn has_no_falloff(self) -> bool {
        self.inner_deg == self.outer_deg
    }
}

impl Default for ConeAngles {
    fn default() -> Self {
        Self::OMNI
    }
}

fn clamp_degrees(value: f32) -> f32 {
    if value.is_nan() {
        return MAX_CONE_DEGREES;
    }
    value.clamp(0.0, MAX_CONE_DEGREES)
}
