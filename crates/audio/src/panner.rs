//! Gain curves of a positional panner.
//!
//! Formulas follow the Web Audio `PannerNode` definitions so scenes authored
//! for a browser runtime sound the same here.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use soundstage_core::ConeAngles;

use crate::config::DistanceModel;

/// Directional cone applied to a source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConeSettings {
    /// Inner/outer angles in degrees.
    pub angles: ConeAngles,
    /// Gain outside the outer angle, `0.0..=1.0`.
    pub outer_gain: f32,
}

impl Default for ConeSettings {
    fn default() -> Self {
        Self {
            angles: ConeAngles::OMNI,
            outer_gain: 0.0,
        }
    }
}

/// Distance attenuation for `distance` under `model`.
pub fn distance_gain(
    model: DistanceModel,
    distance: f32,
    ref_distance: f32,
    max_distance: f32,
    rolloff: f32,
) -> f32 {
    match model {
        DistanceModel::Linear => {
            if max_distance <= ref_distance {
                return 1.0;
            }
            let d = distance.clamp(ref_distance, max_distance);
            let rolloff = rolloff.clamp(0.0, 1.0);
            1.0 - rolloff * (d - ref_distance) / (max_distance - ref_distance)
        }
        DistanceModel::Inverse => {
            let d = distance.max(ref_distance);
            ref_distance / (ref_distance + rolloff * (d - ref_distance))
        }
        DistanceModel::Exponential => {
            let d = distance.max(ref_distance);
            (d / ref_distance).powf(-rolloff)
        }
    }
}

/// Cone attenuation for a listener `angle_deg` away from the source's facing.
pub fn cone_gain(cone: &ConeSettings, angle_deg: f32) -> f32 {
    let ConeAngles {
        inner_deg,
        outer_deg,
    } = cone.angles;
    if inner_deg == 360.0 && outer_deg == 360.0 {
        return 1.0;
    }

    let angle = angle_deg.abs();
    let half_inner = inner_deg / 2.0;
    let half_outer = outer_deg / 2.0;

    if angle <= half_inner {
        1.0
    } else if angle >= half_outer {
        cone.outer_gain
    } else {
        let x = (angle - half_inner) / (half_outer - half_inner);
        (1.0 - x) + cone.outer_gain * x
    }
}

/// Angle in degrees between `forward` and the direction from `source` to `listener`.
///
/// Returns 0 when the listener sits on the source or `forward` is zero.
pub fn angle_to_listener(source: Vec3, forward: Vec3, listener: Vec3) -> f32 {
    let to_listener = listener - source;
    if to_listener.length_squared() == 0.0 || forward.length_squared() == 0.0 {
        return 0.0;
    }
    forward.angle_between(to_listener).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn all_models_are_unity_at_ref_distance() {
        for model in [
            DistanceModel::Linear,
            DistanceModel::Inverse,
            DistanceModel::Exponential,
        ] {
            assert_relative_eq!(distance_gain(model, 40.0, 40.0, 10000.0, 8.0), 1.0);
            assert_relative_eq!(distance_gain(model, 1.0, 40.0, 10000.0, 8.0), 1.0);
        }
    }

    #[test]
    fn linear_is_clamped_past_max() {
        let at_max = distance_gain(DistanceModel::Linear, 100.0, 10.0, 100.0, 1.0);
        let beyond = distance_gain(DistanceModel::Linear, 500.0, 10.0, 100.0, 1.0);
        assert_relative_eq!(at_max, 0.0);
        assert_relative_eq!(beyond, 0.0);
    }

    #[test]
    fn inverse_and_exponential_curves() {
        assert_relative_eq!(
            distance_gain(DistanceModel::Inverse, 20.0, 10.0, 100.0, 1.0),
            0.5
        );
        assert_relative_eq!(
            distance_gain(DistanceModel::Exponential, 20.0, 10.0, 100.0, 2.0),
            0.25
        );
    }

    #[test]
    fn omni_cone_never_attenuates() {
        assert_eq!(cone_gain(&ConeSettings::default(), 170.0), 1.0);
    }

    #[test]
    fn cone_interpolates_between_inner_and_outer() {
        let cone = ConeSettings {
            angles: ConeAngles::clamped(60.0, 180.0),
            outer_gain: 0.2,
        };
        assert_eq!(cone_gain(&cone, 10.0), 1.0);
        assert_eq!(cone_gain(&cone, -95.0), 0.2);
        assert_relative_eq!(cone_gain(&cone, 60.0), 0.6, epsilon = 1e-6);
    }

    #[test]
    fn angle_to_listener_measures_offset() {
        let angle = angle_to_listener(Vec3::ZERO, Vec3::Z, Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(angle, 90.0, epsilon = 1e-4);
        assert_eq!(angle_to_listener(Vec3::ONE, Vec3::Z, Vec3::ONE), 0.0);
    }
}
