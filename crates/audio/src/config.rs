//! Declarative sound-control configuration.

use serde::{Deserialize, Deserializer, Serialize};
use soundstage_core::{Color, ConeAngles, Error, Result};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::panner::ConeSettings;

/// Divisions used for both bands of the cone helper.
pub const HELPER_DIVISIONS: u32 = 10;

/// Multiplier applied to `refDistance / rolloffFactor` to size the cone helper.
pub const HELPER_RANGE_SCALE: f32 = 10.0;

/// Distance attenuation curve of a panner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceModel {
    /// Linear falloff between ref and max distance.
    Linear,
    /// Inverse-distance falloff.
    Inverse,
    /// Exponential falloff.
    #[default]
    Exponential,
}

impl FromStr for DistanceModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "inverse" => Ok(Self::Inverse),
            "exponential" => Ok(Self::Exponential),
            other => Err(Error::config(format!("unknown distance model '{other}'"))),
        }
    }
}

// Same case-insensitive rules as attribute strings.
impl<'de> Deserialize<'de> for DistanceModel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for DistanceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Linear => "linear",
            Self::Inverse => "inverse",
            Self::Exponential => "exponential",
        };
        f.write_str(name)
    }
}

/// Sound-control options as written in scene markup.
///
/// Every field has a default, so partial tables deserialize cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SoundControlConfig {
    /// Start playing as soon as the source is created.
    pub autoplay: bool,
    /// Distance attenuation curve.
    pub distance_model: DistanceModel,
    /// Distance beyond which no further attenuation applies.
    pub max_distance: f32,
    /// Restart when playback reaches the end.
    #[serde(rename = "loop")]
    pub looping: bool,
    /// Distance at which attenuation starts.
    pub ref_distance: f32,
    /// How quickly volume falls off with distance.
    pub rolloff_factor: f32,
    /// Resource locator of the audio clip. May be empty.
    pub src: String,
    /// Source volume.
    pub volume: f32,
    /// Apply the cone fields below to the panner.
    pub cone: bool,
    /// Inner cone angle in degrees.
    pub cone_in_angle: f32,
    /// Outer cone angle in degrees.
    pub cone_out_angle: f32,
    /// Gain outside the outer cone.
    pub cone_out_level: f32,
    /// Accepted for markup compatibility; the helper is always attached.
    pub pos_helper: bool,
    /// Helper colour of the inner cone.
    pub pos_color_in: String,
    /// Helper colour of the outer bands.
    pub pos_color_out: String,
}

impl Default for SoundControlConfig {
    fn default() -> Self {
        Self {
            autoplay: false,
            distance_model: DistanceModel::Exponential,
            max_distance: 10000.0,
            looping: false,
            ref_distance: 40.0,
            rolloff_factor: 8.0,
            src: String::new(),
            volume: 1.0,
            cone: false,
            cone_in_angle: 10.0,
            cone_out_angle: 100.0,
            cone_out_level: 0.0,
            pos_helper: false,
            pos_color_in: "red".to_string(),
            pos_color_out: "green".to_string(),
        }
    }
}

/// Settings handed to the positional audio capability when creating a source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceSettings {
    /// Start playing immediately.
    pub autoplay: bool,
    /// Distance attenuation curve.
    pub distance_model: DistanceModel,
    /// Loop playback.
    pub looping: bool,
    /// Max attenuation distance.
    pub max_distance: f32,
    /// Reference distance.
    pub ref_distance: f32,
    /// Rolloff factor.
    pub rolloff_factor: f32,
    /// Clip locator.
    pub src: String,
    /// Source volume.
    pub volume: f32,
    /// Directional cone, or `None` to keep the capability's default.
    pub cone: Option<ConeSettings>,
}

impl SoundControlConfig {
    /// Parse a markup attribute string such as `"src: a.ogg; loop: true"`.
    ///
    /// Unknown keys and malformed values are logged and leave the default in place.
    pub fn from_attribute_str(input: &str) -> Self {
        let mut config = Self::default();
        for declaration in input.split(';') {
            let declaration = declaration.trim();
            if declaration.is_empty() {
                continue;
            }
            let Some((key, value)) = declaration.split_once(':') else {
                warn!(declaration, "ignoring sound-control property without a value");
                continue;
            };
            config.set_property(key.trim(), value.trim());
        }
        config
    }

    /// Build a config from `(key, value)` pairs, with the same lenient rules as
    /// [`SoundControlConfig::from_attribute_str`].
    pub fn from_properties<K, V>(properties: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in properties {
            config.set_property(key.as_ref().trim(), value.as_ref().trim());
        }
        config
    }

    /// Apply one markup property. Unknown keys and malformed values are logged and ignored.
    pub fn set_property(&mut self, key: &str, value: &str) {
        let applied = match key {
            "autoplay" => parse_bool(value).map(|v| self.autoplay = v),
            "distanceModel" => value.parse().ok().map(|v| self.distance_model = v),
            "maxDistance" => value.parse().ok().map(|v| self.max_distance = v),
            "loop" => parse_bool(value).map(|v| self.looping = v),
            "refDistance" => value.parse().ok().map(|v| self.ref_distance = v),
            "rolloffFactor" => value.parse().ok().map(|v| self.rolloff_factor = v),
            "src" => {
                self.src = value.to_string();
                Some(())
            }
            "volume" => value.parse().ok().map(|v| self.volume = v),
            "cone" => parse_bool(value).map(|v| self.cone = v),
            "coneInAngle" => value.parse().ok().map(|v| self.cone_in_angle = v),
            "coneOutAngle" => value.parse().ok().map(|v| self.cone_out_angle = v),
            "coneOutLevel" => value.parse().ok().map(|v| self.cone_out_level = v),
            "posHelper" => parse_bool(value).map(|v| self.pos_helper = v),
            "posColorIn" => {
                self.pos_color_in = value.to_string();
                Some(())
            }
            "posColorOut" => {
                self.pos_color_out = value.to_string();
                Some(())
            }
            _ => {
                warn!(key, "unknown sound-control property");
                return;
            }
        };
        if applied.is_none() {
            warn!(key, value, "malformed sound-control value, keeping default");
        }
    }

    /// Check critical fields and normalise the rest.
    ///
    /// A zero, negative or non-finite rolloff factor, and non-positive ref/max
    /// distances, are [`Error::Configuration`]. Volume, cone angles and cone
    /// level are clamped or reset to defaults instead.
    pub fn validated(mut self) -> Result<Self> {
        if !self.rolloff_factor.is_finite() || self.rolloff_factor <= 0.0 {
            return Err(Error::config(format!(
                "rolloffFactor must be a positive number, got {}",
                self.rolloff_factor
            )));
        }
        if !self.ref_distance.is_finite() || self.ref_distance <= 0.0 {
            return Err(Error::config(format!(
                "refDistance must be a positive number, got {}",
                self.ref_distance
            )));
        }
        if self.max_distance.is_nan() || self.max_distance <= 0.0 {
            return Err(Error::config(format!(
                "maxDistance must be a positive number, got {}",
                self.max_distance
            )));
        }

        let defaults = Self::default();
        if !self.volume.is_finite() || self.volume < 0.0 {
            warn!(volume = self.volume, "invalid volume, using default");
            self.volume = defaults.volume;
        }
        let cone = ConeAngles::clamped(self.cone_in_angle, self.cone_out_angle);
        self.cone_in_angle = cone.inner_deg;
        self.cone_out_angle = cone.outer_deg;
        self.cone_out_level = if self.cone_out_level.is_nan() {
            defaults.cone_out_level
        } else {
            self.cone_out_level.clamp(0.0, 1.0)
        };
        Ok(self)
    }

    /// Rim distance of the cone helper: `refDistance / rolloffFactor × 10`.
    pub fn helper_range(&self) -> Result<f32> {
        if self.rolloff_factor == 0.0 {
            return Err(Error::config("rolloffFactor of zero gives an undefined helper range"));
        }
        let range = self.ref_distance / self.rolloff_factor * HELPER_RANGE_SCALE;
        if !range.is_finite() {
            return Err(Error::config(format!("helper range is not finite ({range})")));
        }
        Ok(range)
    }

    /// Parsed helper colours `(inner, outer)`.
    pub fn helper_colors(&self) -> Result<(Color, Color)> {
        Ok((
            Color::parse(&self.pos_color_in)?,
            Color::parse(&self.pos_color_out)?,
        ))
    }

    /// Cone settings requested by this config, if `cone` is enabled.
    pub fn cone_settings(&self) -> Option<ConeSettings> {
        self.cone.then(|| ConeSettings {
            angles: ConeAngles::clamped(self.cone_in_angle, self.cone_out_angle),
            outer_gain: self.cone_out_level,
        })
    }

    /// Settings passed to the audio capability.
    pub fn source_settings(&self) -> SourceSettings {
        SourceSettings {
            autoplay: self.autoplay,
            distance_model: self.distance_model,
            looping: self.looping,
            max_distance: self.max_distance,
            ref_distance: self.ref_distance,
            rolloff_factor: self.rolloff_factor,
            src: self.src.clone(),
            volume: self.volume,
            cone: self.cone_settings(),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "1" => Some(true),
        "false" | "0" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_markup_schema() {
        let config = SoundControlConfig::default();
        assert!(!config.autoplay);
        assert_eq!(config.distance_model, DistanceModel::Exponential);
        assert_eq!(config.max_distance, 10000.0);
        assert_eq!(config.ref_distance, 40.0);
        assert_eq!(config.rolloff_factor, 8.0);
        assert_eq!(config.volume, 1.0);
        assert_eq!(config.cone_in_angle, 10.0);
        assert_eq!(config.cone_out_angle, 100.0);
        assert_eq!(config.pos_color_in, "red");
        assert_eq!(config.pos_color_out, "green");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: SoundControlConfig =
            serde_json::from_str(r#"{"src": "bell.ogg", "loop": true, "distanceModel": "linear"}"#)
                .unwrap();
        assert_eq!(config.src, "bell.ogg");
        assert!(config.looping);
        assert_eq!(config.distance_model, DistanceModel::Linear);
        assert_eq!(config.ref_distance, 40.0);
    }

    #[test]
    fn distance_model_deserializes_case_insensitively() {
        let config: SoundControlConfig =
            serde_json::from_str(r#"{"distanceModel": "Linear"}"#).unwrap();
        assert_eq!(config.distance_model, DistanceModel::Linear);
        assert!(serde_json::from_str::<DistanceModel>(r#""cubic""#).is_err());
        assert_eq!(serde_json::to_string(&DistanceModel::Inverse).unwrap(), r#""inverse""#);
    }

    #[test]
    fn properties_keep_defaults_for_malformed_values() {
        let config = SoundControlConfig::from_properties([
            ("src", "a.ogg"),
            ("volume", "loud"),
            ("refDistance", "12"),
        ]);
        assert_eq!(config.src, "a.ogg");
        assert_eq!(config.volume, 1.0);
        assert_eq!(config.ref_distance, 12.0);
    }

    #[test]
    fn attribute_string_sets_known_fields() {
        let config = SoundControlConfig::from_attribute_str(
            "src: drums.ogg; autoplay: true; refDistance: 20; rolloffFactor: 2; \
             coneInAngle: 30; posColorOut: #00ff00",
        );
        assert_eq!(config.src, "drums.ogg");
        assert!(config.autoplay);
        assert_eq!(config.ref_distance, 20.0);
        assert_eq!(config.rolloff_factor, 2.0);
        assert_eq!(config.cone_in_angle, 30.0);
        assert_eq!(config.pos_color_out, "#00ff00");
    }

    #[test]
    fn malformed_attribute_values_keep_defaults() {
        let config = SoundControlConfig::from_attribute_str(
            "volume: loud; loop: maybe; distanceModel: cubic; bogus: 1; noColon",
        );
        assert_eq!(config, SoundControlConfig::default());
    }

    #[test]
    fn zero_rolloff_is_a_configuration_error() {
        let config = SoundControlConfig {
            rolloff_factor: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.helper_range(), Err(Error::Configuration(_))));
        assert!(matches!(config.validated(), Err(Error::Configuration(_))));
    }

    #[test]
    fn non_positive_distances_are_rejected() {
        let bad_ref = SoundControlConfig {
            ref_distance: 0.0,
            ..Default::default()
        };
        assert!(bad_ref.validated().is_err());

        let bad_max = SoundControlConfig {
            max_distance: f32::NAN,
            ..Default::default()
        };
        assert!(bad_max.validated().is_err());
    }

    #[test]
    fn validation_normalises_non_critical_fields() {
        let config = SoundControlConfig {
            volume: -3.0,
            cone_in_angle: -10.0,
            cone_out_angle: 720.0,
            cone_out_level: 4.0,
            ..Default::default()
        }
        .validated()
        .unwrap();
        assert_eq!(config.volume, 1.0);
        assert_eq!(config.cone_in_angle, 0.0);
        assert_eq!(config.cone_out_angle, 360.0);
        assert_eq!(config.cone_out_level, 1.0);
    }

    #[test]
    fn helper_range_uses_ref_over_rolloff() {
        let config = SoundControlConfig::default();
        assert_eq!(config.helper_range().unwrap(), 50.0);
    }

    #[test]
    fn cone_settings_only_when_enabled() {
        let mut config = SoundControlConfig::default();
        assert!(config.source_settings().cone.is_none());

        config.cone = true;
        config.cone_out_level = 0.25;
        let cone = config.source_settings().cone.unwrap();
        assert_eq!(cone.angles, ConeAngles::clamped(10.0, 100.0));
        assert_eq!(cone.outer_gain, 0.25);
    }

    #[test]
    fn distance_model_parses_case_insensitively() {
        assert_eq!("Linear".parse::<DistanceModel>().unwrap(), DistanceModel::Linear);
        assert!(matches!(
            "cubic".parse::<DistanceModel>(),
            Err(Error::Configuration(_))
        ));
        assert_eq!(DistanceModel::Inverse.to_string(), "inverse");
    }
}
