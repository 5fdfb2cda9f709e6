//! Positional sound controls for soundstage scenes.
//!
//! Wires a scene entity's positional audio source to click input and keeps a
//! wireframe of the source's directional cone next to it.
//!
//! # Architecture
//!
//! - [`SoundControl`] - Per-entity source with a cone helper, restarted on click
//! - [`SoundControlPool`] - Container that restarts all child controls on click
//! - [`PositionalAudio`] - Host audio capability, installed as the [`AudioHost`] resource
//! - [`StubAudio`] - In-memory capability for headless runs and tests
//!
//! # Example
//!
//! ```ignore
//! let mut scene = Scene::new();
//! scene.world_mut().insert_resource(AudioHost::new(StubAudio::new()));
//! let speaker = scene.spawn("speaker");
//! SoundControl::attach(&mut scene, speaker, SoundControlConfig::from_attribute_str("src: bell.ogg"))?;
//! scene.dispatch_click(speaker);
//! ```

mod backend;
mod config;
pub mod panner;
mod sound_control;
mod sound_pool;
mod stub;

pub use backend::{AudioHost, InstanceHandle, PositionalAudio, SourceHandle};
pub use config::{
    DistanceModel, SoundControlConfig, SourceSettings, HELPER_DIVISIONS, HELPER_RANGE_SCALE,
};
pub use panner::ConeSettings;
pub use sound_control::{play_sound, stop_sound, sync_helper, SoundControl};
pub use sound_pool::{play_children, SoundControlPool};
pub use stub::{AudioCommand, AudioLog, StubAudio};
