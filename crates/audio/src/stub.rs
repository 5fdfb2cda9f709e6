//! In-memory audio capability for headless runs and tests.

use glam::Vec3;
use serde::Serialize;
use soundstage_core::{ConeAngles, Result};
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::backend::{InstanceHandle, PositionalAudio, SourceHandle};
use crate::config::SourceSettings;
use crate::panner::{angle_to_listener, cone_gain, distance_gain, ConeSettings};

/// Command issued to the capability.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AudioCommand {
    /// A source was created.
    Create {
        /// New source.
        source: SourceHandle,
        /// Clip locator.
        src: String,
    },
    /// Playback started.
    Play {
        /// Target source.
        source: SourceHandle,
    },
    /// Playback stopped.
    Stop {
        /// Target source.
        source: SourceHandle,
    },
    /// The panner cone changed.
    SetCone {
        /// Target source.
        source: SourceHandle,
        /// Applied cone.
        cone: ConeSettings,
    },
}

/// Shared, clonable command log.
#[derive(Debug, Clone, Default)]
pub struct AudioLog {
    commands: Arc<Mutex<Vec<AudioCommand>>>,
}

impl AudioLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, command: AudioCommand) {
        if let Ok(mut commands) = self.commands.lock() {
            commands.push(command);
        }
    }

    /// Snapshot of all commands so far.
    pub fn commands(&self) -> Vec<AudioCommand> {
        self.commands
            .lock()
            .map(|commands| commands.clone())
            .unwrap_or_default()
    }

    /// Drop all recorded commands.
    pub fn clear(&self) {
        if let Ok(mut commands) = self.commands.lock() {
            commands.clear();
        }
    }

    /// Number of `Play` commands issued so far.
    pub fn play_count(&self) -> usize {
        self.commands()
            .iter()
            .filter(|command| matches!(command, AudioCommand::Play { .. }))
            .count()
    }
}

#[derive(Debug, Clone)]
struct StubSource {
    settings: SourceSettings,
    cone: ConeSettings,
    playing: bool,
    position: Vec3,
    forward: Vec3,
}

/// Audio capability that tracks state without producing sound.
#[derive(Debug, Default)]
pub struct StubAudio {
    sources: Vec<StubSource>,
    log: Option<AudioLog>,
}

impl StubAudio {
    /// Create a stub without a command log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stub that records every command into `log`.
    pub fn with_log(log: AudioLog) -> Self {
        Self {
            sources: Vec::new(),
            log: Some(log),
        }
    }

    /// Number of sources created.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Place a source in the scene. Unknown handles are ignored.
    pub fn set_transform(&mut self, source: SourceHandle, position: Vec3, forward: Vec3) {
        if let Some(state) = self.source_mut(source) {
            state.position = position;
            state.forward = forward;
        }
    }

    /// Effective gain of `source` heard from `listener`.
    pub fn effective_gain(&self, source: SourceHandle, listener: Vec3) -> Option<f32> {
        let state = self.source(source)?;
        let settings = &state.settings;
        let distance = state.position.distance(listener);
        let angle = angle_to_listener(state.position, state.forward, listener);
        Some(
            settings.volume
                * distance_gain(
                    settings.distance_model,
                    distance,
                    settings.ref_distance,
                    settings.max_distance,
                    settings.rolloff_factor,
                )
                * cone_gain(&state.cone, angle),
        )
    }

    fn source(&self, source: SourceHandle) -> Option<&StubSource> {
        self.sources.get(source.0 as usize)
    }

    fn source_mut(&mut self, source: SourceHandle) -> Option<&mut StubSource> {
        self.sources.get_mut(source.0 as usize)
    }

    fn record(&self, command: AudioCommand) {
        if let Some(log) = &self.log {
            log.push(command);
        }
    }
}

fn clamp_cone(cone: ConeSettings) -> ConeSettings {
    ConeSettings {
        angles: ConeAngles::clamped(cone.angles.inner_deg, cone.angles.outer_deg),
        outer_gain: cone.outer_gain.clamp(0.0, 1.0),
    }
}

impl PositionalAudio for StubAudio {
    fn create_source(&mut self, settings: &SourceSettings) -> Result<SourceHandle> {
        let handle = SourceHandle(self.sources.len() as u32);
        let cone = settings.cone.map(clamp_cone).unwrap_or_default();
        self.sources.push(StubSource {
            settings: settings.clone(),
            cone,
            playing: settings.autoplay,
            position: Vec3::ZERO,
            forward: Vec3::Z,
        });
        debug!(?handle, src = %settings.src, autoplay = settings.autoplay, "stub source created");
        self.record(AudioCommand::Create {
            source: handle,
            src: settings.src.clone(),
        });
        Ok(handle)
    }

    fn play(&mut self, source: SourceHandle) {
        if let Some(state) = self.source_mut(source) {
            state.playing = true;
            self.record(AudioCommand::Play { source });
        }
    }

    fn stop(&mut self, source: SourceHandle) {
        if let Some(state) = self.source_mut(source) {
            state.playing = false;
            self.record(AudioCommand::Stop { source });
        }
    }

    fn is_playing(&self, source: SourceHandle) -> bool {
        self.source(source).map(|s| s.playing).unwrap_or(false)
    }

    fn cone(&self, source: SourceHandle) -> Option<ConeSettings> {
        self.source(source).map(|s| s.cone)
    }

    fn set_cone(&mut self, source: SourceHandle, cone: ConeSettings) {
        let cone = clamp_cone(cone);
        if let Some(state) = self.source_mut(source) {
            state.cone = cone;
            self.record(AudioCommand::SetCone { source, cone });
        }
    }

    fn primary_instance(&self, source: SourceHandle) -> Option<InstanceHandle> {
        self.source(source)
            .map(|_| InstanceHandle { source, index: 0 })
    }
}
