//! Positional audio capability consumed by sound controls.

use bevy_ecs::system::Resource;
use serde::Serialize;
use soundstage_core::{ConeAngles, Result};

use crate::config::SourceSettings;
use crate::panner::ConeSettings;

/// Opaque handle to a source created by the capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SourceHandle(pub u32);

/// A playable instance belonging to a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct InstanceHandle {
    /// Owning source.
    pub source: SourceHandle,
    /// Position in the source's instance pool.
    pub index: u32,
}

/// Host audio engine able to create and drive positional sources.
///
/// Sources belong to the host. Controllers only hold handles and issue commands.
pub trait PositionalAudio: Send + Sync {
    /// Create and configure a source.
    fn create_source(&mut self, settings: &SourceSettings) -> Result<SourceHandle>;

    /// Start playback from the beginning.
    fn play(&mut self, source: SourceHandle);

    /// Stop playback.
    fn stop(&mut self, source: SourceHandle);

    /// Whether the source is currently playing.
    fn is_playing(&self, source: SourceHandle) -> bool;

    /// Current panner cone of the source.
    fn cone(&self, source: SourceHandle) -> Option<ConeSettings>;

    /// Replace the panner cone. Angles are clamped to `[0, 360]`.
    fn set_cone(&mut self, source: SourceHandle, cone: ConeSettings);

    /// Deterministic primary instance used to anchor visual helpers.
    fn primary_instance(&self, source: SourceHandle) -> Option<InstanceHandle>;

    /// Current cone angles in degrees.
    fn cone_angles(&self, source: SourceHandle) -> Option<ConeAngles> {
        self.cone(source).map(|cone| cone.angles)
    }
}

/// Scene resource holding the active audio capability.
#[derive(Resource)]
pub struct AudioHost {
    backend: Box<dyn PositionalAudio>,
}

impl AudioHost {
    /// Wrap a backend.
    pub fn new(backend: impl PositionalAudio + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Shared access to the backend.
    pub fn backend(&self) -> &dyn PositionalAudio {
        self.backend.as_ref()
    }

    /// Mutable access to the backend.
    pub fn backend_mut(&mut self) -> &mut dyn PositionalAudio {
        self.backend.as_mut()
    }
}
