//! Scene-graph collaborator boundary.
//!
//! Rendering, hit-testing and selection handles belong to the host's 2D
//! scene library. This module fixes the surface the sync layer needs from
//! it: per-kind live objects with a transform model, an opaque tag slot,
//! the six change events, and insertion/removal by handle.

mod memory;
mod object;

pub use memory::{MemoryScene, TeardownHandle};
pub use object::{ClipMask, ObjectBody, SceneObject};

use thiserror::Error;

/// Scene errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("Scene has been disposed")]
    Disposed,
    #[error("Scene rejected object: {0}")]
    Rejected(String),
}

/// Opaque handle to an object owned by the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectHandle(pub u64);

/// Change events emitted by the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneEvent {
    SelectionCreated,
    SelectionUpdated,
    SelectionCleared,
    ObjectModified,
    ObjectResizing,
    ObjectRotating,
}

impl SceneEvent {
    /// Every event the sync controller listens to.
    pub const ALL: [SceneEvent; 6] = [
        SceneEvent::SelectionCreated,
        SceneEvent::SelectionUpdated,
        SceneEvent::SelectionCleared,
        SceneEvent::ObjectModified,
        SceneEvent::ObjectResizing,
        SceneEvent::ObjectRotating,
    ];

    /// Event name as emitted by the scene library.
    pub fn name(&self) -> &'static str {
        match self {
            SceneEvent::SelectionCreated => "selection:created",
            SceneEvent::SelectionUpdated => "selection:updated",
            SceneEvent::SelectionCleared => "selection:cleared",
            SceneEvent::ObjectModified => "object:modified",
            SceneEvent::ObjectResizing => "object:resizing",
            SceneEvent::ObjectRotating => "object:rotating",
        }
    }

    /// Parse an event name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.name() == name)
    }
}

impl std::fmt::Display for SceneEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A live scene the sync controller inserts into and observes.
///
/// The scene owns object lifetime; callers only hold handles.
pub trait Scene {
    /// Insert an object on top of the z-order.
    fn add(&mut self, object: SceneObject) -> Result<ObjectHandle, SceneError>;

    /// Remove an object, returning it if it was present.
    fn remove(&mut self, handle: ObjectHandle) -> Option<SceneObject>;

    fn get(&self, handle: ObjectHandle) -> Option<&SceneObject>;

    fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut SceneObject>;

    /// Find the first object carrying `tag`.
    fn find_by_tag(&self, tag: &str) -> Option<ObjectHandle>;

    /// Number of live objects.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Currently selected object, if any.
    fn active(&self) -> Option<ObjectHandle>;

    fn set_active(&mut self, handle: Option<ObjectHandle>);

    /// Whether the scene was torn down. A disposed scene accepts no objects.
    fn is_disposed(&self) -> bool;

    fn dispose(&mut self);
}
