//! In-process scene implementation.

use super::{ObjectHandle, Scene, SceneError, SceneObject};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Marks a scene as torn down from outside the code that owns it.
///
/// Hosts keep one in their teardown callback; pending image loads check the
/// scene before inserting.
#[derive(Debug, Clone)]
pub struct TeardownHandle {
    disposed: Arc<AtomicBool>,
}

impl TeardownHandle {
    pub fn teardown(&self) {
        self.disposed.store(true, Ordering::SeqCst);
    }

    pub fn is_torn_down(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

/// Scene held entirely in memory, in insertion (z-) order.
#[derive(Debug, Default)]
pub struct MemoryScene {
    objects: Vec<(ObjectHandle, SceneObject)>,
    next_handle: u64,
    active: Option<ObjectHandle>,
    disposed: Arc<AtomicBool>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle that disposes this scene when triggered.
    pub fn teardown_handle(&self) -> TeardownHandle {
        TeardownHandle {
            disposed: self.disposed.clone(),
        }
    }
}

impl Scene for MemoryScene {
    fn add(&mut self, object: SceneObject) -> Result<ObjectHandle, SceneError> {
        if self.is_disposed() {
            return Err(SceneError::Disposed);
        }
        let handle = ObjectHandle(self.next_handle);
        self.next_handle += 1;
        self.objects.push((handle, object));
        Ok(handle)
    }

    fn remove(&mut self, handle: ObjectHandle) -> Option<SceneObject> {
        let index = self.objects.iter().position(|(h, _)| *h == handle)?;
        if self.active == Some(handle) {
            self.active = None;
        }
        Some(self.objects.remove(index).1)
    }

    fn get(&self, handle: ObjectHandle) -> Option<&SceneObject> {
        self.objects
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|(_, o)| o)
    }

    fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut SceneObject> {
        self.objects
            .iter_mut()
            .find(|(h, _)| *h == handle)
            .map(|(_, o)| o)
    }

    fn find_by_tag(&self, tag: &str) -> Option<ObjectHandle> {
        self.objects
            .iter()
            .find(|(_, o)| o.tag.as_deref() == Some(tag))
            .map(|(h, _)| *h)
    }

    fn len(&self) -> usize {
        self.objects.len()
    }

    fn active(&self) -> Option<ObjectHandle> {
        self.active
    }

    fn set_active(&mut self, handle: Option<ObjectHandle>) {
        // Only present objects can be selected.
        self.active = handle.filter(|h| self.objects.iter().any(|(o, _)| o == h));
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    fn dispose(&mut self) {
        self.disposed.store(true, Ordering::SeqCst);
        self.objects.clear();
        self.active = None;
    }
}
