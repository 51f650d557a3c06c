//! Sync controller: the bridge between scene events and persisted records.
//!
//! The controller is the only writer of records during a session. It keeps
//! one index from logical id to live object handle, and updates that index
//! together with the record store inside a single method per mutation so
//! the live scene and the persisted list cannot drift apart.

use crate::assets::{AssetError, ImageLoader};
use crate::color::random_hex_color;
use crate::config::CanvasConfig;
use crate::factory::ObjectFactory;
use crate::ids::{IdGenerator, RandomSource, SplitMix64, UuidIds};
use crate::record::{ElementKind, ElementRecord, RecordPatch, merge};
use crate::scene::{ObjectBody, ObjectHandle, Scene, SceneError, SceneEvent, SceneObject};
use crate::storage::KeyValueStore;
use crate::store::{RecordError, RecordStore, SaveStatus};
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use std::collections::HashMap;
use thiserror::Error;

/// Errors from creating a new shape.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddError {
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Asset(#[from] AssetError),
}

/// Shapes that can be created interactively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Circle,
    Rectangle,
}

impl From<ShapeKind> for ElementKind {
    fn from(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Circle => ElementKind::Circle,
            ShapeKind::Rectangle => ElementKind::Rectangle,
        }
    }
}

/// Per-object sync state.
///
/// `Changing` persists past an event only when the durable write failed: the
/// record holds the change but storage does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    #[default]
    Idle,
    Changing,
    Committed,
}

/// Result of handling one scene event or edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Listeners are detached; the event was ignored.
    Detached,
    /// Nothing is selected.
    NoTarget,
    /// The target carries no logical id.
    Untracked,
    /// The target's id has no record.
    LookupMiss(String),
    /// The record already matches the live object.
    Unchanged(String),
    /// The record was updated.
    Committed { id: String, status: SaveStatus },
    /// The edit does not apply to this record's kind.
    WrongKind(String),
}

/// What happened to each stored record during [`SyncController::load_scene`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Ids inserted into the scene, in insertion order.
    pub inserted: Vec<String>,
    /// Ids whose live object could not be built or inserted.
    pub skipped: Vec<String>,
    /// Ids whose image resolved after the scene was torn down.
    pub discarded: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
struct LiveEntry {
    handle: ObjectHandle,
    phase: SyncPhase,
}

/// Keeps a live scene and a persisted element list in step.
pub struct SyncController<S: KeyValueStore, G: Scene> {
    config: CanvasConfig,
    store: RecordStore<S>,
    scene: G,
    factory: ObjectFactory,
    ids: Box<dyn IdGenerator>,
    rng: Box<dyn RandomSource>,
    live: HashMap<String, LiveEntry>,
    decoration: Option<ObjectHandle>,
    listening: bool,
}

impl<S: KeyValueStore, G: Scene> SyncController<S, G> {
    /// Create a controller with UUID ids and an entropy-seeded random source.
    pub fn new(config: CanvasConfig, storage: S, scene: G, loader: Box<dyn ImageLoader>) -> Self {
        let store = RecordStore::new(storage, config.storage_key.clone());
        let factory = ObjectFactory::new(&config, loader);
        Self {
            config,
            store,
            scene,
            factory,
            ids: Box::new(UuidIds),
            rng: Box::new(SplitMix64::from_entropy()),
            live: HashMap::new(),
            decoration: None,
            listening: false,
        }
    }

    /// Replace the id generator.
    pub fn with_id_generator(mut self, ids: Box<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Replace the random source used for placement and colors.
    pub fn with_random_source(mut self, rng: Box<dyn RandomSource>) -> Self {
        self.rng = rng;
        self
    }

    /// Build live objects for every record and start listening.
    ///
    /// The first call reads durable storage. Later calls rebuild the scene
    /// from the in-memory list, which stays authoritative for the session
    /// even when earlier writes failed.
    ///
    /// Synchronous kinds are inserted first in list order, then the decorative
    /// signature polygon. Image loads all start together and each image is
    /// inserted as soon as its own load resolves, so images may land out of
    /// list order. A failed image is skipped without affecting the rest; its
    /// record stays in the store.
    pub async fn load_scene(&mut self) -> LoadReport {
        self.clear_live();
        let records = if self.store.is_loaded() {
            self.store.records().to_vec()
        } else {
            self.store.load().to_vec()
        };
        self.listening = true;
        log::debug!(
            "Listening for {}",
            SceneEvent::ALL.map(|e| e.name()).join(", ")
        );

        let mut report = LoadReport::default();
        let mut deferred = Vec::new();
        for record in &records {
            if ObjectFactory::is_deferred(record) {
                deferred.push(record);
                continue;
            }
            match self.factory.build(record, None) {
                Ok(object) => Self::insert_live(&mut self.scene, &mut self.live, &record.id, object, &mut report),
                Err(e) => {
                    log::warn!("Skipping element {}: {}", record.id, e);
                    report.skipped.push(record.id.clone());
                }
            }
        }

        self.decorate(records.get(2));

        let factory = &self.factory;
        let mut pending: FuturesUnordered<_> = deferred
            .into_iter()
            .map(move |record| async move { (record, factory.instantiate(record).await) })
            .collect();

        while let Some((record, loaded)) = pending.next().await {
            match loaded {
                Ok(_) if self.scene.is_disposed() => {
                    log::debug!("Scene torn down, discarding image {}", record.id);
                    report.discarded.push(record.id.clone());
                }
                Ok(object) => Self::insert_live(&mut self.scene, &mut self.live, &record.id, object, &mut report),
                Err(e) => {
                    log::warn!("Skipping element {}: {}", record.id, e);
                    report.skipped.push(record.id.clone());
                }
            }
        }

        log::info!(
            "Scene loaded: {} inserted, {} skipped, {} discarded",
            report.inserted.len(),
            report.skipped.len(),
            report.discarded.len()
        );
        report
    }

    /// Copy the active object's placement into its record.
    ///
    /// Writes to storage only when the record actually changes.
    pub fn handle_event(&mut self, event: SceneEvent) -> SyncOutcome {
        if !self.listening {
            return SyncOutcome::Detached;
        }
        let Some(handle) = self.scene.active() else {
            return SyncOutcome::NoTarget;
        };
        let Some(object) = self.scene.get(handle) else {
            return SyncOutcome::NoTarget;
        };
        let Some(id) = object.tag.clone() else {
            return SyncOutcome::Untracked;
        };
        let patch = ObjectFactory::extract(object);
        let Some(existing) = self.store.get(&id) else {
            log::trace!("{} for {} has no record", event, id);
            return SyncOutcome::LookupMiss(id);
        };

        let candidate = merge(existing, &patch);
        let unchanged = candidate == *existing;

        // Fields merge refused are reset on the live object.
        if ObjectFactory::placement_of(&candidate) != patch {
            log::warn!("Rejected placement for {} on {}, restoring", id, event);
            if let Some(object) = self.scene.get_mut(handle) {
                ObjectFactory::place(object, &candidate);
            }
        }

        if unchanged {
            return SyncOutcome::Unchanged(id);
        }
        self.commit(id, candidate, event)
    }

    /// Create a shape with random position and fill, insert it and persist it.
    ///
    /// The live object is built and inserted before the record is appended;
    /// if the append is refused the live object is removed again.
    pub fn add_shape(&mut self, kind: ShapeKind) -> Result<String, AddError> {
        let id = self.ids.next_id();
        let extent = self.config.spawn_extent;
        let left = self.rng.next_f64() * extent;
        let top = self.rng.next_f64() * extent;
        let fill = random_hex_color(self.rng.as_mut());

        let record = match kind {
            ShapeKind::Circle => ElementRecord::circle(id.clone(), self.config.default_radius),
            ShapeKind::Rectangle => {
                let size = self.config.default_rect_size;
                ElementRecord::rectangle(id.clone(), size, size)
            }
        }
        .at(left, top)
        .with_fill(fill);

        let object = self.factory.build(&record, None)?;
        let handle = self.scene.add(object)?;
        match self.store.append(record) {
            Ok(status) => {
                self.live.insert(
                    id.clone(),
                    LiveEntry {
                        handle,
                        phase: SyncPhase::Idle,
                    },
                );
                log::info!("Added {} {} ({:?})", ElementKind::from(kind), id, status);
                Ok(id)
            }
            Err(e) => {
                self.scene.remove(handle);
                Err(e.into())
            }
        }
    }

    /// Add a circle or a rectangle with equal probability.
    pub fn add_random_shape(&mut self) -> Result<String, AddError> {
        let kind = if self.rng.next_f64() > 0.5 {
            ShapeKind::Circle
        } else {
            ShapeKind::Rectangle
        };
        self.add_shape(kind)
    }

    /// Replace the content of a text element in both the scene and the record.
    pub fn set_text(&mut self, id: &str, content: &str) -> SyncOutcome {
        let Some(existing) = self.store.get(id) else {
            return SyncOutcome::LookupMiss(id.to_string());
        };
        if existing.kind != ElementKind::Text {
            return SyncOutcome::WrongKind(id.to_string());
        }
        let patch = RecordPatch {
            text: Some(content.to_string()),
            ..Default::default()
        };
        let candidate = merge(existing, &patch);
        let unchanged = candidate == *existing;

        if let Some(entry) = self.live.get(id) {
            if let Some(object) = self.scene.get_mut(entry.handle) {
                if let ObjectBody::Text { content: live, .. } = &mut object.body {
                    *live = content.to_string();
                }
            }
        }

        if unchanged {
            return SyncOutcome::Unchanged(id.to_string());
        }
        self.commit(id.to_string(), candidate, SceneEvent::ObjectModified)
    }

    /// Remove an element's live object and its record.
    ///
    /// Returns the removed record and what happened to the durable copy.
    pub fn remove_element(&mut self, id: &str) -> Option<(ElementRecord, SaveStatus)> {
        if let Some(entry) = self.live.remove(id) {
            self.scene.remove(entry.handle);
        }
        let (record, status) = self.store.remove(id)?;
        log::info!("Removed element {} ({:?})", id, status);
        Some((record, status))
    }

    /// Detach listeners and dispose the scene. Records are kept.
    pub fn teardown(&mut self) {
        self.listening = false;
        self.live.clear();
        self.decoration = None;
        self.scene.dispose();
    }

    /// Records in z-order.
    pub fn records(&self) -> &[ElementRecord] {
        self.store.records()
    }

    pub fn store(&self) -> &RecordStore<S> {
        &self.store
    }

    pub fn scene(&self) -> &G {
        &self.scene
    }

    /// Mutable scene access, for the host's interactive edits.
    pub fn scene_mut(&mut self) -> &mut G {
        &mut self.scene
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Handle of the live object backing `id`.
    pub fn live_handle(&self, id: &str) -> Option<ObjectHandle> {
        self.live.get(id).map(|e| e.handle)
    }

    pub fn phase(&self, id: &str) -> Option<SyncPhase> {
        self.live.get(id).map(|e| e.phase)
    }

    /// Handle of the decorative signature polygon, if inserted.
    pub fn decoration(&self) -> Option<ObjectHandle> {
        self.decoration
    }

    fn commit(&mut self, id: String, candidate: ElementRecord, event: SceneEvent) -> SyncOutcome {
        self.transition(&id, SyncPhase::Changing, event);
        let status = self.store.update(candidate).unwrap_or(SaveStatus::Unchanged);
        if status != SaveStatus::Failed {
            self.transition(&id, SyncPhase::Committed, event);
            self.transition(&id, SyncPhase::Idle, event);
        }
        SyncOutcome::Committed { id, status }
    }

    fn transition(&mut self, id: &str, phase: SyncPhase, event: SceneEvent) {
        if let Some(entry) = self.live.get_mut(id) {
            log::trace!("{} {:?} -> {:?} on {}", id, entry.phase, phase, event);
            entry.phase = phase;
        }
    }

    fn insert_live(
        scene: &mut G,
        live: &mut HashMap<String, LiveEntry>,
        id: &str,
        object: SceneObject,
        report: &mut LoadReport,
    ) {
        match scene.add(object) {
            Ok(handle) => {
                live.insert(
                    id.to_string(),
                    LiveEntry {
                        handle,
                        phase: SyncPhase::Idle,
                    },
                );
                report.inserted.push(id.to_string());
            }
            Err(SceneError::Disposed) => {
                log::debug!("Scene disposed, dropping {}", id);
                report.discarded.push(id.to_string());
            }
            Err(e) => {
                log::warn!("Scene refused element {}: {}", id, e);
                report.skipped.push(id.to_string());
            }
        }
    }

    fn decorate(&mut self, anchor: Option<&ElementRecord>) {
        let object = ObjectFactory::signature_decoration(self.ids.next_id(), anchor);
        match self.scene.add(object) {
            Ok(handle) => self.decoration = Some(handle),
            Err(e) => log::debug!("Skipping signature decoration: {}", e),
        }
    }

    fn clear_live(&mut self) {
        for (_, entry) in self.live.drain() {
            self.scene.remove(entry.handle);
        }
        if let Some(handle) = self.decoration.take() {
            self.scene.remove(handle);
        }
    }
}
