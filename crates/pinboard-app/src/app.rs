//! Headless application shell.
//!
//! Drives a [`SyncController`] over an in-memory scene and file-backed
//! storage. Each edit command plays the same event sequence an interactive
//! canvas would: select, transform, release.

use crate::cli::{AddKind, Command};
use crate::loader::FsImageLoader;
use pinboard_core::{
    AddError, CanvasConfig, FileStore, KeyValueStore, MemoryScene, Scene, SceneEvent, SceneObject, ShapeKind,
    StorageError, SyncController, SyncOutcome,
};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Failed to read config {path}: {source}")]
    ConfigIo { path: PathBuf, source: std::io::Error },
    #[error("Invalid config {path}: {source}")]
    ConfigParse { path: PathBuf, source: serde_json::Error },
    #[error("Failed to add element: {0}")]
    Add(#[from] AddError),
    #[error("No element with id {0}")]
    UnknownElement(String),
    #[error("Element {0} is not a text element")]
    NotText(String),
}

/// Application configuration.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub canvas: CanvasConfig,
    /// Storage directory. Falls back to the platform data directory.
    pub data_dir: Option<PathBuf>,
    /// Base directory for relative image paths.
    pub asset_dir: PathBuf,
}

impl AppConfig {
    /// Build a configuration, reading canvas settings from `config_path` if given.
    pub fn load(config_path: Option<&Path>, data_dir: Option<PathBuf>) -> Result<Self, AppError> {
        let canvas = match config_path {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|source| AppError::ConfigIo {
                    path: path.to_path_buf(),
                    source,
                })?;
                CanvasConfig::from_json(&json).map_err(|source| AppError::ConfigParse {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            None => CanvasConfig::default(),
        };
        let asset_dir = data_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        Ok(Self {
            canvas,
            data_dir,
            asset_dir,
        })
    }
}

/// Main application struct.
pub struct App {
    controller: SyncController<FileStore, MemoryScene>,
}

impl App {
    /// Open storage and rebuild the scene from it.
    pub fn with_config(config: AppConfig) -> Result<Self, AppError> {
        let storage = match &config.data_dir {
            Some(dir) => FileStore::new(dir.clone())?,
            None => FileStore::default_location()?,
        };
        log::info!("Using storage at {}", storage.base_path().display());

        let loader = FsImageLoader::new(config.asset_dir);
        let mut controller = SyncController::new(config.canvas, storage, MemoryScene::new(), Box::new(loader));
        let report = pollster::block_on(controller.load_scene());
        for id in &report.skipped {
            log::warn!("Element {} is stored but not shown", id);
        }
        Ok(Self { controller })
    }

    pub fn controller(&self) -> &SyncController<FileStore, MemoryScene> {
        &self.controller
    }

    /// Run one command and return its printable output.
    pub fn execute(&mut self, command: Command) -> Result<String, AppError> {
        match command {
            Command::List => Ok(self.list()),
            Command::Info => Ok(self.info()),
            Command::Add { kind } => {
                let id = match kind {
                    AddKind::Circle => self.controller.add_shape(ShapeKind::Circle)?,
                    AddKind::Rectangle => self.controller.add_shape(ShapeKind::Rectangle)?,
                    AddKind::Random => self.controller.add_random_shape()?,
                };
                Ok(id)
            }
            Command::Move { id, left, top } => {
                let outcome = self.edit(&id, SceneEvent::ObjectModified, |object| object.move_to(left, top))?;
                Ok(describe(&outcome))
            }
            Command::Scale { id, scale_x, scale_y } => {
                let outcome = self.edit(&id, SceneEvent::ObjectResizing, |object| {
                    object.scale_to(scale_x, scale_y)
                })?;
                Ok(describe(&outcome))
            }
            Command::Rotate { id, angle } => {
                let outcome = self.edit(&id, SceneEvent::ObjectRotating, |object| object.rotate_to(angle))?;
                Ok(describe(&outcome))
            }
            Command::Text { id, content } => match self.controller.set_text(&id, &content) {
                SyncOutcome::LookupMiss(id) => Err(AppError::UnknownElement(id)),
                SyncOutcome::WrongKind(id) => Err(AppError::NotText(id)),
                outcome => Ok(describe(&outcome)),
            },
            Command::Remove { id } => match self.controller.remove_element(&id) {
                Some((record, status)) => Ok(format!("removed {} {}: {:?}", record.kind, record.id, status)),
                None => Err(AppError::UnknownElement(id)),
            },
            Command::Dump => {
                let store = self.controller.store();
                Ok(store.storage().get(store.key())?.unwrap_or_else(|| "[]".to_string()))
            }
        }
    }

    /// Select `id`, mutate its live object, then release it.
    ///
    /// `event` fires after the mutation, followed by `object:modified` when
    /// the gesture was a continuous one.
    fn edit(
        &mut self,
        id: &str,
        event: SceneEvent,
        mutate: impl FnOnce(&mut SceneObject),
    ) -> Result<SyncOutcome, AppError> {
        let handle = self
            .controller
            .live_handle(id)
            .ok_or_else(|| AppError::UnknownElement(id.to_string()))?;

        self.controller.scene_mut().set_active(Some(handle));
        self.controller.handle_event(SceneEvent::SelectionCreated);

        if let Some(object) = self.controller.scene_mut().get_mut(handle) {
            mutate(object);
        }
        let mut outcome = self.controller.handle_event(event);
        if event != SceneEvent::ObjectModified {
            let released = self.controller.handle_event(SceneEvent::ObjectModified);
            if matches!(released, SyncOutcome::Committed { .. }) {
                outcome = released;
            }
        }

        self.controller.scene_mut().set_active(None);
        self.controller.handle_event(SceneEvent::SelectionCleared);
        Ok(outcome)
    }

    fn info(&self) -> String {
        let config = self.controller.config();
        let store = self.controller.store();
        format!(
            "canvas {}x{} background {}\nstorage '{}' in {}\n{} elements, {} live objects",
            config.width,
            config.height,
            config.background,
            store.key(),
            store.storage().base_path().display(),
            store.len(),
            self.controller.scene().len(),
        )
    }

    fn list(&self) -> String {
        let mut out = String::new();
        for record in self.controller.records() {
            let shown = if self.controller.live_handle(&record.id).is_some() {
                ""
            } else {
                " (not shown)"
            };
            let _ = writeln!(
                out,
                "{} {:<9} left={:.1} top={:.1} scale={:.2}x{:.2} angle={:.1} fill={}{}",
                record.id,
                record.kind,
                record.left,
                record.top,
                record.scale_x,
                record.scale_y,
                record.angle,
                record.fill.as_deref().unwrap_or("-"),
                shown,
            );
        }
        out
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.controller.teardown();
    }
}

fn describe(outcome: &SyncOutcome) -> String {
    match outcome {
        SyncOutcome::Committed { id, status } => format!("{id}: {status:?}"),
        SyncOutcome::Unchanged(id) => format!("{id}: unchanged"),
        other => format!("{other:?}"),
    }
}
