//! Pinboard Core Library
//!
//! Keeps a live, mutable scene of shapes in step with a flat, persisted list
//! of element records. Platform-agnostic: the scene library, image loading
//! and durable storage are collaborators behind traits.

pub mod assets;
pub mod color;
pub mod config;
pub mod controller;
pub mod factory;
pub mod ids;
pub mod record;
pub mod scene;
pub mod storage;
pub mod store;

pub use assets::{AssetError, BoxFuture, ImageLoader, LoadedImage, NoImages};
pub use config::{CanvasConfig, DEFAULT_STORAGE_KEY};
pub use controller::{AddError, LoadReport, ShapeKind, SyncController, SyncOutcome, SyncPhase};
pub use factory::ObjectFactory;
pub use ids::{IdGenerator, RandomSource, SplitMix64, UuidIds};
pub use record::{ElementKind, ElementRecord, RecordPatch, merge};
pub use scene::{ClipMask, MemoryScene, ObjectBody, ObjectHandle, Scene, SceneError, SceneEvent, SceneObject, TeardownHandle};
pub use storage::{KeyValueStore, MemoryStore, StorageError, StorageResult};
pub use store::{RecordError, RecordStore, SaveStatus};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStore;

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorageStore;
