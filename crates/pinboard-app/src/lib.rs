//! Pinboard application shell.
//!
//! A headless command-line front end over the core sync engine.

mod app;
pub mod cli;
mod loader;

pub use app::{App, AppConfig, AppError};
pub use loader::FsImageLoader;
