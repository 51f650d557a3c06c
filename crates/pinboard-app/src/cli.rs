//! Command-line interface.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Place, transform and persist shapes on a headless Pinboard canvas.
#[derive(Debug, Parser)]
#[command(name = "pinboard", version, about)]
pub struct Cli {
    /// Directory holding the persisted element list.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// JSON canvas configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AddKind {
    Circle,
    Rectangle,
    Random,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List elements in z-order.
    List,
    /// Show canvas settings and storage location.
    Info,
    /// Add a shape at a random position with a random fill.
    Add {
        #[arg(value_enum, default_value_t = AddKind::Random)]
        kind: AddKind,
    },
    /// Move an element.
    Move { id: String, left: f64, top: f64 },
    /// Scale an element.
    Scale { id: String, scale_x: f64, scale_y: f64 },
    /// Rotate an element to an angle in degrees.
    Rotate {
        id: String,
        #[arg(allow_negative_numbers = true)]
        angle: f64,
    },
    /// Replace the content of a text element.
    Text { id: String, content: String },
    /// Remove an element.
    Remove { id: String },
    /// Print the stored JSON payload.
    Dump,
}
