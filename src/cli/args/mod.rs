//! Shared CLI argument types
//!
//! This module contains reusable argument structs that can be flattened
//! into commands using `#[command(flatten)]`.

mod common;
mod global;
mod note;

pub use common::{NoteSort, OutputFormat};
pub use global::GlobalOptions;
pub use note::{NoteBodyArgs, build_request};
