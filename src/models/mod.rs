//! Display models and client-side queries for CLI output
//!
//! API types are converted into display rows here, and the list commands
//! filter and sort through the query types before printing.

pub mod display;
pub mod filter;

pub use display::{NoteDisplay, ProblemDisplay};
pub use filter::{NoteQuery, NoteSort, ProblemQuery};
