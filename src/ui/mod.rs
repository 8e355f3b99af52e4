//! ui
//!
//! Everything the user sees.
//!
//! # Modules
//!
//! - [`output`] - Status, warning and error lines
//! - [`report`] - Rendering of a finished run

pub mod output;
pub mod report;
