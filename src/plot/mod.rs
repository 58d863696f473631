//! Chart renderers.
//!
//! - terminal text (`ascii`)
//! - SVG export (`svg`)
//!
//! The interactive chart lives with the TUI widgets.

pub mod ascii;
pub mod svg;

pub use ascii::*;
pub use svg::*;
