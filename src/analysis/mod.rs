//! Report analysis stages.
//!
//! - trailing-window filtering of the loaded table (`window`)
//! - density estimation and peak location (`density`)

pub mod density;
pub mod window;

pub use density::*;
pub use window::*;
