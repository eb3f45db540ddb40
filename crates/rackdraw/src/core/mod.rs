//! Core building blocks shared by every rackdraw component
//!
//! The vector canvas and its SVG serialisation, geometry and color types,
//! configuration, errors and logging.

mod canvas;
mod config;
mod error;
pub mod logging;
pub mod svg;
mod text;
mod types;

pub use canvas::*;
pub use config::*;
pub use error::*;
pub use logging::*;
pub use text::*;
pub use types::*;
