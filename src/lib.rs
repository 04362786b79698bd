#[macro_use]
extern crate slog;

#[macro_use]
extern crate serde_derive;

pub mod colorimetry;
pub mod common;
pub mod dataset;
pub mod export;
pub mod normalize;
pub mod scene;

pub use common::{ExportError, Result};
