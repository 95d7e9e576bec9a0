//! Core type definitions

mod placement;
mod pose;

pub use placement::*;
pub use pose::*;
