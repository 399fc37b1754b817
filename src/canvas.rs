//!
//! In-memory representation of an editable canvas
//!
//! A canvas consists of a fully populated grid of [`Color`] values together with a sparse
//! [`MetadataMap`] holding annotations for single pixels.
//!

mod color;
mod metadata;
mod storage;

pub use color::{Color, ColorParseError};
pub use metadata::{Coordinate, MetadataMap};
pub use storage::{InvalidPixelDataError, InvalidSizeError, PixelCanvas};
