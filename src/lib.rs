#![deny(trivial_casts)]
#![warn(
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
    missing_docs,
    missing_debug_implementations,
    unused_import_braces,
    unused_lifetimes,
    unused_qualifications
)]

//!
//! Pixelnote is a small pixel grid editor which stores free-text annotations for single pixels.
//!
//! Canvases are persisted as regular PPM files (either the textual `P3` or the binary `P6` variant)
//! with the annotations embedded as comment lines between the magic number and the dimension line.
//! Any PPM viewer is therefore able to display the pixel data while this library is able to restore
//! the annotations as well.
//!

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

pub mod canvas;
pub mod editor;
pub mod ppm;

pub use canvas::{Color, Coordinate, MetadataMap, PixelCanvas};
pub use editor::{EditorSession, Tool};
pub use ppm::{decode, encode, DecodedImage, FormatError, Variant};
