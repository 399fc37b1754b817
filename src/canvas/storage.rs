use super::{Color, Coordinate, MetadataMap};
use thiserror::Error;

/// A fixed-size grid of pixels together with the annotations attached to them
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PixelCanvas {
    pixels: Vec<Color>,
    metadata: MetadataMap,
    width: usize,
    height: usize,
}

/// An error which indicates that a canvas of a given size cannot be constructed
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
#[error("Given size {}x{} is not valid for constructing a canvas: {details}", .size.0, .size.1)]
pub struct InvalidSizeError {
    size: (usize, usize),
    details: &'static str,
}

/// An error which indicates that raw pixel data does not fit the size of a canvas
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
#[error("Got {actual} pixels but a canvas of size {}x{} requires {required}", .size.0, .size.1)]
pub struct InvalidPixelDataError {
    size: (usize, usize),
    required: usize,
    actual: usize,
}

impl PixelCanvas {
    /// Create a new all-white canvas without any annotations
    pub fn new(width: usize, height: usize) -> Result<Self, InvalidSizeError> {
        if width == 0 || height == 0 {
            return Err(InvalidSizeError {
                size: (width, height),
                details: "Width and Height must both be greater than 0",
            });
        }
        let Some(len) = width.checked_mul(height) else {
            return Err(InvalidSizeError {
                size: (width, height),
                details: "Number of pixels overflows the address space",
            });
        };

        Ok(Self {
            pixels: vec![Color::WHITE; len],
            metadata: MetadataMap::new(),
            width,
            height,
        })
    }

    /// Construct a canvas from already existing row-major pixel data and annotations.
    ///
    /// Annotations are taken as they are, even when they point at white pixels or outside of the grid.
    pub fn from_parts(
        width: usize,
        height: usize,
        pixels: Vec<Color>,
        metadata: MetadataMap,
    ) -> Result<Self, InvalidPixelDataError> {
        let err = |required| InvalidPixelDataError {
            size: (width, height),
            required,
            actual: pixels.len(),
        };
        let canvas = Self::new(width, height).map_err(|_| err(0))?;
        if pixels.len() != canvas.pixels.len() {
            return Err(err(canvas.pixels.len()));
        }

        Ok(Self {
            pixels,
            metadata,
            ..canvas
        })
    }

    /// Get the size of this canvas as `(width, height)` tuple
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Whether the given position lies on the grid
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        self.contains(x, y).then(|| y * self.width + x)
    }

    /// Get the color of the pixel at position (x,y).
    ///
    /// Positions outside of the grid read as white.
    pub fn get_pixel(&self, x: usize, y: usize) -> Color {
        self.index(x, y)
            .map(|i| self.pixels[i])
            .unwrap_or(Color::WHITE)
    }

    /// Set the pixel at position (x,y) to the specified color.
    ///
    /// Painting white erases the pixel which also drops its annotation.
    /// Positions outside of the grid are silently ignored.
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        let Some(i) = self.index(x, y) else {
            tracing::trace!("Ignoring paint outside of canvas at ({}, {})", x, y);
            return;
        };

        self.pixels[i] = color;
        if color.is_white() {
            self.metadata.remove(Coordinate::new(x, y));
        }
    }

    /// Get the annotation attached to the pixel at position (x,y)
    pub fn get_annotation(&self, x: usize, y: usize) -> Option<&str> {
        if !self.contains(x, y) {
            return None;
        }
        self.metadata.get(Coordinate::new(x, y))
    }

    /// Attach an annotation to the pixel at position (x,y).
    ///
    /// Empty texts and positions outside of the grid leave the canvas unchanged.
    /// Returns whether the annotation was stored.
    pub fn set_annotation(&mut self, x: usize, y: usize, text: &str) -> bool {
        if text.is_empty() || !self.contains(x, y) {
            return false;
        }
        self.metadata.insert(Coordinate::new(x, y), text);
        true
    }

    /// Remove and return the annotation attached to the pixel at position (x,y)
    pub fn remove_annotation(&mut self, x: usize, y: usize) -> Option<String> {
        self.metadata.remove(Coordinate::new(x, y))
    }

    /// All pixels in row-major order
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// All annotations of this canvas
    pub fn metadata(&self) -> &MetadataMap {
        &self.metadata
    }

    /// Replace pixels and annotations with the ones of `other` as a whole
    pub fn replace_with(&mut self, other: PixelCanvas) {
        *self = other;
    }
}
