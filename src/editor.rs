//!
//! Editing state that sits between a user interface and a [`PixelCanvas`]
//!
//! A UI translates pointer events into grid coordinates via [`grid_coordinate`] and then calls into an
//! [`EditorSession`] which knows the currently selected color and tool.
//!

use crate::canvas::{Color, Coordinate, InvalidSizeError, PixelCanvas};
use crate::ppm::{self, FormatError, Variant};
use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

/// The tool that is applied by [`EditorSession::primary_action`]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Tool {
    /// Paint with the current color
    Brush,
    /// Paint white which also drops annotations
    Eraser,
    /// Attach annotations instead of painting
    Annotate,
}

/// An editing session on a single canvas
#[derive(Debug, Clone)]
pub struct EditorSession {
    canvas: PixelCanvas,
    current_color: Color,
    annotation_mode: bool,
}

/// Translate a pointer position in screen pixels into a coordinate on a grid of `width` x `height` cells
/// which are each `pixel_size` screen pixels large.
///
/// Positions outside of the grid (including negative ones) yield `None`.
pub fn grid_coordinate(
    pointer_x: i32,
    pointer_y: i32,
    pixel_size: u32,
    width: usize,
    height: usize,
) -> Option<Coordinate> {
    let pixel_size = i32::try_from(pixel_size).ok().filter(|&size| size > 0)?;
    let x = usize::try_from(pointer_x.div_euclid(pixel_size)).ok()?;
    let y = usize::try_from(pointer_y.div_euclid(pixel_size)).ok()?;
    (x < width && y < height).then_some(Coordinate::new(x, y))
}

impl EditorSession {
    /// Start a session on a blank canvas, painting black
    pub fn new(width: usize, height: usize) -> Result<Self, InvalidSizeError> {
        Ok(Self {
            canvas: PixelCanvas::new(width, height)?,
            current_color: Color::BLACK,
            annotation_mode: false,
        })
    }

    /// The canvas that is being edited
    pub fn canvas(&self) -> &PixelCanvas {
        &self.canvas
    }

    /// The color that painting currently uses
    pub fn current_color(&self) -> Color {
        self.current_color
    }

    /// The tool that is currently active
    pub fn tool(&self) -> Tool {
        if self.annotation_mode {
            Tool::Annotate
        } else if self.current_color.is_white() {
            Tool::Eraser
        } else {
            Tool::Brush
        }
    }

    /// Select a color to paint with and leave annotation mode
    pub fn choose_color(&mut self, color: Color) {
        self.current_color = color;
        self.annotation_mode = false;
    }

    /// Select the eraser and leave annotation mode
    pub fn use_eraser(&mut self) {
        self.choose_color(Color::WHITE);
    }

    /// Switch annotation mode on or off.
    ///
    /// Returns whether annotation mode is active afterwards.
    pub fn toggle_annotation_mode(&mut self) -> bool {
        self.annotation_mode = !self.annotation_mode;
        self.annotation_mode
    }

    /// Paint the pixel at (x,y) with the current color.
    ///
    /// Any annotation of the pixel is dropped, no matter which color is painted.
    pub fn paint(&mut self, x: usize, y: usize) {
        if !self.canvas.contains(x, y) {
            return;
        }
        self.canvas.set_pixel(x, y, self.current_color);
        self.canvas.remove_annotation(x, y);
    }

    /// Attach an annotation to the pixel at (x,y).
    ///
    /// Returns whether the annotation was stored, which is not the case for empty texts or positions
    /// outside of the canvas.
    pub fn annotate(&mut self, x: usize, y: usize, text: &str) -> bool {
        self.canvas.set_annotation(x, y, text)
    }

    /// Apply the active tool at (x,y).
    ///
    /// In annotation mode `ask_text` is called to obtain the annotation. Returning `None` from it cancels
    /// the action. It is not called for positions outside of the canvas.
    pub fn primary_action<F>(&mut self, x: usize, y: usize, ask_text: F)
    where
        F: FnOnce(Coordinate) -> Option<String>,
    {
        if !self.annotation_mode {
            self.paint(x, y);
        } else if self.canvas.contains(x, y) {
            if let Some(text) = ask_text(Coordinate::new(x, y)) {
                self.annotate(x, y, &text);
            }
        }
    }

    /// All coordinates within the rectangle spanned by the two corners `from` and `to`, both inclusive.
    ///
    /// The rectangle is clipped to the canvas and its coordinates are returned in row-major order.
    pub fn selection(&self, from: Coordinate, to: Coordinate) -> Vec<Coordinate> {
        let (width, height) = self.canvas.size();
        let x_range = from.x.min(to.x)..=from.x.max(to.x).min(width - 1);
        let y_range = from.y.min(to.y)..=from.y.max(to.y).min(height - 1);
        y_range
            .flat_map(|y| x_range.clone().map(move |x| Coordinate::new(x, y)))
            .collect()
    }

    /// Paint the rectangle spanned by `from` and `to` with the current color and annotate every pixel of it
    /// with the same text.
    ///
    /// Without a text, existing annotations inside the rectangle are dropped.
    pub fn fill_area(&mut self, from: Coordinate, to: Coordinate, annotation: Option<&str>) {
        let selection = self.selection(from, to);
        tracing::debug!(
            "Filling {} pixels between {} and {} with {}",
            selection.len(),
            from,
            to,
            self.current_color
        );
        for Coordinate { x, y } in selection {
            self.paint(x, y);
            if let Some(text) = annotation {
                self.annotate(x, y, text);
            }
        }
    }

    /// The annotation that should be shown when hovering over (x,y)
    pub fn tooltip(&self, x: usize, y: usize) -> Option<&str> {
        self.canvas.get_annotation(x, y)
    }

    /// Write the canvas into `writer` using the given variant
    pub fn save_to<W: Write>(&self, writer: W, variant: Variant) -> std::io::Result<()> {
        ppm::encode_to(&self.canvas, variant, writer)
    }

    /// Replace the canvas with the one contained in `reader`.
    ///
    /// If the data cannot be decoded or describes a canvas of a different size, the session is left as it
    /// was. Returns the variant the data was written in.
    pub fn open_from<R: Read>(&mut self, reader: R) -> Result<Variant, FormatError> {
        ppm::read_into(reader, &mut self.canvas)
    }

    /// Save the canvas into a file at `path`, replacing any existing file
    pub fn save_file(&self, path: &Path, variant: Variant) -> anyhow::Result<()> {
        let file = File::create(path).with_context(|| format!("Could not create {}", path.display()))?;
        self.save_to(BufWriter::new(file), variant)
            .with_context(|| format!("Could not write canvas to {}", path.display()))?;
        tracing::info!("Saved canvas to {} as {}", path.display(), variant);
        Ok(())
    }

    /// Load the canvas from a file at `path`.
    ///
    /// See [`open_from`](Self::open_from) for the guarantees in case of failure.
    pub fn open_file(&mut self, path: &Path) -> anyhow::Result<Variant> {
        let file = File::open(path).with_context(|| format!("Could not open {}", path.display()))?;
        let variant = self
            .open_from(file)
            .with_context(|| format!("{} does not contain a compatible PPM file", path.display()))?;
        tracing::info!(
            "Opened {} ({} with {} annotations)",
            path.display(),
            variant,
            self.canvas.metadata().len()
        );
        Ok(variant)
    }
}
