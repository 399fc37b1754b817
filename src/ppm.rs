//!
//! Reading and writing canvases as PPM files with embedded annotations
//!
//! The file layout follows the regular PPM format with one addition: every annotation of the canvas is
//! written as a comment line of the form `# Metadata: (<x>, <y>) <text>` right after the magic number.
//!
//! ```text
//! P3
//! # Metadata: Generated by PPM Editor
//! # Metadata: (0, 0) red
//! 2 2
//! 255
//! 255 0 0 0 255 0 0 0 255 255 255 255
//! ```
//!
//! Annotation texts are written verbatim, surrounding whitespace included. Texts containing a line feed
//! or ending with a carriage return therefore cannot be restored exactly.
//!

mod decoder;
mod encoder;
mod metadata_line;

use crate::canvas::{Color, InvalidPixelDataError, MetadataMap, PixelCanvas};
use std::fmt::{Display, Formatter};
use std::io::Read;
use std::str::FromStr;
use thiserror::Error;

pub use decoder::decode;
pub use encoder::{encode, encode_to};

/// Comment line which is written directly after the magic number of every file
pub const BANNER: &str = "# Metadata: Generated by PPM Editor";

/// The maximum channel value written into every file
pub const MAX_COLOR: u8 = 255;

/// The two supported ways of encoding pixel data
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Variant {
    /// Pixel channels are written as whitespace separated decimal numbers
    P3,
    /// Pixel channels are written as raw bytes
    P6,
}

impl Variant {
    /// The magic number which identifies this variant on the first line of a file
    pub fn magic(&self) -> &'static str {
        match self {
            Variant::P3 => "P3",
            Variant::P6 => "P6",
        }
    }

    /// Determine the variant from a (trimmed) magic line
    pub fn from_magic(magic: &[u8]) -> Option<Self> {
        match magic {
            b"P3" => Some(Variant::P3),
            b"P6" => Some(Variant::P6),
            _ => None,
        }
    }
}

impl Display for Variant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.magic())
    }
}

/// An error which indicates that a string names no supported [`Variant`]
#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("unknown PPM variant '{0}', expected P3 or P6")]
pub struct VariantParseError(String);

impl FromStr for Variant {
    type Err = VariantParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_magic(s.as_bytes()).ok_or_else(|| VariantParseError(s.to_string()))
    }
}

/// Errors that abort decoding a file.
///
/// None of them leave any partially decoded state behind.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The first line is neither `P3` nor `P6`
    #[error("unsupported magic number {0:?}, expected \"P3\" or \"P6\"")]
    UnsupportedMagic(String),
    /// The first non-comment line does not contain two positive integers
    #[error("malformed dimension line {0:?}")]
    MalformedDimensions(String),
    /// The line following the dimensions is not a positive integer
    #[error("malformed maximum color value {0:?}")]
    MalformedMaxColor(String),
    /// The file describes a canvas of a different size than the one it should be loaded into
    #[error(
        "file has dimensions {}x{} but the canvas is {}x{}",
        .found.0, .found.1, .expected.0, .expected.1
    )]
    DimensionMismatch {
        /// Size of the target canvas as `(width, height)`
        expected: (usize, usize),
        /// Size declared by the file as `(width, height)`
        found: (usize, usize),
    },
    /// Less pixel data is present than the dimensions require
    #[error("pixel data is truncated, expected {expected} channel values but got {found}")]
    TruncatedPixelData {
        /// Number of channel values required by the dimensions
        expected: usize,
        /// Number of channel values actually present
        found: usize,
    },
    /// A textual channel value is not a plain decimal number between 0 and 255
    #[error("malformed pixel value {0:?}")]
    MalformedPixelData(String),
    /// The pixel data does not fit the dimensions it was declared with
    #[error(transparent)]
    InconsistentPixelData(#[from] InvalidPixelDataError),
    /// The underlying stream could not be read
    #[error("could not read PPM data")]
    Io(#[from] std::io::Error),
}

/// The complete content of a decoded file
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DecodedImage {
    /// Pixel encoding the file was written in
    pub variant: Variant,
    /// Width of the grid
    pub width: usize,
    /// Height of the grid
    pub height: usize,
    /// All pixels in row-major order
    pub pixels: Vec<Color>,
    /// All annotations found in comment lines
    pub metadata: MetadataMap,
}

impl DecodedImage {
    /// Get the size of the decoded grid as `(width, height)` tuple
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Turn the decoded data into a canvas.
    ///
    /// Fails if `pixels` does not hold exactly `width * height` colors, which can only happen when the
    /// fields were modified after decoding.
    pub fn into_canvas(self) -> Result<PixelCanvas, InvalidPixelDataError> {
        PixelCanvas::from_parts(self.width, self.height, self.pixels, self.metadata)
    }
}

/// Read a complete file from `reader` and decode it.
///
/// If `expected_size` is given, files declaring a different size are rejected before their pixel data
/// is looked at.
pub fn read<R: Read>(mut reader: R, expected_size: Option<(usize, usize)>) -> Result<DecodedImage, FormatError> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    decode(&buf, expected_size)
}

/// Decode a file from `reader` into `canvas`.
///
/// The canvas is only modified if the whole file could be decoded and has the same size as the canvas.
/// Returns the variant the file was written in.
pub fn read_into<R: Read>(reader: R, canvas: &mut PixelCanvas) -> Result<Variant, FormatError> {
    let image = read(reader, Some(canvas.size()))?;
    let variant = image.variant;
    canvas.replace_with(image.into_canvas()?);
    Ok(variant)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::canvas::Coordinate;
    use quickcheck::{Arbitrary, Gen, TestResult};

    /// A canvas with arbitrary pixels and annotations.
    ///
    /// Texts are arbitrary strings except for the ones that cannot be stored in a single comment line.
    #[derive(Debug, Clone)]
    struct ArbitraryCanvas(PixelCanvas);

    fn arbitrary_text(g: &mut Gen) -> String {
        loop {
            let text = String::arbitrary(g);
            if !text.is_empty() && !text.contains('\n') && !text.ends_with('\r') {
                return text;
            }
        }
    }

    impl Arbitrary for ArbitraryCanvas {
        fn arbitrary(g: &mut Gen) -> Self {
            let width = usize::arbitrary(g) % 12 + 1;
            let height = usize::arbitrary(g) % 12 + 1;
            let pixels = (0..width * height).map(|_| Color::arbitrary(g)).collect();
            let metadata: MetadataMap = (0..usize::arbitrary(g) % 8)
                .map(|_| {
                    let coordinate = Coordinate::new(usize::arbitrary(g) % width, usize::arbitrary(g) % height);
                    (coordinate, arbitrary_text(g))
                })
                .collect();
            Self(PixelCanvas::from_parts(width, height, pixels, metadata).unwrap())
        }
    }

    quickcheck! {
        fn test_round_trip_p3(canvas: ArbitraryCanvas) -> bool {
            let encoded = encode(&canvas.0, Variant::P3);
            let decoded = decode(&encoded, Some(canvas.0.size())).unwrap();
            decoded.variant == Variant::P3 && decoded.into_canvas().unwrap() == canvas.0
        }

        fn test_round_trip_p6(canvas: ArbitraryCanvas) -> bool {
            let encoded = encode(&canvas.0, Variant::P6);
            let decoded = decode(&encoded, Some(canvas.0.size())).unwrap();
            decoded.variant == Variant::P6 && decoded.into_canvas().unwrap() == canvas.0
        }

        fn test_dimension_gate(canvas: ArbitraryCanvas, width: usize, height: usize) -> TestResult {
            let target_size = (width % 16 + 1, height % 16 + 1);
            if target_size == canvas.0.size() {
                return TestResult::discard();
            }
            let mut target = PixelCanvas::new(target_size.0, target_size.1).unwrap();
            target.set_pixel(0, 0, Color::BLACK);
            let before = target.clone();

            let result = read_into(encode(&canvas.0, Variant::P6).as_slice(), &mut target);
            TestResult::from_bool(
                matches!(result, Err(FormatError::DimensionMismatch { .. })) && target == before,
            )
        }
    }

    #[test]
    fn test_whitespace_in_annotations_round_trips() {
        let mut canvas = PixelCanvas::new(4, 1).unwrap();
        for (x, text) in ["note ", " ", "tab\t", "  both  "].into_iter().enumerate() {
            assert!(canvas.set_annotation(x, 0, text));
        }
        for variant in [Variant::P3, Variant::P6] {
            let decoded = decode(&encode(&canvas, variant), Some((4, 1))).unwrap();
            assert_eq!(decoded.into_canvas().unwrap(), canvas);
        }
    }

    #[test]
    fn test_inconsistent_image_is_refused() {
        let mut image = decode(b"P3\n2 1\n255\n1 2 3 4 5 6", None).unwrap();
        image.pixels.pop();
        assert!(image.clone().into_canvas().is_err());

        image.width = 0;
        image.pixels.clear();
        assert!(image.into_canvas().is_err());
    }

    #[test]
    fn test_variant_parsing() {
        assert_eq!("P3".parse::<Variant>(), Ok(Variant::P3));
        assert_eq!("P6".parse::<Variant>(), Ok(Variant::P6));
        assert!("p3".parse::<Variant>().is_err());
        assert!("P5".parse::<Variant>().is_err());
        assert_eq!(Variant::P6.to_string(), "P6");
    }

    #[test]
    fn test_read_into_replaces_canvas() {
        let mut source = PixelCanvas::new(3, 3).unwrap();
        source.set_pixel(1, 1, Color(1, 2, 3));
        source.set_annotation(1, 1, "center");

        let mut target = PixelCanvas::new(3, 3).unwrap();
        target.set_pixel(0, 0, Color::BLACK);
        target.set_annotation(0, 0, "stale");

        let variant = read_into(encode(&source, Variant::P3).as_slice(), &mut target).unwrap();
        assert_eq!(variant, Variant::P3);
        assert_eq!(target, source);
    }

    #[test]
    fn test_read_into_keeps_canvas_on_error() {
        let mut target = PixelCanvas::new(2, 2).unwrap();
        target.set_pixel(1, 0, Color(9, 9, 9));
        target.set_annotation(1, 0, "keep me");
        let before = target.clone();

        let result = read_into(&b"P6\n2 2\n255\n\x01\x02"[..], &mut target);
        assert!(matches!(
            result,
            Err(FormatError::TruncatedPixelData { expected: 12, found: 2 })
        ));
        assert_eq!(target, before);
    }
}
