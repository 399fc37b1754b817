//! A decoder for PPM files with embedded annotations, modelled as an explicit state machine
//!
//! The header is parsed strictly: a bad magic number, dimension line or maximum color value aborts decoding.
//! The comment block in between is parsed on a best-effort basis and never aborts anything.

use super::metadata_line::{parse_comment_line, CommentLine};
use super::{DecodedImage, FormatError, Variant, MAX_COLOR};
use crate::canvas::{Color, MetadataMap};
use itertools::Itertools;
use std::ops::ControlFlow;

/// The stages a decoder walks through, in order
#[derive(Debug)]
enum State<'a> {
    ReadMagic,
    ReadMetadataBlock {
        variant: Variant,
    },
    ReadDimensions {
        variant: Variant,
        line: &'a [u8],
    },
    ReadMaxColor {
        variant: Variant,
        width: usize,
        height: usize,
    },
    DimensionCheck {
        variant: Variant,
        width: usize,
        height: usize,
    },
    ReadPixels {
        variant: Variant,
        width: usize,
        height: usize,
    },
}

#[derive(Debug)]
struct Decoder<'a> {
    /// Input that has not been consumed yet
    rest: &'a [u8],
    expected_size: Option<(usize, usize)>,
    metadata: MetadataMap,
}

/// Decode a complete file.
///
/// If `expected_size` is given, a file declaring a different `(width, height)` is rejected with
/// [`FormatError::DimensionMismatch`] before its pixel data is read.
pub fn decode(input: &[u8], expected_size: Option<(usize, usize)>) -> Result<DecodedImage, FormatError> {
    let mut decoder = Decoder {
        rest: input,
        expected_size,
        metadata: MetadataMap::new(),
    };

    let mut state = State::ReadMagic;
    loop {
        state = match decoder.step(state)? {
            ControlFlow::Continue(next) => next,
            ControlFlow::Break(image) => return Ok(image),
        };
    }
}

impl<'a> Decoder<'a> {
    /// Consume the next line of input, stripped of its `\n` or `\r\n` terminator only.
    ///
    /// Returns `None` once the input is exhausted.
    fn next_line(&mut self) -> Option<&'a [u8]> {
        if self.rest.is_empty() {
            return None;
        }
        let (line, rest) = match self.rest.iter().position(|&b| b == b'\n') {
            Some(i) => (&self.rest[..i], &self.rest[i + 1..]),
            None => (self.rest, &self.rest[self.rest.len()..]),
        };
        self.rest = rest;
        Some(line.strip_suffix(b"\r").unwrap_or(line))
    }

    /// Execute a single state and determine the next one
    fn step(&mut self, state: State<'a>) -> Result<ControlFlow<DecodedImage, State<'a>>, FormatError> {
        let next = match state {
            State::ReadMagic => {
                let line = self.next_line().unwrap_or_default().trim_ascii();
                match Variant::from_magic(line) {
                    Some(variant) => State::ReadMetadataBlock { variant },
                    None => return Err(FormatError::UnsupportedMagic(lossy(line))),
                }
            }

            State::ReadMetadataBlock { variant } => loop {
                let Some(line) = self.next_line() else {
                    return Err(FormatError::MalformedDimensions(String::new()));
                };
                let line = line.trim_ascii_start();
                if line.trim_ascii_end().is_empty() {
                    continue;
                }
                if !line.starts_with(b"#") {
                    break State::ReadDimensions {
                        variant,
                        line: line.trim_ascii_end(),
                    };
                }

                // trailing whitespace belongs to the annotation text
                match parse_comment_line(line) {
                    CommentLine::Annotation(coordinate, text) => {
                        tracing::trace!("Found annotation at {}: {:?}", coordinate, text);
                        self.metadata.insert(coordinate, text);
                    }
                    CommentLine::Malformed => {
                        tracing::debug!("Dropping malformed annotation comment {:?}", lossy(line))
                    }
                    CommentLine::Other => {}
                }
            },

            State::ReadDimensions { variant, line } => {
                let (width, height) =
                    parse_dimensions(line).ok_or_else(|| FormatError::MalformedDimensions(lossy(line)))?;
                State::ReadMaxColor { variant, width, height }
            }

            State::ReadMaxColor { variant, width, height } => {
                let line = self.next_line().unwrap_or_default().trim_ascii();
                let max_color = parse_positive(line).ok_or_else(|| FormatError::MalformedMaxColor(lossy(line)))?;
                if max_color != MAX_COLOR as usize {
                    tracing::warn!(
                        "File uses a maximum color value of {} instead of {}, channel values are taken as they are",
                        max_color,
                        MAX_COLOR
                    );
                }
                State::DimensionCheck { variant, width, height }
            }

            State::DimensionCheck { variant, width, height } => match self.expected_size {
                Some(expected) if expected != (width, height) => {
                    return Err(FormatError::DimensionMismatch {
                        expected,
                        found: (width, height),
                    })
                }
                _ => State::ReadPixels { variant, width, height },
            },

            State::ReadPixels { variant, width, height } => {
                let channels = width
                    .checked_mul(height)
                    .and_then(|n| n.checked_mul(3))
                    .ok_or_else(|| FormatError::MalformedDimensions(format!("{width} {height}")))?;
                let pixels = match variant {
                    Variant::P3 => self.read_textual_pixels(channels)?,
                    Variant::P6 => self.read_binary_pixels(channels)?,
                };
                return Ok(ControlFlow::Break(DecodedImage {
                    variant,
                    width,
                    height,
                    pixels,
                    metadata: std::mem::take(&mut self.metadata),
                }));
            }
        };

        Ok(ControlFlow::Continue(next))
    }

    /// Read `channels` whitespace separated decimal channel values
    fn read_textual_pixels(&mut self, channels: usize) -> Result<Vec<Color>, FormatError> {
        let mut values = Vec::with_capacity(channels.min(self.rest.len()));
        let tokens = self
            .rest
            .split(|b| b.is_ascii_whitespace())
            .filter(|token| !token.is_empty())
            .take(channels);
        for token in tokens {
            let value = Some(token)
                .filter(|token| token.iter().all(u8::is_ascii_digit))
                .and_then(|token| std::str::from_utf8(token).ok())
                .and_then(|token| token.parse::<u8>().ok())
                .ok_or_else(|| FormatError::MalformedPixelData(lossy(token)))?;
            values.push(value);
        }

        if values.len() < channels {
            return Err(FormatError::TruncatedPixelData {
                expected: channels,
                found: values.len(),
            });
        }
        self.rest = &[];

        Ok(values.into_iter().tuples::<(_, _, _)>().map(Color::from).collect())
    }

    /// Read `channels` raw bytes, one per channel value
    fn read_binary_pixels(&mut self, channels: usize) -> Result<Vec<Color>, FormatError> {
        if self.rest.len() < channels {
            return Err(FormatError::TruncatedPixelData {
                expected: channels,
                found: self.rest.len(),
            });
        }
        let (data, rest) = self.rest.split_at(channels);
        self.rest = rest;

        Ok(data.iter().copied().tuples::<(_, _, _)>().map(Color::from).collect())
    }
}

/// Parse a `<width> <height>` line consisting of exactly two positive integers
fn parse_dimensions(line: &[u8]) -> Option<(usize, usize)> {
    let mut tokens = line.split(|b| b.is_ascii_whitespace()).filter(|t| !t.is_empty());
    let width = parse_positive(tokens.next()?)?;
    let height = parse_positive(tokens.next()?)?;
    match tokens.next() {
        None => Some((width, height)),
        Some(_) => None,
    }
}

fn parse_positive(token: &[u8]) -> Option<usize> {
    std::str::from_utf8(token)
        .ok()?
        .parse::<usize>()
        .ok()
        .filter(|&v| v > 0)
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::canvas::Coordinate;

    const RED: Color = Color(0xFF, 0, 0);
    const GREEN: Color = Color(0, 0xFF, 0);
    const BLUE: Color = Color(0, 0, 0xFF);

    #[test]
    fn test_decode_textual() {
        let input = b"P3\n# Metadata: Generated by PPM Editor\n# Metadata: (0, 0) red\n2 2\n255\n\
            255 0 0 0 255 0 0 0 255 255 255 255 ";
        let image = decode(input, Some((2, 2))).unwrap();

        assert_eq!(image.variant, Variant::P3);
        assert_eq!(image.size(), (2, 2));
        assert_eq!(image.pixels, vec![RED, GREEN, BLUE, Color::WHITE]);
        assert_eq!(image.metadata.len(), 1);
        assert_eq!(image.metadata.get(Coordinate::new(0, 0)), Some("red"));
    }

    #[test]
    fn test_decode_binary() {
        let mut input = b"P6\n# Metadata: (1, 0) green\n2 1\n255\n".to_vec();
        input.extend_from_slice(&[0xFF, 0, 0, 0, 0xFF, 0]);
        let image = decode(&input, None).unwrap();

        assert_eq!(image.variant, Variant::P6);
        assert_eq!(image.size(), (2, 1));
        assert_eq!(image.pixels, vec![RED, GREEN]);
        assert_eq!(image.metadata.get(Coordinate::new(1, 0)), Some("green"));
    }

    #[test]
    fn test_binary_payload_may_contain_newlines() {
        let mut input = b"P6\n1 2\n255\n".to_vec();
        input.extend_from_slice(&[b'\n', b'#', b'\n', 10, 13, 32]);
        let image = decode(&input, None).unwrap();
        assert_eq!(image.pixels, vec![Color(b'\n', b'#', b'\n'), Color(10, 13, 32)]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let input = b"P3\r\n# Metadata: (0, 0) note\r\n1 1\r\n255\r\n1 2 3\r\n";
        let image = decode(input, None).unwrap();
        assert_eq!(image.pixels, vec![Color(1, 2, 3)]);
        assert_eq!(image.metadata.get(Coordinate::new(0, 0)), Some("note"));
    }

    #[test]
    fn test_annotation_whitespace_is_kept() {
        let input = b"P3\n# Metadata: (0, 0) note \r\n# Metadata: (1, 0) tab\t\n\
            # Metadata: (2, 0)  \n  \t\n 3 1 \n 255 \n0 0 0 0 0 0 0 0 0";
        let image = decode(input, None).unwrap();
        assert_eq!(image.metadata.get(Coordinate::new(0, 0)), Some("note "));
        assert_eq!(image.metadata.get(Coordinate::new(1, 0)), Some("tab\t"));
        assert_eq!(image.metadata.get(Coordinate::new(2, 0)), Some(" "));
        assert_eq!(image.size(), (3, 1));
    }

    #[test]
    fn test_unsupported_magic() {
        for input in [&b"P5\n1 1\n255\n\x00"[..], b"", b"p3\n1 1\n255\n0 0 0", b"P36\n"] {
            assert!(
                matches!(decode(input, None), Err(FormatError::UnsupportedMagic(_))),
                "input {:?} was not rejected",
                input
            );
        }
    }

    #[test]
    fn test_malformed_dimensions() {
        for input in [
            &b"P3\n2\n255\n"[..],
            b"P3\n2 x\n255\n",
            b"P3\n0 2\n255\n",
            b"P3\n1 2 3\n255\n",
            b"P3\n# Metadata: (0, 0) only comments\n",
        ] {
            assert!(
                matches!(decode(input, None), Err(FormatError::MalformedDimensions(_))),
                "input {:?} was not rejected",
                input
            );
        }
    }

    #[test]
    fn test_malformed_max_color() {
        for input in [&b"P3\n1 1\nmax\n0 0 0"[..], b"P3\n1 1\n0\n0 0 0", b"P3\n1 1\n"] {
            assert!(
                matches!(decode(input, None), Err(FormatError::MalformedMaxColor(_))),
                "input {:?} was not rejected",
                input
            );
        }
    }

    #[test]
    fn test_dimension_mismatch() {
        let input = b"P3\n2 2\n255\n0 0 0 0 0 0 0 0 0 0 0 0";
        match decode(input, Some((32, 26))) {
            Err(FormatError::DimensionMismatch { expected, found }) => {
                assert_eq!(expected, (32, 26));
                assert_eq!(found, (2, 2));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_dimension_mismatch_is_checked_before_pixels() {
        let input = b"P6\n2 2\n255\n";
        assert!(matches!(
            decode(input, Some((1, 1))),
            Err(FormatError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_truncated_textual() {
        let input = b"P3\n2 1\n255\n1 2 3 4 5";
        assert!(matches!(
            decode(input, None),
            Err(FormatError::TruncatedPixelData { expected: 6, found: 5 })
        ));
    }

    #[test]
    fn test_truncated_binary() {
        let input = b"P6\n2 2\n255\n\x00\x01\x02\x03\x04\x05\x06\x07\x08\x09\x0a";
        assert!(matches!(
            decode(input, None),
            Err(FormatError::TruncatedPixelData { expected: 12, found: 11 })
        ));
    }

    #[test]
    fn test_malformed_textual_pixel() {
        for input in [
            &b"P3\n1 1\n255\n1 2 x"[..],
            b"P3\n1 1\n255\n1 2 256",
            b"P3\n1 1\n255\n1 -2 3",
            b"P3\n1 1\n255\n1 +5 3",
            b"P3\n1 1\n255\n+0 0 0",
        ] {
            assert!(
                matches!(decode(input, None), Err(FormatError::MalformedPixelData(_))),
                "input {:?} was not rejected",
                input
            );
        }
    }

    #[test]
    fn test_trailing_data_is_ignored() {
        let image = decode(b"P3\n1 1\n255\n1 2 3 4 5 6\n", None).unwrap();
        assert_eq!(image.pixels, vec![Color(1, 2, 3)]);
        let image = decode(b"P6\n1 1\n255\nabcdef", None).unwrap();
        assert_eq!(image.pixels, vec![Color(b'a', b'b', b'c')]);
    }

    #[test]
    fn test_malformed_annotation_is_skipped() {
        let input = b"P3\n# Metadata: Generated by PPM Editor\n# Metadata: (x, 1) broken\n\
            # Metadata: (1, 0) fine\n# some other comment\n2 1\n255\n0 0 0 9 9 9";
        let image = decode(input, Some((2, 1))).unwrap();
        assert_eq!(image.pixels, vec![Color::BLACK, Color(9, 9, 9)]);
        assert_eq!(image.metadata.len(), 1);
        assert_eq!(image.metadata.get(Coordinate::new(1, 0)), Some("fine"));
    }

    #[test]
    fn test_annotations_on_white_and_outside_are_kept() {
        let input = b"P3\n# Metadata: (0, 0) white\n# Metadata: (7, 7) outside\n1 1\n255\n255 255 255";
        let image = decode(input, Some((1, 1))).unwrap();
        assert_eq!(image.metadata.get(Coordinate::new(0, 0)), Some("white"));
        assert_eq!(image.metadata.get(Coordinate::new(7, 7)), Some("outside"));
    }

    #[test]
    fn test_later_annotation_wins() {
        let input = b"P3\n# Metadata: (0, 0) first\n# Metadata: (0, 0) second\n1 1\n255\n0 0 0";
        let image = decode(input, None).unwrap();
        assert_eq!(image.metadata.get(Coordinate::new(0, 0)), Some("second"));
    }

    #[test]
    fn test_unusual_max_color_is_accepted() {
        let image = decode(b"P3\n1 1\n15\n1 2 3", None).unwrap();
        assert_eq!(image.pixels, vec![Color(1, 2, 3)]);
    }
}
