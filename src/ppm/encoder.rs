use super::{Variant, BANNER, MAX_COLOR};
use crate::canvas::PixelCanvas;
use std::io::Write;

/// Serialize a canvas into an in-memory buffer
pub fn encode(canvas: &PixelCanvas, variant: Variant) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_to(canvas, variant, &mut buf).expect("writing into a Vec<u8> cannot fail");
    buf
}

/// Serialize a canvas into `writer`.
///
/// Annotations are written in row-major coordinate order.
/// Errors are only ever caused by `writer` itself and are passed on unchanged.
pub fn encode_to<W: Write>(canvas: &PixelCanvas, variant: Variant, mut writer: W) -> std::io::Result<()> {
    let (width, height) = canvas.size();

    writeln!(writer, "{}", variant.magic())?;
    writeln!(writer, "{}", BANNER)?;
    for (coordinate, text) in canvas.metadata().iter().filter(|(_, text)| !text.is_empty()) {
        writeln!(writer, "# Metadata: {} {}", coordinate, text)?;
    }
    writeln!(writer, "{} {}", width, height)?;
    writeln!(writer, "{}", MAX_COLOR)?;

    match variant {
        Variant::P3 => {
            for color in canvas.pixels() {
                write!(writer, "{} {} {} ", color.0, color.1, color.2)?;
            }
        }
        Variant::P6 => {
            let data = canvas
                .pixels()
                .iter()
                .flat_map(|c| Into::<[u8; 3]>::into(*c))
                .collect::<Vec<_>>();
            writer.write_all(&data)?;
        }
    }

    writer.flush()
}
